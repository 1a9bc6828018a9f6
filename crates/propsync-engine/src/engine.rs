use std::collections::BTreeMap;
use std::sync::Arc;

use propsync_hostnames::{apply_bindings, build_hostname_map};
use propsync_lifecycle::{
    ensure_editable, run_activation, ActivationPhase, ActivationRun, PollConfig,
};
use propsync_merge::{
    apply_rules_spec, apply_standard_behaviors, fixup_performance_behaviors, origin_options,
};
use propsync_model::{
    latest_activation, ActivationType, CpCode, LifecycleStatus, Property, PropertySpec, RuleTree,
};
use propsync_plane::{
    ActivationRequest, ActivationStore, EdgeHostnameStore, HostnameStore, NewProperty, PlaneError,
    PropertyStore, RuleTreeStore, SearchKey, SearchService,
};

use crate::snapshot::{ChangeFlags, PropertySnapshot};

/// Note attached to every activation this engine submits.
pub const ACTIVATION_NOTE: &str = "Managed by PropSync";

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The reconciliation driver. Owns one handle per collaborator; every remote
/// interaction of a pass flows through these six seams, which is what makes
/// the whole engine testable against the in-memory plane.
pub struct Engine {
    properties: Arc<dyn PropertyStore>,
    rule_trees: Arc<dyn RuleTreeStore>,
    hostnames: Arc<dyn HostnameStore>,
    edge_hostnames: Arc<dyn EdgeHostnameStore>,
    activations: Arc<dyn ActivationStore>,
    search: Arc<dyn SearchService>,
    poll: PollConfig,
}

impl Engine {
    pub fn new(
        properties: Arc<dyn PropertyStore>,
        rule_trees: Arc<dyn RuleTreeStore>,
        hostnames: Arc<dyn HostnameStore>,
        edge_hostnames: Arc<dyn EdgeHostnameStore>,
        activations: Arc<dyn ActivationStore>,
        search: Arc<dyn SearchService>,
    ) -> Self {
        Self {
            properties,
            rule_trees,
            hostnames,
            edge_hostnames,
            activations,
            search,
            poll: PollConfig::default(),
        }
    }

    /// Override polling cadence and deadlines (tests shrink these).
    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    // -----------------------------------------------------------------------
    // create
    // -----------------------------------------------------------------------

    /// Bring a property into existence and reconcile it to the spec: rules,
    /// hostname bindings, and (when requested) an activation.
    pub async fn create(&self, spec: &PropertySpec) -> Result<PropertySnapshot, PlaneError> {
        let property = match self.find_declared_property(spec) {
            Some(found) => {
                tracing::debug!(
                    property_id = %found.property_id,
                    "declared property already exists; adopting it"
                );
                found
            }
            None => self.create_property(spec)?,
        };
        let property = ensure_editable(self.properties.as_ref(), &property)?;

        let mut tree = self.rule_trees.rules(&property)?;
        self.fold_spec_into_tree(&mut tree, spec, true);
        self.rule_trees.save(&property, &tree)?;

        let map = build_hostname_map(
            &self.edge_hostnames,
            self.hostnames.as_ref(),
            &property,
            spec,
            &self.poll,
        )
        .await?;
        let edge_hostnames = apply_bindings(self.hostnames.as_ref(), &property, map.as_ref())?;

        let activation = self.maybe_activate(&property, spec).await?;
        tracing::debug!(property_id = %property.property_id, "create pass done");
        Ok(self.snapshot(&property, edge_hostnames, activation))
    }

    // -----------------------------------------------------------------------
    // read
    // -----------------------------------------------------------------------

    /// Fetch the current remote state of a property.
    pub fn read(&self, property_id: &str) -> Result<PropertySnapshot, PlaneError> {
        let property = self.properties.find(property_id)?;
        Ok(self.snapshot(&property, BTreeMap::new(), None))
    }

    // -----------------------------------------------------------------------
    // update
    // -----------------------------------------------------------------------

    /// Re-apply the spec to an existing property. Standard behaviors are
    /// recomputed from the current declarative input, never cached; hostname
    /// resolution only runs when a hostname-affecting field changed. An
    /// activation submitted here implicitly supersedes whatever was active
    /// on the target network.
    pub async fn update(
        &self,
        property_id: &str,
        spec: &PropertySpec,
        changes: &ChangeFlags,
    ) -> Result<PropertySnapshot, PlaneError> {
        tracing::debug!(property_id, "update pass starting");
        let property = self.properties.find(property_id)?;
        let property = ensure_editable(self.properties.as_ref(), &property)?;

        let mut tree = self.rule_trees.rules(&property)?;
        // The sureRoute fixup is a creation-time repair only.
        self.fold_spec_into_tree(&mut tree, spec, false);
        self.rule_trees.save(&property, &tree)?;

        let map = if changes.hostname_related() {
            build_hostname_map(
                &self.edge_hostnames,
                self.hostnames.as_ref(),
                &property,
                spec,
                &self.poll,
            )
            .await?
        } else {
            None
        };
        let edge_hostnames = apply_bindings(self.hostnames.as_ref(), &property, map.as_ref())?;

        let activation = self.maybe_activate(&property, spec).await?;
        tracing::debug!(property_id = %property.property_id, "update pass done");
        Ok(self.snapshot(&property, edge_hostnames, activation))
    }

    // -----------------------------------------------------------------------
    // delete
    // -----------------------------------------------------------------------

    /// Tear a property down. A live activation on the target network is
    /// deactivated first (and polled to completion) so the remote plane will
    /// accept the delete; a property that was never activated deletes
    /// directly.
    pub async fn delete(&self, property_id: &str, spec: &PropertySpec) -> Result<(), PlaneError> {
        if spec.contract_id.is_none() {
            return Err(PlaneError::precondition("missing contract ID"));
        }
        if spec.group_id.is_none() {
            return Err(PlaneError::precondition("missing group ID"));
        }

        let property = self.properties.find(property_id)?;
        let history = self.activations.list(&property)?;
        if let Some(current) = latest_activation(&history, spec.network, LifecycleStatus::Active) {
            // Only a live *activation* needs undoing; a completed
            // deactivation means the network is already clear.
            if current.activation_type == ActivationType::Activate {
                let request = ActivationRequest {
                    property_version: property.latest_version,
                    network: current.network,
                    activation_type: ActivationType::Deactivate,
                    notify_emails: current.notify_emails.clone(),
                    note: ACTIVATION_NOTE.to_string(),
                };
                let run =
                    run_activation(Arc::clone(&self.activations), &property, &request, &self.poll)
                        .await?;
                if run.phase == ActivationPhase::TimedOut {
                    tracing::warn!(
                        property_id = %property.property_id,
                        "deactivation polling timed out; proceeding with delete"
                    );
                }
            }
        }

        self.properties.delete(&property.property_id)?;
        tracing::debug!(property_id = %property.property_id, "property deleted");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // import / exists
    // -----------------------------------------------------------------------

    /// Resolve a free-form identifier or search term to a property. A
    /// `prp_`-prefixed term is used directly; anything else is searched by
    /// name, then hostname, then edge hostname, first hit winning.
    pub fn import_property(&self, term: &str) -> Result<PropertySnapshot, PlaneError> {
        let mut property_id = term.to_string();
        if !term.starts_with("prp_") {
            for key in [
                SearchKey::ByName,
                SearchKey::ByHostname,
                SearchKey::ByEdgeHostname,
            ] {
                match self.search.search(key, term) {
                    Ok(hits) => {
                        if let Some(hit) = hits.first() {
                            property_id = hit.property_id.clone();
                            break;
                        }
                    }
                    // A failing search mode is skipped, not fatal; the next
                    // mode may still resolve the term.
                    Err(_) => continue,
                }
            }
        }

        let property = self.properties.find(&property_id)?;
        Ok(self.snapshot(&property, BTreeMap::new(), None))
    }

    /// Whether the property exists remotely. Not-found maps to `Ok(false)`;
    /// any other failure stays an error.
    pub fn exists(&self, property_id: &str) -> Result<bool, PlaneError> {
        match self.properties.find(property_id) {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    // -----------------------------------------------------------------------
    // internals
    // -----------------------------------------------------------------------

    /// Look for a property matching the declaration: by name first, then by
    /// each declared hostname. Lookup failures mean "not found" here; the
    /// caller falls through to creation.
    fn find_declared_property(&self, spec: &PropertySpec) -> Option<Property> {
        let mut hit = self
            .search
            .search(SearchKey::ByName, &spec.name)
            .ok()
            .and_then(|hits| hits.into_iter().next());

        if hit.is_none() {
            for hostname in &spec.hostnames {
                if let Ok(hits) = self.search.search(SearchKey::ByHostname, hostname) {
                    if let Some(first) = hits.into_iter().next() {
                        hit = Some(first);
                        break;
                    }
                }
            }
        }

        let hit = hit?;
        self.properties.find(&hit.property_id).ok()
    }

    fn create_property(&self, spec: &PropertySpec) -> Result<Property, PlaneError> {
        let group_id = spec.group_id.clone().ok_or_else(|| {
            PlaneError::precondition("group_id must be specified to create a new property")
        })?;
        let contract_id = spec.contract_id.clone().ok_or_else(|| {
            PlaneError::precondition("contract_id must be specified to create a new property")
        })?;
        let product_id = spec.product_id.clone().ok_or_else(|| {
            PlaneError::precondition("product_id must be specified to create a new property")
        })?;

        let request = NewProperty {
            property_name: spec.name.clone(),
            contract_id,
            group_id,
            product_id,
            rule_format: spec.rule_format.clone(),
            clone_from: spec.clone_from.clone(),
        };
        let property = self.properties.create(&request)?;
        tracing::debug!(property_id = %property.property_id, "property created");
        Ok(property)
    }

    /// Standard behaviors, optional creation-time fixups, then the declared
    /// rule set, in that order.
    fn fold_spec_into_tree(&self, tree: &mut RuleTree, spec: &PropertySpec, creation: bool) {
        let cp_code = (!spec.cp_code.is_empty()).then(|| CpCode::new(spec.cp_code.clone()));
        let origin = spec.origin.as_ref().map(origin_options);
        apply_standard_behaviors(&mut tree.rule, cp_code.as_ref(), origin.as_ref());
        if creation {
            fixup_performance_behaviors(&mut tree.rule);
        }
        if let Some(rules) = &spec.rules {
            apply_rules_spec(&mut tree.rule, rules);
        }
    }

    async fn maybe_activate(
        &self,
        property: &Property,
        spec: &PropertySpec,
    ) -> Result<Option<ActivationRun>, PlaneError> {
        if !spec.activate {
            return Ok(None);
        }

        let request = ActivationRequest {
            property_version: property.latest_version,
            network: spec.network,
            activation_type: ActivationType::Activate,
            notify_emails: spec.contacts.clone(),
            note: ACTIVATION_NOTE.to_string(),
        };
        let run = run_activation(
            Arc::clone(&self.activations),
            property,
            &request,
            &self.poll,
        )
        .await?;

        match run.phase {
            ActivationPhase::TimedOut => tracing::warn!(
                property_id = %property.property_id,
                "activation polling timed out; the activation may still converge remotely"
            ),
            ActivationPhase::Aborted => tracing::debug!(
                property_id = %property.property_id,
                "activation polling stopped before reaching active"
            ),
            _ => {}
        }
        Ok(Some(run))
    }

    fn snapshot(
        &self,
        property: &Property,
        edge_hostnames: BTreeMap<String, String>,
        activation: Option<ActivationRun>,
    ) -> PropertySnapshot {
        PropertySnapshot {
            property_id: property.property_id.clone(),
            account_id: property.account_id.clone(),
            contract_id: property.contract_id.clone(),
            group_id: property.group_id.clone(),
            name: property.property_name.clone(),
            note: property.note.clone(),
            rule_format: property.rule_format.clone(),
            version: property.latest_version,
            staging_version: property.staging_version,
            production_version: property.production_version,
            edge_hostnames,
            activation,
        }
    }
}
