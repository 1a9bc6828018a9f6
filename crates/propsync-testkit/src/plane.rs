//! Deterministic in-memory control plane.
//!
//! Single-tenant: one contract/group universe, every id derived from a
//! counter (`prp_1`, `ehn_2`, `atv_3`), timestamps derived from a fixed
//! base. Status progressions are scripted: a created edge hostname or
//! submitted activation stays `PENDING` for N status polls and then reports
//! its scripted outcome.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use propsync_model::{
    Activation, ActivationType, EdgeHostname, HostnameBinding, IpVersion, LifecycleStatus,
    Network, Property, PropertyVersion, RuleTree, RuleViolation,
};
use propsync_plane::{
    ActivationRequest, ActivationStore, EdgeHostnameStore, HostnameStore, NewEdgeHostname,
    NewProperty, PlaneError, PropertyStore, RuleTreeStore, SearchHit, SearchKey, SearchService,
};

/// Rule format handed out when a creation request does not pin one.
pub const DEFAULT_RULE_FORMAT: &str = "v2025-02-18";

const EPOCH_BASE: i64 = 1_700_000_000;

// ---------------------------------------------------------------------------
// Scripts and records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct StatusScript {
    /// Number of `PENDING` answers left before the outcome is reported.
    remaining: u32,
    outcome: LifecycleStatus,
}

impl StatusScript {
    fn immediate() -> Self {
        Self {
            remaining: 0,
            outcome: LifecycleStatus::Active,
        }
    }

    fn step(&mut self) -> LifecycleStatus {
        if self.remaining > 0 {
            self.remaining -= 1;
            LifecycleStatus::Pending
        } else {
            self.outcome
        }
    }
}

#[derive(Debug)]
struct PropertyRecord {
    property: Property,
    product_id: Option<String>,
    versions: Vec<PropertyVersion>,
}

#[derive(Debug)]
struct State {
    properties: BTreeMap<String, PropertyRecord>,
    edge_hostnames: Vec<EdgeHostname>,
    rule_trees: BTreeMap<String, RuleTree>,
    bindings: BTreeMap<String, Vec<HostnameBinding>>,
    activations: BTreeMap<String, Vec<Activation>>,
    edge_scripts: BTreeMap<String, StatusScript>,
    activation_scripts: BTreeMap<String, StatusScript>,
    next_edge_script: StatusScript,
    next_activation_script: StatusScript,
    pending_rule_violations: Option<Vec<RuleViolation>>,
    next_property: u64,
    next_edge_hostname: u64,
    next_activation: u64,
}

impl Default for State {
    fn default() -> Self {
        Self {
            properties: BTreeMap::new(),
            edge_hostnames: Vec::new(),
            rule_trees: BTreeMap::new(),
            bindings: BTreeMap::new(),
            activations: BTreeMap::new(),
            edge_scripts: BTreeMap::new(),
            activation_scripts: BTreeMap::new(),
            next_edge_script: StatusScript::immediate(),
            next_activation_script: StatusScript::immediate(),
            pending_rule_violations: None,
            next_property: 0,
            next_edge_hostname: 0,
            next_activation: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// InMemoryPlane
// ---------------------------------------------------------------------------

/// The fake control plane. Cheap to clone; all clones share state, so a test
/// can hand `Arc::new(plane.clone())` to the engine and keep its own handle
/// for assertions.
#[derive(Clone, Default)]
pub struct InMemoryPlane {
    inner: Arc<Mutex<State>>,
}

impl InMemoryPlane {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.inner.lock().expect("plane state poisoned")
    }

    // -- seeding -----------------------------------------------------------

    /// Create a property the way the remote side would, with the default
    /// test contract/group/product, and return it as `find` reports it.
    pub fn seed_property(&self, name: &str) -> Property {
        let request = NewProperty {
            property_name: name.to_string(),
            contract_id: "ctr_1".to_string(),
            group_id: "grp_1".to_string(),
            product_id: "prd_1".to_string(),
            rule_format: None,
            clone_from: None,
        };
        let created = PropertyStore::create(self, &request).expect("seed property");
        self.find(&created.property_id).expect("seed property find")
    }

    /// Register an already-active edge hostname in the contract/group.
    pub fn seed_edge_hostname(&self, domain: &str) -> EdgeHostname {
        let mut state = self.lock();
        state.next_edge_hostname += 1;
        let edge = EdgeHostname {
            edge_hostname_id: format!("ehn_{}", state.next_edge_hostname),
            edge_hostname_domain: domain.to_string(),
            ip_version_behavior: IpVersion::V4,
            product_id: Some("prd_1".to_string()),
            status: LifecycleStatus::Active,
        };
        state.edge_hostnames.push(edge.clone());
        edge
    }

    /// Record a historical activation with a fixed status.
    pub fn seed_activation(
        &self,
        property_id: &str,
        network: Network,
        activation_type: ActivationType,
        status: LifecycleStatus,
    ) -> Activation {
        let mut state = self.lock();
        state.next_activation += 1;
        let n = state.next_activation;
        let activation = Activation {
            activation_id: format!("atv_{n}"),
            property_version: 1,
            network,
            activation_type,
            status,
            notify_emails: vec!["noc@example.com".to_string()],
            note: String::new(),
            submit_date: Some(Utc.timestamp_opt(EPOCH_BASE + n as i64, 0).unwrap()),
        };
        state
            .activations
            .entry(property_id.to_string())
            .or_default()
            .push(activation.clone());
        activation
    }

    /// Mark one version's status on a network, the way a completed remote
    /// activation would.
    pub fn set_version_status(
        &self,
        property_id: &str,
        version: u64,
        network: Network,
        status: LifecycleStatus,
    ) {
        let mut state = self.lock();
        let record = state.properties.get_mut(property_id).expect("property");
        let row = record
            .versions
            .iter_mut()
            .find(|v| v.property_version == version)
            .expect("version");
        match network {
            Network::Staging => row.staging_status = status,
            Network::Production => row.production_status = status,
        }
        if status == LifecycleStatus::Active {
            match network {
                Network::Staging => record.property.staging_version = Some(version),
                Network::Production => record.property.production_version = Some(version),
            }
        }
    }

    // -- scripting ---------------------------------------------------------

    /// Edge hostnames created from now on answer `PENDING` for `polls`
    /// status queries, then `ACTIVE`.
    pub fn script_edge_hostname_polls(&self, polls: u32) {
        self.lock().next_edge_script = StatusScript {
            remaining: polls,
            outcome: LifecycleStatus::Active,
        };
    }

    /// Activations submitted from now on answer `PENDING` for `polls`
    /// status queries, then `ACTIVE`.
    pub fn script_activation_polls(&self, polls: u32) {
        self.script_activation_outcome(LifecycleStatus::Active, polls);
    }

    /// Activations submitted from now on answer `PENDING` for `polls`
    /// status queries, then `outcome`.
    pub fn script_activation_outcome(&self, outcome: LifecycleStatus, polls: u32) {
        self.lock().next_activation_script = StatusScript {
            remaining: polls,
            outcome,
        };
    }

    /// The next rule tree save fails with the given violations.
    pub fn fail_next_rules_save(&self, violations: Vec<RuleViolation>) {
        self.lock().pending_rule_violations = Some(violations);
    }

    // -- assertion hooks ---------------------------------------------------

    pub fn rule_tree(&self, property_id: &str) -> Option<RuleTree> {
        self.lock().rule_trees.get(property_id).cloned()
    }

    pub fn recorded_bindings(&self, property_id: &str) -> Vec<HostnameBinding> {
        self.lock()
            .bindings
            .get(property_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn recorded_activations(&self, property_id: &str) -> Vec<Activation> {
        self.lock()
            .activations
            .get(property_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn all_edge_hostnames(&self) -> Vec<EdgeHostname> {
        self.lock().edge_hostnames.clone()
    }

    pub fn property_exists(&self, property_id: &str) -> bool {
        self.lock().properties.contains_key(property_id)
    }
}

// ---------------------------------------------------------------------------
// PropertyStore
// ---------------------------------------------------------------------------

impl PropertyStore for InMemoryPlane {
    fn find(&self, property_id: &str) -> Result<Property, PlaneError> {
        let state = self.lock();
        let record = state
            .properties
            .get(property_id)
            .ok_or_else(|| PlaneError::not_found(format!("property {property_id}")))?;
        // product_id is write-once: reads never return it.
        let mut property = record.property.clone();
        property.product_id = None;
        Ok(property)
    }

    fn create(&self, request: &NewProperty) -> Result<Property, PlaneError> {
        let mut state = self.lock();
        state.next_property += 1;
        let property_id = format!("prp_{}", state.next_property);
        let rule_format = request
            .rule_format
            .clone()
            .unwrap_or_else(|| DEFAULT_RULE_FORMAT.to_string());

        let property = Property {
            property_id: property_id.clone(),
            account_id: "act_1".to_string(),
            contract_id: request.contract_id.clone(),
            group_id: request.group_id.clone(),
            product_id: Some(request.product_id.clone()),
            property_name: request.property_name.clone(),
            note: String::new(),
            rule_format: rule_format.clone(),
            latest_version: 1,
            staging_version: None,
            production_version: None,
        };

        let mut tree = RuleTree::new(&rule_format);
        if let Some(clone_from) = &request.clone_from {
            if let Some(source) = state.rule_trees.get(&clone_from.property_id) {
                tree = source.clone();
            }
            if clone_from.copy_hostnames {
                let copied = state
                    .bindings
                    .get(&clone_from.property_id)
                    .cloned()
                    .unwrap_or_default();
                state.bindings.insert(property_id.clone(), copied);
            }
        }
        state.rule_trees.insert(property_id.clone(), tree);

        state.properties.insert(
            property_id.clone(),
            PropertyRecord {
                property: property.clone(),
                product_id: Some(request.product_id.clone()),
                versions: vec![PropertyVersion {
                    property_version: 1,
                    staging_status: LifecycleStatus::Inactive,
                    production_status: LifecycleStatus::Inactive,
                }],
            },
        );
        Ok(property)
    }

    fn delete(&self, property_id: &str) -> Result<(), PlaneError> {
        let mut state = self.lock();
        state
            .properties
            .remove(property_id)
            .ok_or_else(|| PlaneError::not_found(format!("property {property_id}")))?;
        state.rule_trees.remove(property_id);
        state.bindings.remove(property_id);
        // Activation history survives the delete, like the remote plane's
        // activation log; delete-flow tests assert on it.
        Ok(())
    }

    fn latest_version(&self, property_id: &str) -> Result<PropertyVersion, PlaneError> {
        let state = self.lock();
        let record = state
            .properties
            .get(property_id)
            .ok_or_else(|| PlaneError::not_found(format!("property {property_id}")))?;
        record
            .versions
            .last()
            .cloned()
            .ok_or_else(|| PlaneError::not_found(format!("versions of {property_id}")))
    }

    fn versions(&self, property_id: &str) -> Result<Vec<PropertyVersion>, PlaneError> {
        let state = self.lock();
        let record = state
            .properties
            .get(property_id)
            .ok_or_else(|| PlaneError::not_found(format!("property {property_id}")))?;
        Ok(record.versions.clone())
    }

    fn new_version_from(
        &self,
        property_id: &str,
        parent: u64,
        _locked: bool,
    ) -> Result<PropertyVersion, PlaneError> {
        let mut state = self.lock();
        let record = state
            .properties
            .get_mut(property_id)
            .ok_or_else(|| PlaneError::not_found(format!("property {property_id}")))?;
        if !record.versions.iter().any(|v| v.property_version == parent) {
            return Err(PlaneError::not_found(format!(
                "version {parent} of {property_id}"
            )));
        }
        let next = record.property.latest_version + 1;
        let version = PropertyVersion {
            property_version: next,
            staging_status: LifecycleStatus::Inactive,
            production_status: LifecycleStatus::Inactive,
        };
        record.versions.push(version.clone());
        record.property.latest_version = next;
        Ok(version)
    }
}

// ---------------------------------------------------------------------------
// RuleTreeStore
// ---------------------------------------------------------------------------

impl RuleTreeStore for InMemoryPlane {
    fn rules(&self, property: &Property) -> Result<RuleTree, PlaneError> {
        let state = self.lock();
        if !state.properties.contains_key(&property.property_id) {
            return Err(PlaneError::not_found(format!(
                "property {}",
                property.property_id
            )));
        }
        Ok(state
            .rule_trees
            .get(&property.property_id)
            .cloned()
            .unwrap_or_else(|| RuleTree::new(&property.rule_format)))
    }

    fn save(&self, property: &Property, tree: &RuleTree) -> Result<(), PlaneError> {
        let mut state = self.lock();
        if let Some(violations) = state.pending_rule_violations.take() {
            return Err(PlaneError::Validation { violations });
        }
        state
            .rule_trees
            .insert(property.property_id.clone(), tree.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// HostnameStore
// ---------------------------------------------------------------------------

impl HostnameStore for InMemoryPlane {
    fn bindings(&self, property: &Property) -> Result<Vec<HostnameBinding>, PlaneError> {
        Ok(self
            .lock()
            .bindings
            .get(&property.property_id)
            .cloned()
            .unwrap_or_default())
    }

    fn save(&self, property: &Property, bindings: &[HostnameBinding]) -> Result<(), PlaneError> {
        self.lock()
            .bindings
            .insert(property.property_id.clone(), bindings.to_vec());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// EdgeHostnameStore
// ---------------------------------------------------------------------------

impl EdgeHostnameStore for InMemoryPlane {
    fn list(&self, _contract_id: &str, _group_id: &str) -> Result<Vec<EdgeHostname>, PlaneError> {
        // Single-tenant fake: everything lives in one contract/group.
        Ok(self.lock().edge_hostnames.clone())
    }

    fn create(&self, request: &NewEdgeHostname) -> Result<EdgeHostname, PlaneError> {
        let mut state = self.lock();
        state.next_edge_hostname += 1;
        let id = format!("ehn_{}", state.next_edge_hostname);
        let domain = if request.domain.ends_with(".edgesuite.net") {
            request.domain.clone()
        } else {
            format!("{}.edgesuite.net", request.domain)
        };
        let script = state.next_edge_script;
        let status = if script.remaining == 0 {
            script.outcome
        } else {
            LifecycleStatus::New
        };
        let edge = EdgeHostname {
            edge_hostname_id: id.clone(),
            edge_hostname_domain: domain,
            ip_version_behavior: request.ip_version,
            product_id: Some(request.product_id.clone()),
            status,
        };
        state.edge_scripts.insert(id, script);
        state.edge_hostnames.push(edge.clone());
        Ok(edge)
    }

    fn status(&self, edge_hostname_id: &str) -> Result<LifecycleStatus, PlaneError> {
        let mut state = self.lock();
        let mut script = state
            .edge_scripts
            .get(edge_hostname_id)
            .copied()
            .unwrap_or_else(StatusScript::immediate);
        let status = script.step();
        state
            .edge_scripts
            .insert(edge_hostname_id.to_string(), script);
        if let Some(edge) = state
            .edge_hostnames
            .iter_mut()
            .find(|e| e.edge_hostname_id == edge_hostname_id)
        {
            edge.status = status;
            Ok(status)
        } else {
            Err(PlaneError::not_found(format!(
                "edge hostname {edge_hostname_id}"
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// ActivationStore
// ---------------------------------------------------------------------------

impl ActivationStore for InMemoryPlane {
    fn submit(
        &self,
        property: &Property,
        request: &ActivationRequest,
    ) -> Result<Activation, PlaneError> {
        let mut state = self.lock();
        if !state.properties.contains_key(&property.property_id) {
            return Err(PlaneError::not_found(format!(
                "property {}",
                property.property_id
            )));
        }
        state.next_activation += 1;
        let n = state.next_activation;
        let id = format!("atv_{n}");
        let activation = Activation {
            activation_id: id.clone(),
            property_version: request.property_version,
            network: request.network,
            activation_type: request.activation_type,
            status: LifecycleStatus::Pending,
            notify_emails: request.notify_emails.clone(),
            note: request.note.clone(),
            submit_date: Some(Utc.timestamp_opt(EPOCH_BASE + n as i64, 0).unwrap()),
        };
        let script = state.next_activation_script;
        state.activation_scripts.insert(id, script);
        state
            .activations
            .entry(property.property_id.clone())
            .or_default()
            .push(activation.clone());
        Ok(activation)
    }

    fn list(&self, property: &Property) -> Result<Vec<Activation>, PlaneError> {
        Ok(self
            .lock()
            .activations
            .get(&property.property_id)
            .cloned()
            .unwrap_or_default())
    }

    fn status(
        &self,
        property_id: &str,
        activation_id: &str,
    ) -> Result<LifecycleStatus, PlaneError> {
        let mut state = self.lock();
        let mut script = state
            .activation_scripts
            .get(activation_id)
            .copied()
            .unwrap_or_else(StatusScript::immediate);
        let status = script.step();
        state
            .activation_scripts
            .insert(activation_id.to_string(), script);

        let history = state
            .activations
            .get_mut(property_id)
            .ok_or_else(|| PlaneError::not_found(format!("property {property_id}")))?;
        let record = history
            .iter_mut()
            .find(|a| a.activation_id == activation_id)
            .ok_or_else(|| PlaneError::not_found(format!("activation {activation_id}")))?;
        record.status = status;

        // A completed activation freezes its version on the target network.
        if status == LifecycleStatus::Active {
            let version = record.property_version;
            let network = record.network;
            let activation_type = record.activation_type;
            if let Some(property) = state.properties.get_mut(property_id) {
                if let Some(row) = property
                    .versions
                    .iter_mut()
                    .find(|v| v.property_version == version)
                {
                    match (network, activation_type) {
                        (Network::Staging, ActivationType::Activate) => {
                            row.staging_status = LifecycleStatus::Active;
                            property.property.staging_version = Some(version);
                        }
                        (Network::Production, ActivationType::Activate) => {
                            row.production_status = LifecycleStatus::Active;
                            property.property.production_version = Some(version);
                        }
                        (Network::Staging, ActivationType::Deactivate) => {
                            row.staging_status = LifecycleStatus::Deactivated;
                            property.property.staging_version = None;
                        }
                        (Network::Production, ActivationType::Deactivate) => {
                            row.production_status = LifecycleStatus::Deactivated;
                            property.property.production_version = None;
                        }
                    }
                }
            }
        }
        Ok(status)
    }
}

// ---------------------------------------------------------------------------
// SearchService
// ---------------------------------------------------------------------------

impl SearchService for InMemoryPlane {
    fn search(&self, key: SearchKey, term: &str) -> Result<Vec<SearchHit>, PlaneError> {
        let state = self.lock();
        let mut hits = Vec::new();
        for (property_id, record) in &state.properties {
            let matched = match key {
                SearchKey::ByName => record.property.property_name == term,
                SearchKey::ByHostname => state
                    .bindings
                    .get(property_id)
                    .is_some_and(|b| b.iter().any(|h| h.cname_from == term)),
                SearchKey::ByEdgeHostname => state
                    .bindings
                    .get(property_id)
                    .is_some_and(|b| b.iter().any(|h| h.cname_to == term)),
            };
            if matched {
                hits.push(SearchHit {
                    property_id: property_id.clone(),
                    contract_id: record.property.contract_id.clone(),
                    group_id: record.property.group_id.clone(),
                });
            }
        }
        Ok(hits)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_counter_derived_and_stable() {
        let plane = InMemoryPlane::new();
        let a = plane.seed_property("a.example.com");
        let b = plane.seed_property("b.example.com");
        assert_eq!(a.property_id, "prp_1");
        assert_eq!(b.property_id, "prp_2");
    }

    #[test]
    fn find_never_returns_the_product_id() {
        let plane = InMemoryPlane::new();
        let created = PropertyStore::create(
            &plane,
            &NewProperty {
                property_name: "www.example.com".to_string(),
                contract_id: "ctr_1".to_string(),
                group_id: "grp_1".to_string(),
                product_id: "prd_1".to_string(),
                rule_format: None,
                clone_from: None,
            },
        )
        .unwrap();
        assert_eq!(created.product_id.as_deref(), Some("prd_1"));

        let fetched = plane.find(&created.property_id).unwrap();
        assert_eq!(fetched.product_id, None);
        assert_eq!(fetched.rule_format, DEFAULT_RULE_FORMAT);
    }

    #[test]
    fn scripted_edge_hostname_goes_active_after_n_polls() {
        let plane = InMemoryPlane::new();
        plane.script_edge_hostname_polls(2);
        let edge = EdgeHostnameStore::create(
            &plane,
            &NewEdgeHostname {
                domain: "www.example.com".to_string(),
                product_id: "prd_1".to_string(),
                ip_version: IpVersion::V4,
            },
        )
        .unwrap();
        assert_eq!(edge.edge_hostname_domain, "www.example.com.edgesuite.net");
        assert_eq!(edge.status, LifecycleStatus::New);

        let id = &edge.edge_hostname_id;
        assert_eq!(
            EdgeHostnameStore::status(&plane, id).unwrap(),
            LifecycleStatus::Pending
        );
        assert_eq!(
            EdgeHostnameStore::status(&plane, id).unwrap(),
            LifecycleStatus::Pending
        );
        assert_eq!(
            EdgeHostnameStore::status(&plane, id).unwrap(),
            LifecycleStatus::Active
        );
    }

    #[test]
    fn completed_activation_freezes_the_version() {
        let plane = InMemoryPlane::new();
        let property = plane.seed_property("www.example.com");
        let activation = plane
            .submit(
                &property,
                &ActivationRequest {
                    property_version: 1,
                    network: Network::Staging,
                    activation_type: ActivationType::Activate,
                    notify_emails: vec![],
                    note: String::new(),
                },
            )
            .unwrap();

        let status =
            ActivationStore::status(&plane, &property.property_id, &activation.activation_id)
                .unwrap();
        assert_eq!(status, LifecycleStatus::Active);

        let latest = plane.latest_version(&property.property_id).unwrap();
        assert_eq!(latest.staging_status, LifecycleStatus::Active);
        assert!(!latest.is_editable());
    }

    #[test]
    fn search_covers_name_hostname_and_edge_hostname() {
        let plane = InMemoryPlane::new();
        let property = plane.seed_property("www.example.com");
        let edge = plane.seed_edge_hostname("www.example.com.edgesuite.net");
        HostnameStore::save(
            &plane,
            &property,
            &[HostnameBinding::to_edge_hostname("www.example.com", &edge)],
        )
        .unwrap();

        for (key, term) in [
            (SearchKey::ByName, "www.example.com"),
            (SearchKey::ByHostname, "www.example.com"),
            (SearchKey::ByEdgeHostname, "www.example.com.edgesuite.net"),
        ] {
            let hits = plane.search(key, term).unwrap();
            assert_eq!(hits.len(), 1, "{key:?} {term}");
            assert_eq!(hits[0].property_id, property.property_id);
        }

        assert!(plane
            .search(SearchKey::ByName, "missing.example.com")
            .unwrap()
            .is_empty());
    }
}
