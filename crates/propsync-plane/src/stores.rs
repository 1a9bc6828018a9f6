//! Collaborator traits over the remote control plane.
//!
//! All traits are synchronous and `Send + Sync`: the engine runs one
//! reconciliation at a time, and the only async piece of the system (the
//! status pollers) wraps these in `Arc` and calls them from a background
//! task. Implementations must not retry internally; the core's error policy
//! assumes failures surface immediately.

use propsync_model::{
    Activation, ActivationType, CloneFrom, EdgeHostname, HostnameBinding, IpVersion,
    LifecycleStatus, Network, Property, PropertyVersion, RuleTree,
};

use crate::error::PlaneError;

// ---------------------------------------------------------------------------
// Property store
// ---------------------------------------------------------------------------

/// Creation request for a property. `rule_format` falls back to the store's
/// default format when unset.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProperty {
    pub property_name: String,
    pub contract_id: String,
    pub group_id: String,
    pub product_id: String,
    pub rule_format: Option<String>,
    pub clone_from: Option<CloneFrom>,
}

pub trait PropertyStore: Send + Sync {
    fn find(&self, property_id: &str) -> Result<Property, PlaneError>;

    fn create(&self, request: &NewProperty) -> Result<Property, PlaneError>;

    fn delete(&self, property_id: &str) -> Result<(), PlaneError>;

    fn latest_version(&self, property_id: &str) -> Result<PropertyVersion, PlaneError>;

    fn versions(&self, property_id: &str) -> Result<Vec<PropertyVersion>, PlaneError>;

    /// Clone `parent` into a fresh version and persist it. The new version
    /// becomes the property's latest.
    fn new_version_from(
        &self,
        property_id: &str,
        parent: u64,
        locked: bool,
    ) -> Result<PropertyVersion, PlaneError>;
}

// ---------------------------------------------------------------------------
// Rule tree store
// ---------------------------------------------------------------------------

pub trait RuleTreeStore: Send + Sync {
    /// Rule tree of the property's latest version.
    fn rules(&self, property: &Property) -> Result<RuleTree, PlaneError>;

    /// Persist the tree onto the latest version. May fail with
    /// [`PlaneError::Validation`] carrying structured violations.
    fn save(&self, property: &Property, tree: &RuleTree) -> Result<(), PlaneError>;
}

// ---------------------------------------------------------------------------
// Hostname binding store
// ---------------------------------------------------------------------------

pub trait HostnameStore: Send + Sync {
    fn bindings(&self, property: &Property) -> Result<Vec<HostnameBinding>, PlaneError>;

    /// Replace the property's binding list wholesale.
    fn save(&self, property: &Property, bindings: &[HostnameBinding]) -> Result<(), PlaneError>;
}

// ---------------------------------------------------------------------------
// Edge hostname store
// ---------------------------------------------------------------------------

/// Creation request for an edge hostname. A bare domain (no well-known
/// suffix) is completed with the default suffix by the remote side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEdgeHostname {
    pub domain: String,
    pub product_id: String,
    pub ip_version: IpVersion,
}

pub trait EdgeHostnameStore: Send + Sync {
    fn list(&self, contract_id: &str, group_id: &str) -> Result<Vec<EdgeHostname>, PlaneError>;

    /// Submit a creation. The returned record is pending; callers poll
    /// [`EdgeHostnameStore::status`] until it goes active.
    fn create(&self, request: &NewEdgeHostname) -> Result<EdgeHostname, PlaneError>;

    fn status(&self, edge_hostname_id: &str) -> Result<LifecycleStatus, PlaneError>;
}

// ---------------------------------------------------------------------------
// Activation store
// ---------------------------------------------------------------------------

/// Submission request for an activation or deactivation.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivationRequest {
    pub property_version: u64,
    pub network: Network,
    pub activation_type: ActivationType,
    pub notify_emails: Vec<String>,
    pub note: String,
}

pub trait ActivationStore: Send + Sync {
    /// Submit the activation. The returned record is pending; callers poll
    /// [`ActivationStore::status`] until it reaches a terminal status.
    fn submit(
        &self,
        property: &Property,
        request: &ActivationRequest,
    ) -> Result<Activation, PlaneError>;

    /// Full activation history of the property, oldest first.
    fn list(&self, property: &Property) -> Result<Vec<Activation>, PlaneError>;

    fn status(
        &self,
        property_id: &str,
        activation_id: &str,
    ) -> Result<LifecycleStatus, PlaneError>;
}

// ---------------------------------------------------------------------------
// Search service
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKey {
    ByName,
    ByHostname,
    ByEdgeHostname,
}

/// One search result. Carries enough to fetch the property without a second
/// lookup round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub property_id: String,
    pub contract_id: String,
    pub group_id: String,
}

pub trait SearchService: Send + Sync {
    /// Matching properties, best match first. An empty vec means no match;
    /// it is not an error.
    fn search(&self, key: SearchKey, term: &str) -> Result<Vec<SearchHit>, PlaneError>;
}
