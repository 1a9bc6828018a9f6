//! Core data model for the property reconciliation engine.
//!
//! Everything here is plain owned data: the remote property resource and its
//! versions, the recursive rule tree, edge hostnames and hostname bindings,
//! activation records, and the typed view of the declarative configuration
//! that the engine consumes. No I/O lives in this crate.

pub mod activation;
pub mod hostname;
pub mod options;
pub mod property;
pub mod rules;
pub mod spec;
pub mod status;

pub use activation::{latest_activation, Activation, ActivationType, Network};
pub use hostname::{
    EdgeHostname, HostnameBinding, IpVersion, CNAME_TYPE_EDGE_HOSTNAME, EDGE_HOSTNAME_SUFFIX,
};
pub use options::{normalize, normalize_values, OptionBag, OptionValue};
pub use property::{Property, PropertyVersion};
pub use rules::{Behavior, Criteria, MatchMode, Rule, RuleTree, RuleViolation, Variable};
pub use spec::{
    BehaviorSpec, CloneFrom, CpCode, CriteriaSpec, OptionSpec, OriginSpec, PropertySpec, RuleSpec,
    RulesSpec, VariableSpec,
};
pub use status::LifecycleStatus;
