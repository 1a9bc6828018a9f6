//! Typed view of the declarative configuration.
//!
//! The binding/schema layer (outside this repository) validates raw user
//! input and hands the engine these structs. Option values arrive as strings
//! here; the normalizer in [`crate::options`] is the single point where their
//! types are recovered.

use crate::activation::Network;
use crate::rules::MatchMode;

// ---------------------------------------------------------------------------
// PropertySpec
// ---------------------------------------------------------------------------

/// Desired state of one property, as declared by the user.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PropertySpec {
    /// Display name. Immutable after creation.
    pub name: String,
    pub contract_id: Option<String>,
    pub group_id: Option<String>,
    pub product_id: Option<String>,
    /// CP code id (`cpc_`-prefixed) merged into the root rule.
    pub cp_code: String,
    pub rule_format: Option<String>,
    /// Target network for activations.
    pub network: Network,
    /// Submit an activation at the end of a reconciliation pass.
    pub activate: bool,
    /// Origin hostnames to bind, in declaration order.
    pub hostnames: Vec<String>,
    /// Explicit edge hostname override; when set, hostname resolution pins
    /// declared hostnames to this domain instead of convention matching.
    pub edge_hostname: Option<String>,
    pub ipv6: bool,
    /// Notification emails for activations.
    pub contacts: Vec<String>,
    pub origin: Option<OriginSpec>,
    /// Declared rule tree content merged into the root rule.
    pub rules: Option<RulesSpec>,
    pub clone_from: Option<CloneFrom>,
}

impl PropertySpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            activate: true,
            ..Self::default()
        }
    }
}

/// Source property to clone when creating a new one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CloneFrom {
    pub property_id: String,
    /// `None` clones the source's latest version.
    pub version: Option<u64>,
    pub etag: Option<String>,
    pub copy_hostnames: bool,
}

// ---------------------------------------------------------------------------
// OriginSpec
// ---------------------------------------------------------------------------

/// Origin server block expanded into the root `origin` behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginSpec {
    pub hostname: String,
    pub is_secure: String,
    pub port: i64,
    pub https_port: i64,
    /// `ORIGIN_HOSTNAME`, `REQUEST_HOST_HEADER`, or a custom hostname.
    pub forward_hostname: String,
    pub cache_key_hostname: String,
    pub compress: bool,
    pub enable_true_client_ip: bool,
    pub true_client_ip_header: String,
    pub true_client_ip_client_setting: bool,
}

impl Default for OriginSpec {
    fn default() -> Self {
        Self {
            hostname: String::new(),
            is_secure: String::new(),
            port: 80,
            https_port: 443,
            forward_hostname: "ORIGIN_HOSTNAME".to_string(),
            cache_key_hostname: "ORIGIN_HOSTNAME".to_string(),
            compress: false,
            enable_true_client_ip: false,
            true_client_ip_header: "True-Client-IP".to_string(),
            true_client_ip_client_setting: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Declared rules
// ---------------------------------------------------------------------------

/// Root-level declared rule content: behaviors and criteria merged straight
/// into the root rule, plus nested child rules. The schema bounds nesting at
/// five levels; the merge itself is depth-agnostic.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RulesSpec {
    pub behaviors: Vec<BehaviorSpec>,
    pub criteria: Vec<CriteriaSpec>,
    pub children: Vec<RuleSpec>,
}

/// One declared (child) rule.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RuleSpec {
    pub name: String,
    pub comment: String,
    pub criteria_match: MatchMode,
    pub criteria: Vec<CriteriaSpec>,
    pub behaviors: Vec<BehaviorSpec>,
    pub variables: Vec<VariableSpec>,
    pub children: Vec<RuleSpec>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BehaviorSpec {
    pub name: String,
    pub options: Vec<OptionSpec>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CriteriaSpec {
    pub name: String,
    pub options: Vec<OptionSpec>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct VariableSpec {
    pub name: String,
    pub description: String,
    pub value: String,
    pub hidden: bool,
    pub sensitive: bool,
}

/// One declared option: a single string value, or a multi-valued list.
/// `values` wins when non-empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OptionSpec {
    pub key: String,
    pub value: String,
    pub values: Vec<String>,
}

impl OptionSpec {
    pub fn single(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            values: Vec::new(),
        }
    }

    pub fn multi(key: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            key: key.into(),
            value: String::new(),
            values,
        }
    }
}

// ---------------------------------------------------------------------------
// CpCode
// ---------------------------------------------------------------------------

/// A CP code reference. The remote API wants the bare numeric id inside the
/// standard `cpCode` behavior, while users declare the `cpc_`-prefixed form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpCode {
    pub cp_code_id: String,
}

impl CpCode {
    pub fn new(cp_code_id: impl Into<String>) -> Self {
        Self {
            cp_code_id: cp_code_id.into(),
        }
    }

    /// Numeric form of the id with the `cpc_` prefix stripped; `0` when the
    /// remainder does not parse, matching the remote client's lenient
    /// handling.
    pub fn numeric_id(&self) -> i64 {
        self.cp_code_id
            .strip_prefix("cpc_")
            .unwrap_or(&self.cp_code_id)
            .parse()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cp_code_numeric_id_strips_prefix() {
        assert_eq!(CpCode::new("cpc_12345").numeric_id(), 12345);
        assert_eq!(CpCode::new("12345").numeric_id(), 12345);
        assert_eq!(CpCode::new("cpc_x").numeric_id(), 0);
    }

    #[test]
    fn origin_spec_defaults_match_the_schema() {
        let origin = OriginSpec::default();
        assert_eq!(origin.port, 80);
        assert_eq!(origin.https_port, 443);
        assert_eq!(origin.forward_hostname, "ORIGIN_HOSTNAME");
        assert_eq!(origin.cache_key_hostname, "ORIGIN_HOSTNAME");
        assert_eq!(origin.true_client_ip_header, "True-Client-IP");
        assert!(!origin.compress);
    }

    #[test]
    fn new_spec_defaults_to_staging_with_activation() {
        let spec = PropertySpec::new("example.com");
        assert_eq!(spec.network, Network::Staging);
        assert!(spec.activate);
        assert!(spec.rules.is_none());
    }
}
