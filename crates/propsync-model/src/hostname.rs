use serde::{Deserialize, Serialize};

use crate::status::LifecycleStatus;

/// Default edge hostname domain suffix used by the 1:1 convention match
/// (`example.com` ↔ `example.com.edgesuite.net`).
pub const EDGE_HOSTNAME_SUFFIX: &str = "edgesuite.net";

// ---------------------------------------------------------------------------
// EdgeHostname
// ---------------------------------------------------------------------------

/// IP-version behavior of an edge hostname.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IpVersion {
    #[serde(rename = "IPV4")]
    V4,
    #[serde(rename = "IPV6_COMPLIANCE")]
    V6Compliance,
}

/// A provisioned edge hostname. The domain is immutable once created;
/// creation is asynchronous on the remote side, so a freshly created record
/// starts out non-`ACTIVE` and must be polled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeHostname {
    pub edge_hostname_id: String,
    pub edge_hostname_domain: String,
    pub ip_version_behavior: IpVersion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    pub status: LifecycleStatus,
}

impl EdgeHostname {
    /// Domain with the well-known suffix stripped; the whole domain when it
    /// carries some other suffix.
    pub fn domain_prefix(&self) -> &str {
        self.edge_hostname_domain
            .strip_suffix(EDGE_HOSTNAME_SUFFIX)
            .and_then(|rest| rest.strip_suffix('.'))
            .unwrap_or(&self.edge_hostname_domain)
    }

    pub fn domain_suffix(&self) -> &str {
        if self.domain_prefix().len() < self.edge_hostname_domain.len() {
            EDGE_HOSTNAME_SUFFIX
        } else {
            ""
        }
    }
}

// ---------------------------------------------------------------------------
// HostnameBinding
// ---------------------------------------------------------------------------

/// CNAME record type of a binding. Only edge hostnames are supported.
pub const CNAME_TYPE_EDGE_HOSTNAME: &str = "EDGE_HOSTNAME";

/// One hostname → edge hostname binding on a property version. The binding
/// list is replaced wholesale on every save, never merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostnameBinding {
    pub cname_type: String,
    pub cname_from: String,
    pub cname_to: String,
    pub edge_hostname_id: String,
}

impl HostnameBinding {
    pub fn to_edge_hostname(hostname: impl Into<String>, edge: &EdgeHostname) -> Self {
        Self {
            cname_type: CNAME_TYPE_EDGE_HOSTNAME.to_string(),
            cname_from: hostname.into(),
            cname_to: edge.edge_hostname_domain.clone(),
            edge_hostname_id: edge.edge_hostname_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(domain: &str) -> EdgeHostname {
        EdgeHostname {
            edge_hostname_id: "ehn_1".to_string(),
            edge_hostname_domain: domain.to_string(),
            ip_version_behavior: IpVersion::V4,
            product_id: None,
            status: LifecycleStatus::Active,
        }
    }

    #[test]
    fn domain_prefix_strips_the_convention_suffix() {
        let e = edge("example.com.edgesuite.net");
        assert_eq!(e.domain_prefix(), "example.com");
        assert_eq!(e.domain_suffix(), "edgesuite.net");
    }

    #[test]
    fn unconventional_domains_are_left_whole() {
        let e = edge("example.custom.cdn");
        assert_eq!(e.domain_prefix(), "example.custom.cdn");
        assert_eq!(e.domain_suffix(), "");
    }

    #[test]
    fn ip_version_wire_names() {
        assert_eq!(
            serde_json::to_string(&IpVersion::V6Compliance).unwrap(),
            "\"IPV6_COMPLIANCE\""
        );
        assert_eq!(serde_json::to_string(&IpVersion::V4).unwrap(), "\"IPV4\"");
    }
}
