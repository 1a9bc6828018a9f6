use serde::{Deserialize, Serialize};

use crate::status::LifecycleStatus;

// ---------------------------------------------------------------------------
// Property
// ---------------------------------------------------------------------------

/// The versioned property resource as the remote control plane reports it.
///
/// `product_id` is write-once: it is supplied on creation but the remote API
/// does not return it on reads, so it is `None` on any fetched snapshot.
/// `name` is immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub property_id: String,
    pub account_id: String,
    pub contract_id: String,
    pub group_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    pub property_name: String,
    #[serde(default)]
    pub note: String,
    pub rule_format: String,
    pub latest_version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staging_version: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production_version: Option<u64>,
}

// ---------------------------------------------------------------------------
// PropertyVersion
// ---------------------------------------------------------------------------

/// One version row of a property, with its per-network activation status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyVersion {
    pub property_version: u64,
    pub staging_status: LifecycleStatus,
    pub production_status: LifecycleStatus,
}

impl PropertyVersion {
    /// A version is editable while it has never been activated on either
    /// network. The remote plane freezes it the moment an activation touches
    /// it.
    pub fn is_editable(&self) -> bool {
        self.staging_status == LifecycleStatus::Inactive
            && self.production_status == LifecycleStatus::Inactive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_editability_requires_both_networks_inactive() {
        let mut v = PropertyVersion {
            property_version: 3,
            staging_status: LifecycleStatus::Inactive,
            production_status: LifecycleStatus::Inactive,
        };
        assert!(v.is_editable());

        v.staging_status = LifecycleStatus::Active;
        assert!(!v.is_editable());

        v.staging_status = LifecycleStatus::Inactive;
        v.production_status = LifecycleStatus::Pending;
        assert!(!v.is_editable());
    }
}
