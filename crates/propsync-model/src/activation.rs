use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::LifecycleStatus;

// ---------------------------------------------------------------------------
// Network / ActivationType
// ---------------------------------------------------------------------------

/// Target network of an activation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Network {
    #[default]
    Staging,
    Production,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Staging => "STAGING",
            Network::Production => "PRODUCTION",
        }
    }

    /// Parse the declarative form (case-insensitive, the way users write it).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_uppercase().as_str() {
            "STAGING" => Some(Network::Staging),
            "PRODUCTION" => Some(Network::Production),
            _ => None,
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of an activation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivationType {
    Activate,
    Deactivate,
}

// ---------------------------------------------------------------------------
// Activation
// ---------------------------------------------------------------------------

/// One submitted activation (or deactivation) of a property version. Never
/// reused across submissions: every submit produces a fresh record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activation {
    pub activation_id: String,
    pub property_version: u64,
    pub network: Network,
    pub activation_type: ActivationType,
    pub status: LifecycleStatus,
    #[serde(default)]
    pub notify_emails: Vec<String>,
    #[serde(default)]
    pub note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_date: Option<DateTime<Utc>>,
}

/// The most recent activation on `network` with the given status, or `None`
/// when the history holds nothing matching. History is ordered oldest-first
/// as the remote plane returns it.
pub fn latest_activation(
    history: &[Activation],
    network: Network,
    status: LifecycleStatus,
) -> Option<&Activation> {
    history
        .iter()
        .rev()
        .find(|a| a.network == network && a.status == status)
}
