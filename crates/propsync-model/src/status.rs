use serde::{Deserialize, Serialize};

/// Lifecycle status vocabulary shared by property versions, activations and
/// edge hostnames. Wire values are the remote API's screaming-snake forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleStatus {
    Active,
    Inactive,
    New,
    Pending,
    Aborted,
    Deactivated,
    Failed,
}

impl LifecycleStatus {
    /// Statuses a background poll can stop at: the tracked object will not
    /// move again on its own.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LifecycleStatus::Active
                | LifecycleStatus::Aborted
                | LifecycleStatus::Deactivated
                | LifecycleStatus::Failed
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleStatus::Active => "ACTIVE",
            LifecycleStatus::Inactive => "INACTIVE",
            LifecycleStatus::New => "NEW",
            LifecycleStatus::Pending => "PENDING",
            LifecycleStatus::Aborted => "ABORTED",
            LifecycleStatus::Deactivated => "DEACTIVATED",
            LifecycleStatus::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
