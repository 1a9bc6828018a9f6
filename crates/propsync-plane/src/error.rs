use std::time::Duration;

use propsync_model::RuleViolation;

// ---------------------------------------------------------------------------
// PlaneError
// ---------------------------------------------------------------------------

/// Everything that can go wrong talking to the control plane, plus the
/// preconditions the engine checks before it ever makes a remote call.
///
/// No retries happen anywhere in the core: `Operation` propagates
/// immediately. `NotFound` is fatal everywhere except the activation lookup
/// during delete, where it means "nothing to deactivate". `Timeout` is fatal
/// for edge hostname creation and log-and-continue for activation polling.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaneError {
    /// The remote plane rejected a rule tree. All violations are carried,
    /// and `Display` renders every one of them.
    Validation { violations: Vec<RuleViolation> },
    /// A lookup or search yielded nothing.
    NotFound { what: String },
    /// A polling deadline elapsed before the tracked object went active.
    Timeout { what: String, waited: Duration },
    /// Any other failure returned by a store operation.
    Operation { what: String, detail: String },
    /// Required declarative input is missing; raised before any remote call.
    Precondition { what: String },
}

impl PlaneError {
    pub fn not_found(what: impl Into<String>) -> Self {
        PlaneError::NotFound { what: what.into() }
    }

    pub fn timeout(what: impl Into<String>, waited: Duration) -> Self {
        PlaneError::Timeout {
            what: what.into(),
            waited,
        }
    }

    pub fn operation(what: impl Into<String>, detail: impl Into<String>) -> Self {
        PlaneError::Operation {
            what: what.into(),
            detail: detail.into(),
        }
    }

    pub fn precondition(what: impl Into<String>) -> Self {
        PlaneError::Precondition { what: what.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PlaneError::NotFound { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, PlaneError::Timeout { .. })
    }
}

impl std::fmt::Display for PlaneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaneError::Validation { violations } => {
                // Aggregate every violation; surfacing only the first hides
                // the remaining fixes a user has to make.
                write!(f, "invalid property rules")?;
                for v in violations {
                    write!(f, "\n {}", v.summary())?;
                }
                Ok(())
            }
            PlaneError::NotFound { what } => write!(f, "{what} not found"),
            PlaneError::Timeout { what, waited } => {
                write!(f, "timed out after {}s waiting for {what}", waited.as_secs())
            }
            PlaneError::Operation { what, detail } => {
                write!(f, "remote operation failed: {what}: {detail}")
            }
            PlaneError::Precondition { what } => write!(f, "{what}"),
        }
    }
}

impl std::error::Error for PlaneError {}
