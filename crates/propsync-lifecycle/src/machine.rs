use std::sync::Arc;
use std::time::Duration;

use propsync_model::{Activation, LifecycleStatus, Property};
use propsync_plane::{ActivationRequest, ActivationStore, PlaneError};

use crate::poll::spawn_status_poll;

// ---------------------------------------------------------------------------
// PollConfig
// ---------------------------------------------------------------------------

/// Deadlines and cadence for status polling. Defaults carry the production
/// constants; tests shrink them to milliseconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// Cadence of the background status fetch.
    pub poll_interval: Duration,
    /// Deadline for one wait on an activation/deactivation status feed.
    /// Re-armed on every received event, as the remote client does it.
    pub activation_deadline: Duration,
    /// Deadline for edge hostname creation. Exceeding this one is fatal.
    pub edge_hostname_deadline: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            activation_deadline: Duration::from_secs(90 * 60),
            edge_hostname_deadline: Duration::from_secs(20 * 60),
        }
    }
}

// ---------------------------------------------------------------------------
// ActivationPhase / ActivationRun
// ---------------------------------------------------------------------------

/// Where one activation run currently stands.
///
/// ```text
/// Created ──► Submitted ──► Polling ──► Active      (status reached ACTIVE)
///                                   ├─► TimedOut    (deadline elapsed)
///                                   └─► Aborted     (feed signalled stop)
/// ```
///
/// `TimedOut` and `Aborted` are not errors at this layer: the caller decides
/// whether to fail (edge hostname creation) or log and move on (property
/// activation, which may still converge remotely).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationPhase {
    Created,
    Submitted,
    Polling,
    Active,
    TimedOut,
    Aborted,
}

impl ActivationPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ActivationPhase::Active | ActivationPhase::TimedOut | ActivationPhase::Aborted
        )
    }
}

/// Outcome of driving one activation submission. The activation record is
/// never reused: every submission produces a fresh run.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivationRun {
    pub activation: Activation,
    pub phase: ActivationPhase,
}

impl ActivationRun {
    pub fn reached_active(&self) -> bool {
        self.phase == ActivationPhase::Active
    }
}

// ---------------------------------------------------------------------------
// run_activation
// ---------------------------------------------------------------------------

/// Submit an activation (or deactivation) and poll it to a terminal phase.
///
/// Submission failures propagate as errors. Once submitted, the run always
/// comes back `Ok`: a feed stop is `Aborted`, an elapsed deadline is
/// `TimedOut`, and the caller applies its own fatality policy. The poll task
/// is explicitly stopped on timeout so nothing lingers.
pub async fn run_activation(
    store: Arc<dyn ActivationStore>,
    property: &Property,
    request: &ActivationRequest,
    config: &PollConfig,
) -> Result<ActivationRun, PlaneError> {
    let mut run = ActivationRun {
        activation: store.submit(property, request)?,
        phase: ActivationPhase::Submitted,
    };
    tracing::debug!(
        activation_id = %run.activation.activation_id,
        network = %run.activation.network,
        activation_type = ?run.activation.activation_type,
        version = run.activation.property_version,
        "activation submitted"
    );

    let property_id = property.property_id.clone();
    let activation_id = run.activation.activation_id.clone();
    let poll_store = Arc::clone(&store);
    let mut feed = spawn_status_poll(
        format!("activation {activation_id}"),
        config.poll_interval,
        move || poll_store.status(&property_id, &activation_id),
    );

    run.phase = ActivationPhase::Polling;
    while run.activation.status != LifecycleStatus::Active {
        match tokio::time::timeout(config.activation_deadline, feed.recv()).await {
            Ok(Some(event)) => {
                run.activation.status = event.status;
                if event.status == LifecycleStatus::Active {
                    break;
                }
                if !event.keep_polling {
                    run.phase = ActivationPhase::Aborted;
                    break;
                }
            }
            Ok(None) => {
                run.phase = ActivationPhase::Aborted;
                break;
            }
            Err(_elapsed) => {
                feed.stop();
                run.phase = ActivationPhase::TimedOut;
                tracing::warn!(
                    activation_id = %run.activation.activation_id,
                    deadline_secs = config.activation_deadline.as_secs(),
                    "activation polling deadline elapsed"
                );
                break;
            }
        }
    }

    if run.activation.status == LifecycleStatus::Active {
        run.phase = ActivationPhase::Active;
    }
    Ok(run)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use propsync_model::{ActivationType, Network};
    use propsync_testkit::InMemoryPlane;

    fn request() -> ActivationRequest {
        ActivationRequest {
            property_version: 1,
            network: Network::Staging,
            activation_type: ActivationType::Activate,
            notify_emails: vec!["noc@example.com".to_string()],
            note: "test".to_string(),
        }
    }

    fn fast_config() -> PollConfig {
        PollConfig {
            poll_interval: Duration::from_millis(5),
            activation_deadline: Duration::from_millis(250),
            edge_hostname_deadline: Duration::from_millis(250),
        }
    }

    #[tokio::test]
    async fn run_reaches_active_through_pending_states() {
        let plane = InMemoryPlane::new();
        let property = plane.seed_property("www.example.com");
        plane.script_activation_polls(2);

        let run = run_activation(
            Arc::new(plane.clone()),
            &property,
            &request(),
            &fast_config(),
        )
        .await
        .unwrap();

        assert_eq!(run.phase, ActivationPhase::Active);
        assert_eq!(run.activation.status, LifecycleStatus::Active);
        assert!(run.reached_active());
    }

    #[tokio::test]
    async fn feed_stop_signal_aborts_without_error() {
        let plane = InMemoryPlane::new();
        let property = plane.seed_property("www.example.com");
        // The fake reports ABORTED for this activation; the poller publishes
        // it as a terminal non-active event.
        plane.script_activation_outcome(LifecycleStatus::Aborted, 1);

        let run = run_activation(
            Arc::new(plane.clone()),
            &property,
            &request(),
            &fast_config(),
        )
        .await
        .unwrap();

        assert_eq!(run.phase, ActivationPhase::Aborted);
        assert!(!run.reached_active());
    }

    #[tokio::test]
    async fn deadline_elapse_yields_timed_out_phase() {
        let plane = InMemoryPlane::new();
        let property = plane.seed_property("www.example.com");
        // Never goes active within the test deadline.
        plane.script_activation_polls(10_000);

        // The deadline is shorter than the poll cadence, so the second wait
        // on the feed elapses before any further event arrives.
        let config = PollConfig {
            poll_interval: Duration::from_millis(200),
            activation_deadline: Duration::from_millis(50),
            edge_hostname_deadline: Duration::from_millis(50),
        };
        let run = run_activation(Arc::new(plane.clone()), &property, &request(), &config)
            .await
            .unwrap();

        assert_eq!(run.phase, ActivationPhase::TimedOut);
    }

    #[test]
    fn phase_terminality() {
        assert!(ActivationPhase::Active.is_terminal());
        assert!(ActivationPhase::TimedOut.is_terminal());
        assert!(ActivationPhase::Aborted.is_terminal());
        assert!(!ActivationPhase::Polling.is_terminal());
        assert!(!ActivationPhase::Created.is_terminal());
    }
}
