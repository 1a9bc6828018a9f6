//! Scenario: activation outcomes at the engine boundary. A timed-out or
//! stopped activation poll never fails the pass; only submission errors do.

use std::sync::Arc;
use std::time::Duration;

use propsync_engine::Engine;
use propsync_lifecycle::{ActivationPhase, PollConfig};
use propsync_model::LifecycleStatus;
use propsync_testkit::{init_tracing, property_spec, InMemoryPlane};

fn engine_with(plane: &InMemoryPlane, poll: PollConfig) -> Engine {
    Engine::new(
        Arc::new(plane.clone()),
        Arc::new(plane.clone()),
        Arc::new(plane.clone()),
        Arc::new(plane.clone()),
        Arc::new(plane.clone()),
        Arc::new(plane.clone()),
    )
    .with_poll_config(poll)
}

fn fast_poll() -> PollConfig {
    PollConfig {
        poll_interval: Duration::from_millis(5),
        activation_deadline: Duration::from_millis(500),
        edge_hostname_deadline: Duration::from_millis(500),
    }
}

#[tokio::test]
async fn scenario_activation_timeout_is_swallowed() {
    init_tracing();
    let plane = InMemoryPlane::new();
    // Pending forever relative to the test deadline; the deadline is shorter
    // than the poll cadence so the second wait elapses.
    plane.script_activation_polls(10_000);
    let engine = engine_with(
        &plane,
        PollConfig {
            poll_interval: Duration::from_millis(200),
            activation_deadline: Duration::from_millis(50),
            edge_hostname_deadline: Duration::from_millis(500),
        },
    );

    let snapshot = engine
        .create(&property_spec("www.example.com"))
        .await
        .expect("timeout must not fail the pass");

    let run = snapshot.activation.unwrap();
    assert_eq!(run.phase, ActivationPhase::TimedOut);
    assert!(!run.reached_active());
}

#[tokio::test]
async fn scenario_aborted_activation_poll_is_not_an_error() {
    init_tracing();
    let plane = InMemoryPlane::new();
    plane.script_activation_outcome(LifecycleStatus::Aborted, 1);
    let engine = engine_with(&plane, fast_poll());

    let snapshot = engine
        .create(&property_spec("www.example.com"))
        .await
        .unwrap();

    let run = snapshot.activation.unwrap();
    assert_eq!(run.phase, ActivationPhase::Aborted);
}

#[tokio::test]
async fn scenario_no_activation_requested_means_none_submitted() {
    init_tracing();
    let plane = InMemoryPlane::new();
    let engine = engine_with(&plane, fast_poll());

    let mut spec = property_spec("www.example.com");
    spec.activate = false;

    let snapshot = engine.create(&spec).await.unwrap();
    assert!(snapshot.activation.is_none());
    assert!(plane.recorded_activations(&snapshot.property_id).is_empty());
}

#[tokio::test]
async fn scenario_activation_on_frozen_version_bumps_it_first() {
    init_tracing();
    let plane = InMemoryPlane::new();
    let engine = engine_with(&plane, fast_poll());

    // First pass activates version 1, freezing it.
    let spec = property_spec("www.example.com");
    let first = engine.create(&spec).await.unwrap();
    assert_eq!(first.version, 1);

    // The next pass must not mutate the frozen version: the guard clones a
    // fresh version 2 before rules are touched.
    let second = engine
        .update(&first.property_id, &spec, &Default::default())
        .await
        .unwrap();
    assert_eq!(second.version, 2);

    let run = second.activation.unwrap();
    assert_eq!(run.activation.property_version, 2);
    assert!(run.reached_active());
}
