//! Scenario: a rejected rule tree surfaces every violation the remote plane
//! returned, aggregated into one error, never truncated to the first.

use std::sync::Arc;
use std::time::Duration;

use propsync_engine::Engine;
use propsync_lifecycle::PollConfig;
use propsync_model::RuleViolation;
use propsync_plane::PlaneError;
use propsync_testkit::{init_tracing, property_spec, InMemoryPlane};

fn engine_over(plane: &InMemoryPlane) -> Engine {
    Engine::new(
        Arc::new(plane.clone()),
        Arc::new(plane.clone()),
        Arc::new(plane.clone()),
        Arc::new(plane.clone()),
        Arc::new(plane.clone()),
        Arc::new(plane.clone()),
    )
    .with_poll_config(PollConfig {
        poll_interval: Duration::from_millis(5),
        activation_deadline: Duration::from_millis(500),
        edge_hostname_deadline: Duration::from_millis(500),
    })
}

fn violation(title: &str, behavior: &str) -> RuleViolation {
    RuleViolation {
        violation_type: "https://problems.example.net/invalid-option".to_string(),
        title: title.to_string(),
        detail: format!("{behavior} option rejected"),
        instance: "/rules/behaviors".to_string(),
        behavior_name: behavior.to_string(),
    }
}

#[tokio::test]
async fn scenario_all_violations_surface_in_one_error() {
    init_tracing();
    let plane = InMemoryPlane::new();
    let engine = engine_over(&plane);

    plane.fail_next_rules_save(vec![
        violation("missing required option", "origin"),
        violation("unknown option key", "caching"),
    ]);

    let err = engine.create(&property_spec("www.example.com")).await.unwrap_err();

    let PlaneError::Validation { violations } = &err else {
        panic!("expected a validation error, got {err}");
    };
    assert_eq!(violations.len(), 2);

    let message = err.to_string();
    assert!(message.contains("missing required option"), "{message}");
    assert!(message.contains("unknown option key"), "{message}");
    assert!(message.contains("origin"), "{message}");
    assert!(message.contains("caching"), "{message}");

    // The pass stopped at the rule save: no bindings, no activation.
    assert!(plane.recorded_bindings("prp_1").is_empty());
    assert!(plane.recorded_activations("prp_1").is_empty());
}
