//! Scenario: creating a brand-new property requires the owning group,
//! contract and product up front; the engine refuses before touching the
//! remote plane.

use std::sync::Arc;

use propsync_engine::Engine;
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
}

#[tokio::test]
async fn scenario_missing_group_is_a_precondition_failure() {
    init_tracing();
    let plane = InMemoryPlane::new();
    let engine = engine_over(&plane);

    let mut spec = property_spec("www.example.com");
    spec.group_id = None;

    let err = engine.create(&spec).await.unwrap_err();
    assert_eq!(
        err,
        PlaneError::precondition("group_id must be specified to create a new property")
    );
    assert!(!plane.property_exists("prp_1"), "nothing may be created");
}

#[tokio::test]
async fn scenario_missing_contract_is_a_precondition_failure() {
    init_tracing();
    let plane = InMemoryPlane::new();
    let engine = engine_over(&plane);

    let mut spec = property_spec("www.example.com");
    spec.contract_id = None;

    let err = engine.create(&spec).await.unwrap_err();
    assert_eq!(
        err,
        PlaneError::precondition("contract_id must be specified to create a new property")
    );
}

#[tokio::test]
async fn scenario_missing_product_is_a_precondition_failure() {
    init_tracing();
    let plane = InMemoryPlane::new();
    let engine = engine_over(&plane);

    let mut spec = property_spec("www.example.com");
    spec.product_id = None;

    let err = engine.create(&spec).await.unwrap_err();
    assert_eq!(
        err,
        PlaneError::precondition("product_id must be specified to create a new property")
    );
}

#[tokio::test]
async fn scenario_group_is_checked_first_when_everything_is_missing() {
    init_tracing();
    let plane = InMemoryPlane::new();
    let engine = engine_over(&plane);

    let mut spec = property_spec("www.example.com");
    spec.group_id = None;
    spec.contract_id = None;
    spec.product_id = None;

    let err = engine.create(&spec).await.unwrap_err();
    assert!(err.to_string().contains("group_id"), "{err}");
}
