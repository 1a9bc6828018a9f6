//! Scenario: import resolves direct identifiers and search terms; the
//! existence check maps not-found to a clean false.

use std::sync::Arc;

use propsync_engine::Engine;
use propsync_model::HostnameBinding;
use propsync_plane::HostnameStore;
use propsync_testkit::{init_tracing, InMemoryPlane};

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

fn seeded_plane() -> InMemoryPlane {
    let plane = InMemoryPlane::new();
    let property = plane.seed_property("www.example.com");
    let edge = plane.seed_edge_hostname("www.example.com.edgesuite.net");
    HostnameStore::save(
        &plane,
        &property,
        &[HostnameBinding::to_edge_hostname("www.example.com", &edge)],
    )
    .unwrap();
    plane
}

#[test]
fn scenario_import_accepts_a_direct_identifier() {
    init_tracing();
    let plane = seeded_plane();
    let engine = engine_over(&plane);

    let snapshot = engine.import_property("prp_1").unwrap();
    assert_eq!(snapshot.property_id, "prp_1");
    assert_eq!(snapshot.name, "www.example.com");
}

#[test]
fn scenario_import_resolves_search_terms_in_order() {
    init_tracing();
    let plane = seeded_plane();
    let engine = engine_over(&plane);

    // By name.
    let by_name = engine.import_property("www.example.com").unwrap();
    assert_eq!(by_name.property_id, "prp_1");

    // By edge hostname domain.
    let by_edge = engine
        .import_property("www.example.com.edgesuite.net")
        .unwrap();
    assert_eq!(by_edge.property_id, "prp_1");
}

#[test]
fn scenario_import_of_an_unknown_term_is_not_found() {
    init_tracing();
    let plane = seeded_plane();
    let engine = engine_over(&plane);

    let err = engine.import_property("missing.example.com").unwrap_err();
    assert!(err.is_not_found(), "{err}");
}

#[test]
fn scenario_read_reflects_remote_version_state() {
    init_tracing();
    let plane = seeded_plane();
    let engine = engine_over(&plane);

    let before = engine.read("prp_1").unwrap();
    assert_eq!(before.version, 1);
    assert_eq!(before.staging_version, None);
    assert_eq!(before.production_version, None);

    plane.set_version_status(
        "prp_1",
        1,
        propsync_model::Network::Staging,
        propsync_model::LifecycleStatus::Active,
    );

    let after = engine.read("prp_1").unwrap();
    assert_eq!(after.staging_version, Some(1));
    assert_eq!(after.production_version, None);
}

#[test]
fn scenario_exists_reports_presence_without_failing_on_absence() {
    init_tracing();
    let plane = seeded_plane();
    let engine = engine_over(&plane);

    assert!(engine.exists("prp_1").unwrap());
    assert!(!engine.exists("prp_404").unwrap());
}
