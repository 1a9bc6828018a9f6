//! Test support: a deterministic in-memory control plane implementing every
//! collaborator trait, plus spec builders and tracing bootstrap for tests.
//!
//! The fake is intentionally boring: no randomness, no wall-clock reads,
//! counter-derived ids, `BTreeMap` state. Status progressions are scripted
//! per test ("go active after N polls"), which is what lets the polling
//! machinery be exercised with millisecond deadlines.

pub mod plane;

pub use plane::InMemoryPlane;

use propsync_model::{OriginSpec, PropertySpec};

/// A property spec with everything a create pass needs, ready for tests to
/// tweak.
pub fn property_spec(name: &str) -> PropertySpec {
    PropertySpec {
        contract_id: Some("ctr_1".to_string()),
        group_id: Some("grp_1".to_string()),
        product_id: Some("prd_1".to_string()),
        cp_code: "cpc_12345".to_string(),
        hostnames: vec![name.to_string()],
        contacts: vec!["noc@example.com".to_string()],
        origin: Some(OriginSpec {
            hostname: "origin.example.com".to_string(),
            is_secure: "false".to_string(),
            ..OriginSpec::default()
        }),
        ..PropertySpec::new(name)
    }
}

/// One-shot tracing init for tests; safe to call from every test.
pub fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "info".into()),
            )
            .with_test_writer()
            .try_init();
    });
}
