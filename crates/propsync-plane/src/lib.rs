//! Interfaces to the remote control plane.
//!
//! The reconciliation engine only ever talks to the remote side through the
//! traits in this crate; the HTTP transport and authentication live behind
//! them, outside this repository. Tests implement the same traits with a
//! deterministic in-memory plane (`propsync-testkit`).

pub mod error;
pub mod stores;

pub use error::PlaneError;
pub use stores::{
    ActivationRequest, ActivationStore, EdgeHostnameStore, HostnameStore, NewEdgeHostname,
    NewProperty, PropertyStore, RuleTreeStore, SearchHit, SearchKey, SearchService,
};
