//! Hostname to edge hostname resolution and provisioning.
//!
//! Given the contract/group's existing edge hostnames and the declared
//! origin hostnames, this crate computes the hostname assignment, provisions
//! new edge hostnames when nothing suitable exists (waiting, bounded, for
//! them to go active), and replaces the property's binding list.

pub mod bindings;
pub mod resolver;

pub use bindings::apply_bindings;
pub use resolver::{build_hostname_map, convention_assignment, create_edge_hostname};
