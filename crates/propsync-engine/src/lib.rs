//! The reconciliation driver.
//!
//! One `Engine` owns handles to every control plane collaborator and
//! exposes the resource entry points: `create`, `read`, `update`, `delete`,
//! `import_property`, `exists`. Each call is one reconciliation pass:
//! single-threaded, no shared state with other passes, the remote plane as
//! the only source of truth. Partial progress is never rolled back; the
//! plane's own versioning bounds the blast radius of a failed pass.

pub mod engine;
pub mod snapshot;

pub use engine::{Engine, ACTIVATION_NOTE};
pub use snapshot::{ChangeFlags, PropertySnapshot};
