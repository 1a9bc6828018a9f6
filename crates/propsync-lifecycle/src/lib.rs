//! Version and activation lifecycle management.
//!
//! Three pieces live here: the editability guard that keeps mutations off
//! frozen property versions, the generic background status poller, and the
//! activation state machine that drives a submitted activation to a terminal
//! phase. The poller is the only place in the system that spawns a task; the
//! driver's receive-with-timeout against its channel is the system's single
//! suspension point.

pub mod guard;
pub mod machine;
pub mod poll;

pub use guard::ensure_editable;
pub use machine::{run_activation, ActivationPhase, ActivationRun, PollConfig};
pub use poll::{spawn_status_poll, StatusEvent, StatusFeed};
