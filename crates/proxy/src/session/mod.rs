//! Session lifecycle subsystem.
//!
//! Centralizes the live session registry and the create/forward/delete
//! orchestration that keeps it consistent with the backend.

/// Create/forward/delete orchestration over the registry and collaborators.
pub mod broker;
/// Concurrent session registry and record types.
pub mod registry;

pub use broker::SessionBroker;
pub use registry::{SessionRecord, SessionRegistry};
