//! # wa-core
//!
//! Backend-agnostic orchestration logic for the WhatsApp dual-backend
//! bridge: health monitoring, routing/fallback, history reconciliation,
//! and the hybrid workflows that span both backends. Framework-agnostic
//! — no HTTP server concerns live here, only the domain model and rules.
//!
//! ## Modules
//!
//! - [`model`] - Backend descriptors, health snapshots, operation descriptors
//! - [`errors`] - Error taxonomy and retryability classification
//! - [`health`] - Health Monitor: cached, TTL-bounded backend probing
//! - [`routing`] - Routing Engine: backend selection and fallback
//! - [`sync`] - Database reconciliation pipeline
//! - [`workflow`] - Hybrid multi-backend workflows
//! - [`operations`] - Static operation-kind to descriptor table

pub mod errors;
pub mod health;
pub mod model;
pub mod operations;
pub mod routing;
pub mod sync;
pub mod workflow;

pub use errors::{CoreResult, OrchestratorError};
pub use health::Monitor;
pub use routing::{RoutingEngine, RoutingError, RoutingInfo, RoutingOutcome};
pub use sync::{CancelToken, SyncConfig, SyncEngine};
pub use workflow::{MarkCommunityReadResult, MarkCommunityReadWorkflow, WorkflowConfig};

/// Current version of the core crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
        assert!(VERSION.chars().next().unwrap().is_ascii_digit());
    }
}
