//! # wa-orchestrator
//!
//! REST orchestration server for the WhatsApp dual-backend bridge. It
//! exposes a small diagnostic HTTP surface over the routing, health, and
//! sync engines implemented in `wa-core`, and fans operation calls out to
//! the Backend-G and Backend-B HTTP clients in `wa-clients`.
//!
//! ## Features
//!
//! - Diagnostic health endpoints backed by the dual-backend health monitor
//! - A routing-decision introspection endpoint
//! - History reconciliation and hybrid-workflow trigger endpoints
//! - Structured logging via `tracing`
//! - CORS support for frontend integration
//! - Request ID tracking for debugging
//! - Production-ready security headers
//!
//! ## Configuration
//!
//! The orchestrator is configured through environment variables. See the
//! [`config`] module for available configuration options.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use wa_orchestrator::config::OrchestratorConfig;
//! use wa_orchestrator::state::AppState;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = OrchestratorConfig::from_env()?;
//!     let _app_state = AppState::new(config);
//!
//!     // Server setup would go here
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod routes;
pub mod state;

// Re-export commonly used types for convenience
pub use config::{ConfigError, OrchestratorConfig};
pub use middleware::error_handler::{ApiError, ApiResult, ErrorResponse};
pub use state::{AppState, AppStateError};

/// Version information for the orchestrator
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SERVICE_NAME: &str = "wa-orchestrator";

/// Build information (available at compile time)
pub mod build_info {
    /// The version of this crate
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    /// Git commit hash if available
    pub const GIT_COMMIT: Option<&str> = option_env!("GIT_COMMIT");

    /// Build date if available
    pub const BUILD_DATE: Option<&str> = option_env!("BUILD_DATE");
}

/// Prelude module for common imports
pub mod prelude {
    pub use crate::{
        config::{ConfigError, OrchestratorConfig},
        handlers::*,
        middleware::error_handler::{ApiError, ApiResult},
        state::{AppState, AppStateError},
        SERVICE_NAME, VERSION,
    };

    // Re-export common Actix-web types
    pub use actix_web::{
        middleware::DefaultHeaders, web, App, HttpRequest, HttpResponse, HttpServer,
        Result as ActixResult,
    };

    // Re-export common async/serialization types
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use serde_json;
    pub use tokio;
    pub use uuid::Uuid;
}
