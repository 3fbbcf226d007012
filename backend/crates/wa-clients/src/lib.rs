//! # wa-clients
//!
//! Typed HTTP client facades over the two WhatsApp bridge backends:
//! Backend-G (the canonical message store) and Backend-B (bulk historical
//! retrieval). Each client is stateless apart from its base URL and
//! connection pool, uses a named-timeout policy per call, and never
//! retries — retry and fallback decisions belong to the routing engine.

pub mod backend_b;
pub mod backend_g;
pub mod error;
mod response;
pub mod timeouts;
pub mod types;

pub use backend_b::BackendBClient;
pub use backend_g::BackendGClient;
pub use error::{ClientError, ClientResult};
pub use timeouts::{Timeout, TimeoutPolicy};
