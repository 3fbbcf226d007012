//! Error taxonomy for the orchestration core (§7).
//!
//! Composite error codes are modeled as a tagged variant over the four
//! kinds the design calls for (Transport, Protocol, Backend-reported,
//! Orchestrator), matching the routing layer's need to match on the tag
//! to decide retryability rather than string-sniff a message.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use wa_clients::ClientError;

pub type CoreResult<T> = Result<T, OrchestratorError>;

#[derive(Debug, Error, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "details", rename_all = "snake_case")]
pub enum OrchestratorError {
    /// Backend unreachable, timeout, or connection refused.
    #[error("transport error: {0}")]
    Transport(String),

    /// Backend returned non-2xx or a malformed body.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Backend returned 200 with `success=false` and an error code.
    #[error("backend reported {code}: {message}")]
    BackendReported { code: String, message: String },

    /// No backend capable of the operation is currently available.
    #[error("no backend available")]
    NoBackendAvailable,

    /// `op.kind` did not match any entry in the operation table.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// The hybrid workflow's `sync_timeout` elapsed before Backend-B
    /// reached `is_latest`.
    #[error("sync timed out waiting for backend-b")]
    SyncTimeout,

    /// A reconciliation run was requested for a `chat_jid` that already
    /// has one in progress.
    #[error("reconciliation already running for this chat")]
    SyncAlreadyRunning,

    /// A cancellation signal stopped an in-flight sync before completion.
    #[error("sync was cancelled")]
    SyncCancelled,
}

impl OrchestratorError {
    const RETRYABLE_BACKEND_CODES: [&'static str; 3] =
        ["BRIDGE_UNREACHABLE", "TIMEOUT", "CONNECTION_ERROR"];

    /// Error category for logging/metrics grouping.
    pub fn category(&self) -> &'static str {
        match self {
            OrchestratorError::Transport(_) => "transport",
            OrchestratorError::Protocol(_) => "protocol",
            OrchestratorError::BackendReported { .. } => "backend_reported",
            OrchestratorError::NoBackendAvailable => "no_backend_available",
            OrchestratorError::InvalidOperation(_) => "invalid_operation",
            OrchestratorError::SyncTimeout => "sync_timeout",
            OrchestratorError::SyncAlreadyRunning => "sync_already_running",
            OrchestratorError::SyncCancelled => "sync_cancelled",
        }
    }

    /// Whether the routing engine's fallback logic may retry this error
    /// on the alternate backend. `DATABASE_ERROR` is pinned non-retryable
    /// (§9 open questions) — a real persistence problem should surface.
    pub fn is_retryable(&self) -> bool {
        match self {
            OrchestratorError::Transport(_) => true,
            OrchestratorError::BackendReported { code, .. } => {
                Self::RETRYABLE_BACKEND_CODES.contains(&code.as_str())
            }
            _ => false,
        }
    }
}

impl From<ClientError> for OrchestratorError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Transport(msg) => OrchestratorError::Transport(msg),
            ClientError::Decode(msg) => OrchestratorError::Protocol(msg),
            ClientError::HttpError { status, body } => {
                OrchestratorError::Protocol(format!("http {status}: {body}"))
            }
            ClientError::BackendError { code, message } => {
                OrchestratorError::BackendReported { code, message }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_is_retryable() {
        assert!(OrchestratorError::Transport("refused".into()).is_retryable());
    }

    #[test]
    fn database_error_is_not_retryable() {
        let err = OrchestratorError::BackendReported {
            code: "DATABASE_ERROR".into(),
            message: "constraint".into(),
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn bridge_unreachable_backend_code_is_retryable() {
        let err = OrchestratorError::BackendReported {
            code: "BRIDGE_UNREACHABLE".into(),
            message: "down".into(),
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn orchestrator_errors_are_not_retryable() {
        assert!(!OrchestratorError::NoBackendAvailable.is_retryable());
        assert!(!OrchestratorError::InvalidOperation("x".into()).is_retryable());
        assert!(!OrchestratorError::SyncTimeout.is_retryable());
    }

    #[test]
    fn client_http_5xx_converts_to_protocol_not_retryable_here() {
        let client_err = ClientError::HttpError {
            status: 503,
            body: "oops".into(),
        };
        let core_err: OrchestratorError = client_err.into();
        assert_eq!(core_err.category(), "protocol");
    }
}
