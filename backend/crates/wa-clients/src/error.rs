//! Result taxonomy shared by both backend clients.
//!
//! Mirrors the four-kind error taxonomy the clients are required to surface:
//! a 2xx body that declares `success=false`, a non-2xx response, a transport
//! failure (connection refused, DNS, timeout), or a body that failed to
//! parse. Clients never retry internally — retry/fallback decisions belong
//! to the routing engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error surfaced by a Backend-G or Backend-B client call.
#[derive(Debug, Error, Clone, Serialize, Deserialize)]
pub enum ClientError {
    /// 2xx response whose body declares `success: false`.
    #[error("backend reported error {code}: {message}")]
    BackendError { code: String, message: String },

    /// Non-2xx HTTP response.
    #[error("http error {status}: {body}")]
    HttpError { status: u16, body: String },

    /// Connection refused, DNS failure, TCP reset, or timeout.
    #[error("transport error: {0}")]
    Transport(String),

    /// 2xx response whose body could not be parsed into the expected shape.
    #[error("decode error: {0}")]
    Decode(String),
}

impl ClientError {
    /// Backend-reported codes the routing engine may retry on the alternate
    /// backend. `DATABASE_ERROR` is deliberately excluded — a real
    /// persistence problem should surface, not be masked by a retry.
    const RETRYABLE_BACKEND_CODES: [&'static str; 3] =
        ["BRIDGE_UNREACHABLE", "TIMEOUT", "CONNECTION_ERROR"];

    /// Whether this error, in isolation, belongs to the retryable set the
    /// routing engine's fallback logic consults (§7 propagation policy).
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Transport(_) => true,
            ClientError::HttpError { status, .. } => (500..600).contains(status),
            ClientError::BackendError { code, .. } => {
                Self::RETRYABLE_BACKEND_CODES.contains(&code.as_str())
            }
            ClientError::Decode(_) => false,
        }
    }

    pub fn from_reqwest(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_is_retryable() {
        assert!(ClientError::Transport("connection refused".into()).is_retryable());
    }

    #[test]
    fn http_5xx_is_retryable_4xx_is_not() {
        assert!(ClientError::HttpError {
            status: 503,
            body: String::new()
        }
        .is_retryable());
        assert!(!ClientError::HttpError {
            status: 404,
            body: String::new()
        }
        .is_retryable());
    }

    #[test]
    fn database_error_is_not_retryable() {
        let err = ClientError::BackendError {
            code: "DATABASE_ERROR".into(),
            message: "constraint violation".into(),
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn bridge_unreachable_code_is_retryable() {
        let err = ClientError::BackendError {
            code: "BRIDGE_UNREACHABLE".into(),
            message: "bridge down".into(),
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn decode_is_not_retryable() {
        assert!(!ClientError::Decode("unexpected field".into()).is_retryable());
    }
}
