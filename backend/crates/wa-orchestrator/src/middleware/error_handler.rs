use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpResponse, ResponseError,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
};
use tracing::error;
use wa_core::OrchestratorError;

/// Custom error response structure.
#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub code: String,
    pub request_id: Option<String>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ErrorResponse {
    pub fn new(error: String, message: String, code: String, request_id: Option<String>) -> Self {
        Self {
            error,
            message,
            code,
            request_id,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn bad_request(message: String, request_id: Option<String>) -> Self {
        Self::new("Bad Request".to_string(), message, "BAD_REQUEST".to_string(), request_id)
    }

    pub fn not_found(message: String, request_id: Option<String>) -> Self {
        Self::new("Not Found".to_string(), message, "NOT_FOUND".to_string(), request_id)
    }

    pub fn service_unavailable(message: String, request_id: Option<String>) -> Self {
        Self::new(
            "Service Unavailable".to_string(),
            message,
            "SERVICE_UNAVAILABLE".to_string(),
            request_id,
        )
    }
}

/// Global error-logging middleware. Converting errors to HTTP responses
/// is `ApiError`'s job; this middleware only attaches the request ID to
/// the log line for correlation.
pub struct ErrorHandler;

impl<S, B> Transform<S, ServiceRequest> for ErrorHandler
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = ErrorHandlerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ErrorHandlerMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct ErrorHandlerMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for ErrorHandlerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            let request_id = crate::middleware::request_id::get_request_id(&req);

            match service.call(req).await {
                Ok(res) => Ok(res),
                Err(err) => {
                    error!(
                        request_id = ?request_id,
                        error = %err,
                        "Request failed with error"
                    );
                    Err(err)
                }
            }
        })
    }
}

/// Application-specific errors that convert to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("orchestration error: {0}")]
    Orchestration(#[from] OrchestratorError),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal server error: {0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;

        match self {
            ApiError::Orchestration(err) => match err {
                OrchestratorError::InvalidOperation(_) => StatusCode::NOT_FOUND,
                OrchestratorError::NoBackendAvailable
                | OrchestratorError::SyncTimeout
                | OrchestratorError::Transport(_) => StatusCode::SERVICE_UNAVAILABLE,
                OrchestratorError::SyncAlreadyRunning => StatusCode::CONFLICT,
                OrchestratorError::Protocol(_) | OrchestratorError::BackendReported { .. } => {
                    StatusCode::BAD_GATEWAY
                }
                OrchestratorError::SyncCancelled => StatusCode::OK,
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let request_id = None;

        let error_response = match self {
            ApiError::Orchestration(err) => ErrorResponse::new(
                "Orchestration Error".to_string(),
                err.to_string(),
                err.category().to_uppercase(),
                request_id,
            ),
            ApiError::BadRequest(msg) => ErrorResponse::bad_request(msg.clone(), request_id),
            ApiError::NotFound(msg) => ErrorResponse::not_found(msg.clone(), request_id),
            ApiError::Internal(msg) => ErrorResponse::new(
                "Internal Server Error".to_string(),
                msg.clone(),
                "INTERNAL_ERROR".to_string(),
                request_id,
            ),
        };

        HttpResponse::build(self.status_code()).json(error_response)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn error_response_creation() {
        let error = ErrorResponse::not_found("missing".to_string(), Some("req-123".to_string()));
        assert_eq!(error.code, "NOT_FOUND");
        assert_eq!(error.request_id, Some("req-123".to_string()));
    }

    #[test]
    fn invalid_operation_maps_to_not_found() {
        let err = ApiError::Orchestration(OrchestratorError::InvalidOperation("x".into()));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn no_backend_available_maps_to_service_unavailable() {
        let err = ApiError::Orchestration(OrchestratorError::NoBackendAvailable);
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn sync_already_running_maps_to_conflict() {
        let err = ApiError::Orchestration(OrchestratorError::SyncAlreadyRunning);
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }
}
