use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

use crate::config::{LogFormat, OrchestratorConfig};

/// Initialize the logging system based on configuration.
pub fn init_logging(config: &OrchestratorConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = Registry::default().with(env_filter);

    match config.logging.format {
        LogFormat::Json => {
            let json_layer = fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_target(true)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_file(true)
                .with_line_number(true)
                .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE);

            subscriber.with(json_layer).init();
        }
        LogFormat::Pretty => {
            let pretty_layer = fmt::layer()
                .pretty()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE);

            subscriber.with(pretty_layer).init();
        }
        LogFormat::Compact => {
            let compact_layer = fmt::layer()
                .compact()
                .with_target(false)
                .with_thread_ids(false)
                .with_span_events(FmtSpan::CLOSE);

            subscriber.with(compact_layer).init();
        }
    }

    tracing::info!(
        log_level = %config.logging.level,
        log_format = ?config.logging.format,
        "Logging initialized"
    );

    Ok(())
}

/// Span for a diagnostic HTTP request, carrying the orchestration fields
/// a reader needs to correlate a request with the routing decision it
/// triggered.
#[macro_export]
macro_rules! http_span {
    ($method:expr, $path:expr, $request_id:expr) => {
        tracing::info_span!(
            "http_request",
            method = %$method,
            path = %$path,
            request_id = %$request_id,
            operation = tracing::field::Empty,
            backend = tracing::field::Empty,
            strategy = tracing::field::Empty,
            status = tracing::field::Empty,
            duration_ms = tracing::field::Empty,
            error = tracing::field::Empty,
        )
    };
}

/// Log request details.
pub fn log_request(method: &str, path: &str, request_id: &str, remote_addr: Option<&str>) {
    tracing::info!(
        method = %method,
        path = %path,
        request_id = %request_id,
        remote_addr = remote_addr.unwrap_or("unknown"),
        "Incoming request"
    );
}

/// Log response details.
pub fn log_response(method: &str, path: &str, request_id: &str, status_code: u16, duration_ms: u128) {
    match status_code {
        200..=299 => {
            tracing::info!(
                method = %method,
                path = %path,
                request_id = %request_id,
                status_code = status_code,
                duration_ms = duration_ms,
                "Request completed successfully"
            );
        }
        400..=499 => {
            tracing::warn!(
                method = %method,
                path = %path,
                request_id = %request_id,
                status_code = status_code,
                duration_ms = duration_ms,
                "Client error"
            );
        }
        500..=599 => {
            tracing::error!(
                method = %method,
                path = %path,
                request_id = %request_id,
                status_code = status_code,
                duration_ms = duration_ms,
                "Server error"
            );
        }
        _ => {
            tracing::info!(
                method = %method,
                path = %path,
                request_id = %request_id,
                status_code = status_code,
                duration_ms = duration_ms,
                "Request completed"
            );
        }
    }
}

/// Log error with context.
pub fn log_error<E: std::fmt::Display>(error: &E, context: &str, request_id: Option<&str>) {
    if let Some(id) = request_id {
        tracing::error!(
            error = %error,
            context = %context,
            request_id = %id,
            "Error occurred"
        );
    } else {
        tracing::error!(
            error = %error,
            context = %context,
            "Error occurred"
        );
    }
}

/// Structured logging for orchestration-domain events observable at the
/// HTTP boundary. Events scoped to a single wa-core operation (a sync
/// batch commit, a workflow phase) are emitted directly from wa-core
/// instead, since only it sees each one as it happens.
pub mod events {
    use wa_core::model::{Backend, HealthClassification, RoutingStrategy};

    pub fn app_starting(name: &str, version: &str) {
        tracing::info!(
            app_name = %name,
            version = %version,
            event = "app_starting",
            "Application starting"
        );
    }

    pub fn app_ready(bind_address: &str) {
        tracing::info!(
            bind_address = %bind_address,
            event = "app_ready",
            "Application ready to accept requests"
        );
    }

    pub fn app_stopping(reason: Option<&str>) {
        tracing::info!(
            reason = reason.unwrap_or("normal"),
            event = "app_stopping",
            "Application shutting down"
        );
    }

    /// A routing decision was made for an operation (§4.3).
    pub fn routing_decision(operation: &str, strategy: RoutingStrategy, selected: Option<Backend>) {
        tracing::info!(
            operation = %operation,
            strategy = ?strategy,
            selected = ?selected,
            event = "routing_decision",
            "Routing decision made"
        );
    }

    /// A backend health probe completed (§4.1).
    pub fn backend_probe(backend: Backend, classification: HealthClassification, response_time_ms: u64) {
        tracing::info!(
            backend = %backend.as_str(),
            classification = ?classification,
            response_time_ms = response_time_ms,
            event = "backend_probe",
            "Backend health probe completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_info_level() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.logging.level, "info");
    }
}
