use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::info;
use wa_core::model::Backend;

use crate::middleware::error_handler::ApiError;
use crate::state::AppState;

/// Basic liveness response, no backend probes.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Detailed response carrying both backends' health snapshots (§4.1).
#[derive(Debug, Serialize, Deserialize)]
pub struct DetailedHealthResponse {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
    pub uptime: i64,
    pub backend_g: wa_core::model::HealthSnapshot,
    pub backend_b: wa_core::model::HealthSnapshot,
    pub aggregate: wa_core::model::AggregateHealth,
}

/// `GET /health` — returns immediately, suitable for load balancer
/// checks. Performs no backend probes.
pub async fn health_check() -> Result<HttpResponse, ApiError> {
    info!("Health check requested");

    let response = HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now(),
    };

    Ok(HttpResponse::Ok().json(response))
}

/// `GET /health/detailed` — probes (or reads cached snapshots for) both
/// backends and reports the aggregate view (§4.1, §4.5 overall status).
pub async fn detailed_health_check(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    info!("Detailed health check requested");

    let g = data.monitor.snapshot(Backend::G).await;
    let b = data.monitor.snapshot(Backend::B).await;
    let aggregate = data.monitor.aggregate().await;

    crate::logging::events::backend_probe(Backend::G, g.classification, g.response_time_ms);
    crate::logging::events::backend_probe(Backend::B, b.classification, b.response_time_ms);

    let status = match aggregate.overall {
        wa_core::model::OverallHealth::Ok => "healthy",
        wa_core::model::OverallHealth::Degraded => "degraded",
        wa_core::model::OverallHealth::Error => "unhealthy",
    };

    let response = DetailedHealthResponse {
        status: status.to_string(),
        timestamp: chrono::Utc::now(),
        version: data.version().to_string(),
        uptime: data.uptime_seconds(),
        backend_g: g,
        backend_b: b,
        aggregate,
    };

    let status_code = if matches!(response.aggregate.overall, wa_core::model::OverallHealth::Error) {
        actix_web::http::StatusCode::SERVICE_UNAVAILABLE
    } else {
        actix_web::http::StatusCode::OK
    };

    Ok(HttpResponse::build(status_code).json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App};

    #[actix_web::test]
    async fn health_check_reports_healthy_without_probing() {
        let app = test::init_service(App::new().route("/health", web::get().to(health_check))).await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        let body: HealthResponse = test::read_body_json(resp).await;
        assert_eq!(body.status, "healthy");
    }
}
