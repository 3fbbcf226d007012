use actix_web::{web, HttpResponse};
use serde::Serialize;
use tracing::info;

use crate::middleware::error_handler::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RoutingInfoResponse {
    pub operation: String,
    pub selected: Option<wa_core::model::Backend>,
    pub strategy: wa_core::model::RoutingStrategy,
    pub primary_health: wa_core::model::HealthClassification,
    pub secondary_health: wa_core::model::HealthClassification,
}

/// `GET /routing/{operation}` — diagnostic view of the decision the
/// Routing Engine would make for `operation` right now, without
/// actually invoking either backend (§4.3).
pub async fn routing_info(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let operation = path.into_inner();
    info!(operation = %operation, "Routing info requested");

    let descriptor = wa_core::operations::lookup(&data.operations, &operation)?;
    let info = data.routing.routing_info(&descriptor).await;

    crate::logging::events::routing_decision(&operation, info.strategy, info.selected);

    let response = RoutingInfoResponse {
        operation,
        selected: info.selected,
        strategy: info.strategy,
        primary_health: info.primary_health,
        secondary_health: info.secondary_health,
    };

    Ok(HttpResponse::Ok().json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App};
    use crate::config::OrchestratorConfig;

    #[actix_web::test]
    async fn unknown_operation_returns_not_found() {
        let state = AppState::new(OrchestratorConfig::default());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .route("/routing/{operation}", web::get().to(routing_info)),
        )
        .await;

        let req = test::TestRequest::get().uri("/routing/nonexistent.kind").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
    }
}
