use actix_web::{web, HttpResponse, Scope};
use tracing::info;

use crate::handlers::{
    health::{detailed_health_check, health_check},
    routing::routing_info,
    sync::trigger_sync,
    workflow::mark_community_read,
};

/// Configure all application routes (§E diagnostic HTTP surface).
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health_routes())
        .service(routing_routes())
        .service(sync_routes())
        .service(workflow_routes())
        .route("/", web::get().to(root_handler));
}

fn health_routes() -> Scope {
    web::scope("/health")
        .route("", web::get().to(health_check))
        .route("/", web::get().to(health_check))
        .route("/detailed", web::get().to(detailed_health_check))
}

fn routing_routes() -> Scope {
    web::scope("/routing").route("/{operation}", web::get().to(routing_info))
}

fn sync_routes() -> Scope {
    web::scope("/sync").route("", web::post().to(trigger_sync))
}

fn workflow_routes() -> Scope {
    web::scope("/workflows").route("/mark-community-read", web::post().to(mark_community_read))
}

async fn root_handler() -> HttpResponse {
    info!("Root endpoint accessed");

    let response = serde_json::json!({
        "service": "wa-orchestrator",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Dual-backend WhatsApp bridge orchestrator",
        "endpoints": {
            "health": "/health",
            "detailed_health": "/health/detailed",
            "routing": "/routing/{operation}",
            "sync": "/sync",
            "mark_community_read": "/workflows/mark-community-read"
        },
        "timestamp": chrono::Utc::now()
    });

    HttpResponse::Ok().json(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn root_handler_reports_service_name() {
        let app = test::init_service(App::new().route("/", web::get().to(root_handler))).await;
        let req = test::TestRequest::get().uri("/").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["service"], "wa-orchestrator");
    }
}
