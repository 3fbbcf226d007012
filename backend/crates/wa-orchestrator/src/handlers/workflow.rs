use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::info;
use wa_core::{MarkCommunityReadWorkflow, WorkflowConfig};

use crate::middleware::error_handler::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MarkCommunityReadRequest {
    pub community_jid: String,
}

/// `POST /workflows/mark-community-read` — runs the hybrid
/// history-then-mark-read workflow for a community (§4.4.2).
pub async fn mark_community_read(
    data: web::Data<AppState>,
    body: web::Json<MarkCommunityReadRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = body.into_inner();
    info!(community_jid = %req.community_jid, "Mark-community-read workflow requested");

    let mut config = WorkflowConfig::default();
    config.sync_timeout = std::time::Duration::from_secs(data.config.retry.sync_timeout_secs);

    let workflow = MarkCommunityReadWorkflow {
        g: &data.g_client,
        b: &data.b_client,
        sync_engine: &data.sync_engine,
    };

    let result = workflow.run(&req.community_jid, config).await?;

    Ok(HttpResponse::Ok().json(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_community_read_request_requires_jid() {
        let result: Result<MarkCommunityReadRequest, _> = serde_json::from_str("{}");
        assert!(result.is_err());
    }
}
