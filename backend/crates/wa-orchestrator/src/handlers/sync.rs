use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::info;
use wa_core::{CancelToken, SyncConfig};

use crate::middleware::error_handler::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SyncRequest {
    pub chat_jid: Option<String>,
    pub batch_size: Option<usize>,
}

/// `POST /sync` — triggers a reconciliation run over Backend-B's pending
/// history into Backend-G, scoped to a single chat if `chat_jid` is
/// given, otherwise every chat Backend-B reports pending (§4.4.1).
pub async fn trigger_sync(
    data: web::Data<AppState>,
    body: web::Json<SyncRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = body.into_inner();
    info!(chat_jid = ?req.chat_jid, "Sync requested");

    let mut config = SyncConfig::default();
    if let Some(batch_size) = req.batch_size {
        config.batch_size = batch_size.min(data.config.routing.batch_size);
    } else {
        config.batch_size = data.config.routing.batch_size;
    }
    config.max_retries = data.config.retry.max_retries;
    config.retry_delay = std::time::Duration::from_secs(data.config.retry.retry_delay_secs);

    let cancel = CancelToken::new();
    let result = data
        .sync_engine
        .reconcile(&data.g_client, &data.b_client, req.chat_jid.as_deref(), config, &cancel)
        .await?;

    Ok(HttpResponse::Ok().json(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_request_deserializes_with_no_fields() {
        let req: SyncRequest = serde_json::from_str("{}").unwrap();
        assert!(req.chat_jid.is_none());
        assert!(req.batch_size.is_none());
    }
}
