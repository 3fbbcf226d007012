//! Typed façade over Backend-G's HTTP surface (§6). Stateless apart from
//! the base URL and the shared `reqwest::Client` connection pool.

use crate::error::{ClientError, ClientResult};
use crate::response::handle_response;
use crate::timeouts::{Timeout, TimeoutPolicy};
use crate::types::*;

#[derive(Debug, Clone)]
pub struct BackendGClient {
    base_url: String,
    http: reqwest::Client,
    timeouts: TimeoutPolicy,
}

impl BackendGClient {
    pub fn new(base_url: impl Into<String>, timeouts: TimeoutPolicy) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
            timeouts,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    pub async fn health(&self) -> ClientResult<HealthProbeBody> {
        let resp = self
            .http
            .get(self.url("/health"))
            .timeout(Timeout::Health.duration(&self.timeouts))
            .send()
            .await
            .map_err(ClientError::from_reqwest)?;
        handle_response(resp).await
    }

    /// `POST /api/messages/batch`. Rejects batches over 1000 messages
    /// client-side, before making the HTTP call (§8 boundary behaviour).
    pub async fn insert_messages_batch(
        &self,
        chat_jid: &str,
        messages: Vec<CanonicalMessage>,
    ) -> ClientResult<BatchInsertResponse> {
        if messages.len() > MAX_BATCH_SIZE {
            return Err(ClientError::Decode(format!(
                "batch of {} messages exceeds the {} message limit",
                messages.len(),
                MAX_BATCH_SIZE
            )));
        }
        let body = BatchInsertRequest {
            chat_jid: chat_jid.to_string(),
            messages,
        };
        let resp = self
            .http
            .post(self.url("/api/messages/batch"))
            .timeout(Timeout::Default.duration(&self.timeouts))
            .json(&body)
            .send()
            .await
            .map_err(ClientError::from_reqwest)?;
        handle_response(resp).await
    }

    /// `POST /api/mark_read`. An empty `message_ids` list means "all in
    /// chat". Backend-G returns `EMPTY_CHAT` with `count=0, success=true`
    /// for an empty chat (§8) — that is not an error from this client's
    /// point of view, so it decodes into `MarkReadResponse` rather than
    /// `BackendError`.
    pub async fn mark_read(
        &self,
        chat_jid: &str,
        message_ids: Vec<String>,
    ) -> ClientResult<MarkReadResponse> {
        let body = MarkReadRequest {
            chat_jid: chat_jid.to_string(),
            message_ids,
        };
        let resp = self
            .http
            .post(self.url("/api/mark_read"))
            .timeout(Timeout::Short.duration(&self.timeouts))
            .json(&body)
            .send()
            .await
            .map_err(ClientError::from_reqwest)?;
        handle_response(resp).await
    }

    pub async fn community_groups(&self, community_jid: &str) -> ClientResult<CommunityGroupsResponse> {
        let resp = self
            .http
            .get(self.url(&format!("/api/communities/{}/groups", community_jid)))
            .timeout(Timeout::Default.duration(&self.timeouts))
            .send()
            .await
            .map_err(ClientError::from_reqwest)?;
        handle_response(resp).await
    }

    pub async fn mark_community_read(
        &self,
        community_jid: &str,
    ) -> ClientResult<CommunityMarkReadResponse> {
        let resp = self
            .http
            .post(self.url(&format!("/api/communities/{}/mark-read", community_jid)))
            .timeout(Timeout::Default.duration(&self.timeouts))
            .send()
            .await
            .map_err(ClientError::from_reqwest)?;
        handle_response(resp).await
    }

    /// Reads the chat's sync checkpoint. `None` means a fresh start — no
    /// checkpoint exists yet for this chat.
    pub async fn sync_checkpoint(
        &self,
        chat_jid: &str,
    ) -> ClientResult<Option<SyncCheckpointBody>> {
        let resp = self
            .http
            .get(self.url(&format!("/api/sync/checkpoint/{}", chat_jid)))
            .timeout(Timeout::Short.duration(&self.timeouts))
            .send()
            .await
            .map_err(ClientError::from_reqwest)?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        handle_response(resp).await.map(Some)
    }

    /// `PUT /api/sync/checkpoint/{chat}`. Persists the advanced checkpoint
    /// after a successful batch insert (§4.4.1 step 2e); Backend-G echoes
    /// back the stored row, which the caller adopts as the new in-memory
    /// checkpoint so the next page reads from what was actually durable.
    pub async fn update_sync_checkpoint(
        &self,
        checkpoint: &SyncCheckpointBody,
    ) -> ClientResult<SyncCheckpointBody> {
        let resp = self
            .http
            .put(self.url(&format!("/api/sync/checkpoint/{}", checkpoint.chat_jid)))
            .timeout(Timeout::Short.duration(&self.timeouts))
            .json(checkpoint)
            .send()
            .await
            .map_err(ClientError::from_reqwest)?;
        handle_response(resp).await
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SyncCheckpointBody {
    pub chat_jid: String,
    pub last_synced_timestamp: i64,
    pub messages_synced: u64,
    pub last_message_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_trailing_slash_correctly() {
        let client = BackendGClient::new("http://localhost:8080/", TimeoutPolicy::default());
        assert_eq!(client.url("/health"), "http://localhost:8080/health");
    }

    #[test]
    fn sync_checkpoint_body_round_trips_through_json() {
        let checkpoint = SyncCheckpointBody {
            chat_jid: "chat-1".into(),
            last_synced_timestamp: 1_700_000_000,
            messages_synced: 42,
            last_message_id: "msg-42".into(),
        };
        let json = serde_json::to_string(&checkpoint).unwrap();
        let decoded: SyncCheckpointBody = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.chat_jid, "chat-1");
        assert_eq!(decoded.messages_synced, 42);
    }

    #[tokio::test]
    async fn batch_over_limit_is_rejected_client_side() {
        let client = BackendGClient::new("http://localhost:8080", TimeoutPolicy::default());
        let messages: Vec<CanonicalMessage> = (0..(MAX_BATCH_SIZE + 1))
            .map(|i| CanonicalMessage {
                chat_jid: "c".into(),
                message_id: i.to_string(),
                timestamp: i as i64,
                sender_jid: "s".into(),
                from_me: false,
                text: String::new(),
                media_type: None,
                media_url: None,
            })
            .collect();
        let result = client.insert_messages_batch("c", messages).await;
        assert!(matches!(result, Err(ClientError::Decode(_))));
    }
}
