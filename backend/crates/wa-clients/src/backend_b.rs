//! Typed façade over Backend-B's HTTP surface (§6).

use crate::error::{ClientError, ClientResult};
use crate::response::handle_response;
use crate::timeouts::{Timeout, TimeoutPolicy};
use crate::types::*;

#[derive(Debug, Clone)]
pub struct BackendBClient {
    base_url: String,
    http: reqwest::Client,
    timeouts: TimeoutPolicy,
}

impl BackendBClient {
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

    pub async fn pending_chats(&self) -> ClientResult<PendingChatsResponse> {
        let resp = self
            .http
            .get(self.url("/api/history/chats/pending"))
            .timeout(Timeout::Default.duration(&self.timeouts))
            .send()
            .await
            .map_err(ClientError::from_reqwest)?;
        handle_response(resp).await
    }

    pub async fn fetch_messages(
        &self,
        chat_jid: &str,
        after_timestamp: Option<i64>,
        limit: usize,
    ) -> ClientResult<FetchMessagesResponse> {
        let body = FetchMessagesRequest {
            chat_jid: chat_jid.to_string(),
            after_timestamp,
            limit,
        };
        let resp = self
            .http
            .post(self.url("/api/history/chats/messages"))
            .timeout(Timeout::Default.duration(&self.timeouts))
            .json(&body)
            .send()
            .await
            .map_err(ClientError::from_reqwest)?;
        handle_response(resp).await
    }

    pub async fn clear_temp(&self, chat_jids: Vec<String>) -> ClientResult<ClearTempResponse> {
        let body = ClearTempRequest { chat_jids };
        let resp = self
            .http
            .post(self.url("/api/history/chats/clear"))
            .timeout(Timeout::Default.duration(&self.timeouts))
            .json(&body)
            .send()
            .await
            .map_err(ClientError::from_reqwest)?;
        handle_response(resp).await
    }

    /// Fire-and-forget full-history sync trigger.
    pub async fn trigger_sync(&self, chat_jids: Option<Vec<String>>) -> ClientResult<()> {
        let body = HistorySyncRequest { chat_jids };
        let resp = self
            .http
            .post(self.url("/api/history/sync"))
            .timeout(Timeout::Short.duration(&self.timeouts))
            .json(&body)
            .send()
            .await
            .map_err(ClientError::from_reqwest)?;
        let _: serde_json::Value = handle_response(resp).await?;
        Ok(())
    }

    pub async fn sync_status(&self) -> ClientResult<HistorySyncStatus> {
        let resp = self
            .http
            .get(self.url("/api/history/status"))
            .timeout(Timeout::Short.duration(&self.timeouts))
            .send()
            .await
            .map_err(ClientError::from_reqwest)?;
        handle_response(resp).await
    }

    pub async fn fetch_older(&self, req: FetchOlderRequest) -> ClientResult<FetchOlderResponse> {
        let resp = self
            .http
            .post(self.url("/api/history/fetch-older"))
            .timeout(Timeout::Default.duration(&self.timeouts))
            .json(&req)
            .send()
            .await
            .map_err(ClientError::from_reqwest)?;
        handle_response(resp).await
    }

    pub async fn cancel_sync(&self) -> ClientResult<()> {
        let resp = self
            .http
            .post(self.url("/api/history/cancel"))
            .timeout(Timeout::Short.duration(&self.timeouts))
            .send()
            .await
            .map_err(ClientError::from_reqwest)?;
        let _: serde_json::Value = handle_response(resp).await?;
        Ok(())
    }

    pub async fn resume_sync(&self) -> ClientResult<()> {
        let resp = self
            .http
            .post(self.url("/api/history/resume"))
            .timeout(Timeout::Short.duration(&self.timeouts))
            .send()
            .await
            .map_err(ClientError::from_reqwest)?;
        let _: serde_json::Value = handle_response(resp).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_trailing_slash_correctly() {
        let client = BackendBClient::new("http://localhost:8081", TimeoutPolicy::default());
        assert_eq!(
            client.url("/api/history/status"),
            "http://localhost:8081/api/history/status"
        );
    }
}
