//! Wire DTOs for the Backend-G and Backend-B HTTP surfaces (§6).

use serde::{Deserialize, Serialize};

/// `GET /health` response shape common to both backends.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthProbeBody {
    pub status: String,
    #[serde(default, alias = "whatsapp_connected")]
    pub connected: bool,
}

/// A single message as stored in Backend-B's temporary history store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMessage {
    pub message_id: String,
    pub chat_jid: String,
    pub timestamp: i64,
    #[serde(default)]
    pub sender_jid: String,
    #[serde(default)]
    pub from_me: bool,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub media_url: Option<String>,
}

/// A message transformed into Backend-G's canonical schema, ready for
/// `POST /api/messages/batch`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalMessage {
    pub chat_jid: String,
    pub message_id: String,
    pub timestamp: i64,
    pub sender_jid: String,
    pub from_me: bool,
    pub text: String,
    pub media_type: Option<String>,
    pub media_url: Option<String>,
}

impl From<SourceMessage> for CanonicalMessage {
    fn from(src: SourceMessage) -> Self {
        CanonicalMessage {
            chat_jid: src.chat_jid,
            message_id: src.message_id,
            timestamp: src.timestamp,
            sender_jid: src.sender_jid,
            from_me: src.from_me,
            text: src.text,
            media_type: src.media_type,
            media_url: src.media_url,
        }
    }
}

/// Maximum messages accepted per batch-insert call (§8 boundary behaviour).
pub const MAX_BATCH_SIZE: usize = 1000;

#[derive(Debug, Clone, Serialize)]
pub struct BatchInsertRequest {
    pub chat_jid: String,
    pub messages: Vec<CanonicalMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchInsertResponse {
    pub success: bool,
    pub inserted_count: u32,
    pub duplicate_count: u32,
    pub failed_count: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkReadRequest {
    pub chat_jid: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub message_ids: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarkReadResponse {
    pub success: bool,
    pub count: u32,
    #[serde(default)]
    pub error_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommunityGroup {
    pub jid: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommunityGroupsResponse {
    pub groups: Vec<CommunityGroup>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityMarkReadGroupResult {
    pub jid: String,
    pub success: bool,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityMarkReadResponse {
    pub groups: Vec<CommunityMarkReadGroupResult>,
}

/// Backend-B's per-chat pending-messages listing, most-recently-active
/// chat first.
#[derive(Debug, Clone, Deserialize)]
pub struct PendingChat {
    pub chat_jid: String,
    pub last_active: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PendingChatsResponse {
    pub chats: Vec<PendingChat>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FetchMessagesRequest {
    pub chat_jid: String,
    /// Exclusive lower bound; `None` means "from the beginning".
    pub after_timestamp: Option<i64>,
    pub limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchMessagesResponse {
    pub messages: Vec<SourceMessage>,
    pub has_more: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClearTempRequest {
    pub chat_jids: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClearTempResponse {
    pub cleared: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistorySyncRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_jids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistorySyncStatus {
    pub connected: bool,
    pub is_syncing: bool,
    pub messages_synced: u64,
    pub chats_synced: u64,
    pub progress_percent: f32,
    pub is_latest: bool,
    pub last_sync_time: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FetchOlderRequest {
    pub chat_jid: String,
    pub oldest_message_id: String,
    pub oldest_timestamp_ms: i64,
    pub from_me: bool,
    pub count: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchOlderResponse {
    pub success: bool,
    pub request_id: String,
}
