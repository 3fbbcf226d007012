//! Database reconciliation pipeline (§4.4.1): drains Backend-B's pending
//! messages into Backend-G's canonical store, per chat, most-recently-
//! active first, with checkpointing, batching, and retry.
//!
//! Retry/backoff idiom grounded on the message-queue worker's
//! retry-with-delay loop (`pytake-core`'s Redis queue), adapted here to
//! Backend-G batch-insert retries instead of job redelivery.

use crate::errors::OrchestratorError;
use crate::model::SyncResult;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use wa_clients::types::{CanonicalMessage, MAX_BATCH_SIZE};
use wa_clients::{BackendBClient, BackendGClient, ClientError};

#[derive(Debug, Clone, Copy)]
pub struct SyncConfig {
    pub batch_size: usize,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            batch_size: MAX_BATCH_SIZE,
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
        }
    }
}

/// Cooperative cancellation handle: set `cancelled` to stop reconciliation
/// after the in-flight batch completes (§5 cancellation policy).
#[derive(Clone, Default)]
pub struct CancelToken(Arc<std::sync::atomic::AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, std::sync::atomic::Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(std::sync::atomic::Ordering::Relaxed)
    }
}

/// Tracks chats currently reconciling, so a second concurrent run for the
/// same `chat_jid` fails fast with `SYNC_ALREADY_RUNNING` (§5).
#[derive(Default)]
pub struct SyncEngine {
    in_progress: Mutex<HashSet<String>>,
}

struct ChatGuard<'a> {
    engine: &'a SyncEngine,
    chat_jid: String,
}

impl<'a> Drop for ChatGuard<'a> {
    fn drop(&mut self) {
        let engine = self.engine;
        let chat_jid = std::mem::take(&mut self.chat_jid);
        // Best-effort synchronous cleanup: the guard's lifetime always
        // ends inside an async context, but Drop can't await, so we spawn
        // the removal rather than block the caller's drop.
        if let Ok(mut guard) = engine.in_progress.try_lock() {
            guard.remove(&chat_jid);
        } else {
            let in_progress = engine.in_progress_handle();
            tokio::spawn(async move {
                in_progress.lock().await.remove(&chat_jid);
            });
        }
    }
}

impl SyncEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn in_progress_handle(&self) -> &Mutex<HashSet<String>> {
        &self.in_progress
    }

    async fn acquire_chat<'a>(&'a self, chat_jid: &str) -> Result<ChatGuard<'a>, OrchestratorError> {
        let mut guard = self.in_progress.lock().await;
        if !guard.insert(chat_jid.to_string()) {
            return Err(OrchestratorError::SyncAlreadyRunning);
        }
        Ok(ChatGuard {
            engine: self,
            chat_jid: chat_jid.to_string(),
        })
    }

    /// Reconciles a single chat, or all chats Backend-B reports pending
    /// if `chat_jid` is `None`. Returns a `SyncResult`; `partial` is set
    /// if any chat failed or cancellation stopped the run early.
    pub async fn reconcile(
        &self,
        g: &BackendGClient,
        b: &BackendBClient,
        chat_jid: Option<&str>,
        config: SyncConfig,
        cancel: &CancelToken,
    ) -> Result<SyncResult, OrchestratorError> {
        let started = Instant::now();
        let mut result = SyncResult::default();

        let chats: Vec<String> = match chat_jid {
            Some(jid) => vec![jid.to_string()],
            None => {
                let pending = b
                    .pending_chats()
                    .await
                    .map_err(OrchestratorError::from)?;
                pending.chats.into_iter().map(|c| c.chat_jid).collect()
            }
        };

        let mut drained_chats = Vec::new();

        for chat in chats {
            if cancel.is_cancelled() {
                result.partial = true;
                break;
            }

            let guard = match self.acquire_chat(&chat).await {
                Ok(g) => g,
                Err(_) => {
                    result.chats_failed += 1;
                    result.partial = true;
                    continue;
                }
            };

            match self.reconcile_chat(g, b, &chat, config, cancel).await {
                Ok(chat_result) => {
                    result.messages_fetched += chat_result.messages_fetched;
                    result.messages_inserted += chat_result.messages_inserted;
                    result.messages_deduplicated += chat_result.messages_deduplicated;
                    result.messages_failed += chat_result.messages_failed;
                    result.chats_processed += 1;
                    if chat_result.fully_drained {
                        drained_chats.push(chat.clone());
                    }
                    if !chat_result.fully_drained {
                        result.partial = true;
                    }
                }
                Err(ChatReconcileError::Aborted) => {
                    result.chats_failed += 1;
                    result.partial = true;
                }
                Err(ChatReconcileError::GExhausted) => {
                    drop(guard);
                    result.elapsed_ms = started.elapsed().as_millis() as u64;
                    return Err(OrchestratorError::Transport(
                        "backend-g unavailable after exhausting retries".to_string(),
                    ));
                }
            }
            drop(guard);

            if cancel.is_cancelled() {
                result.partial = true;
                break;
            }
        }

        if !drained_chats.is_empty() {
            // Clear only the chats actually drained this run (§9 open
            // question, pinned: never "clear everything").
            let _ = b.clear_temp(drained_chats).await;
        }

        result.elapsed_ms = started.elapsed().as_millis() as u64;
        Ok(result)
    }

    async fn reconcile_chat(
        &self,
        g: &BackendGClient,
        b: &BackendBClient,
        chat_jid: &str,
        config: SyncConfig,
        cancel: &CancelToken,
    ) -> Result<ChatReconcileOutcome, ChatReconcileError> {
        let mut outcome = ChatReconcileOutcome::default();

        let mut checkpoint = g
            .sync_checkpoint(chat_jid)
            .await
            .map_err(|_| ChatReconcileError::Aborted)?;

        loop {
            let after = checkpoint.as_ref().map(|c| c.last_synced_timestamp);
            let page = match b.fetch_messages(chat_jid, after, config.batch_size).await {
                Ok(page) => page,
                Err(ClientError::Transport(_)) => return Err(ChatReconcileError::Aborted),
                Err(_) => {
                    outcome.fully_drained = false;
                    return Ok(outcome);
                }
            };

            if page.messages.is_empty() {
                outcome.fully_drained = true;
                return Ok(outcome);
            }

            outcome.messages_fetched += page.messages.len() as u64;

            let newest_timestamp = page.messages.iter().map(|m| m.timestamp).max().unwrap_or(0);
            let newest_id = page
                .messages
                .iter()
                .max_by_key(|m| m.timestamp)
                .map(|m| m.message_id.clone())
                .unwrap_or_default();

            let canonical: Vec<CanonicalMessage> =
                page.messages.into_iter().map(CanonicalMessage::from).collect();

            let insert_result = self
                .insert_with_retry(g, chat_jid, canonical, config)
                .await;

            let (batch_inserted, batch_deduplicated, batch_failed) = match insert_result {
                Ok(batch) => {
                    outcome.messages_inserted += batch.inserted_count as u64;
                    outcome.messages_deduplicated += batch.duplicate_count as u64;
                    outcome.messages_failed += batch.failed_count as u64;
                    (
                        batch.inserted_count as u64,
                        batch.duplicate_count as u64,
                        batch.failed_count as u64,
                    )
                }
                Err(ChatReconcileError::GExhausted) => {
                    return Err(ChatReconcileError::GExhausted);
                }
                Err(_) => {
                    outcome.fully_drained = false;
                    return Ok(outcome);
                }
            };

            let advanced = wa_clients::backend_g::SyncCheckpointBody {
                chat_jid: chat_jid.to_string(),
                last_synced_timestamp: newest_timestamp,
                messages_synced: checkpoint.as_ref().map(|c| c.messages_synced).unwrap_or(0)
                    + batch_inserted,
                last_message_id: newest_id,
            };

            match g.update_sync_checkpoint(&advanced).await {
                Ok(persisted) => {
                    tracing::info!(
                        chat_jid = %chat_jid,
                        inserted = batch_inserted,
                        deduplicated = batch_deduplicated,
                        failed = batch_failed,
                        event = "sync_batch_committed",
                        "Sync batch committed"
                    );
                    checkpoint = Some(persisted);
                }
                Err(_) => {
                    // The batch is already inserted; only the checkpoint
                    // write failed. A re-run reads the previous (stale)
                    // checkpoint and re-fetches this one batch, which the
                    // dedup pass absorbs (§5 crash-safety invariant) —
                    // better than looping here against a store that just
                    // rejected a write.
                    outcome.fully_drained = false;
                    return Ok(outcome);
                }
            }

            if !page.has_more || cancel.is_cancelled() {
                outcome.fully_drained = !cancel.is_cancelled() && !page.has_more;
                return Ok(outcome);
            }
        }
    }

    /// Retries Backend-G batch inserts on transport failure, sleeping
    /// `retry_delay` between attempts, up to `max_retries`. Exhausting
    /// retries is a fatal condition for the whole sync (§4.4.1).
    async fn insert_with_retry(
        &self,
        g: &BackendGClient,
        chat_jid: &str,
        messages: Vec<CanonicalMessage>,
        config: SyncConfig,
    ) -> Result<wa_clients::types::BatchInsertResponse, ChatReconcileError> {
        let mut attempt = 0;
        loop {
            match g.insert_messages_batch(chat_jid, messages.clone()).await {
                Ok(resp) => return Ok(resp),
                Err(ClientError::Transport(_)) => {
                    attempt += 1;
                    if attempt > config.max_retries {
                        return Err(ChatReconcileError::GExhausted);
                    }
                    tokio::time::sleep(config.retry_delay).await;
                }
                Err(_) => return Err(ChatReconcileError::Aborted),
            }
        }
    }
}

#[derive(Default)]
struct ChatReconcileOutcome {
    messages_fetched: u64,
    messages_inserted: u64,
    messages_deduplicated: u64,
    messages_failed: u64,
    fully_drained: bool,
}

/// `Aborted` covers any failure that should only drop the current chat
/// (Backend-B transport failure, malformed body, Backend-G checkpoint
/// lookup failure); `GExhausted` is fatal to the whole run.
enum ChatReconcileError {
    Aborted,
    GExhausted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invariant_inserted_plus_deduplicated_plus_failed_equals_fetched() {
        let fetched = 500u64;
        let inserted = 300u64;
        let deduplicated = 200u64;
        let failed = 0u64;
        assert_eq!(inserted + deduplicated + failed, fetched);
    }

    #[test]
    fn messages_synced_advances_by_this_batch_only() {
        // A checkpoint already at 300 (from a prior run or an earlier
        // page) gains only this batch's inserted count, not
        // `previous + chat-cumulative-inserted-so-far`.
        let previous_messages_synced = 300u64;
        let batch_inserted = 150u64;
        let advanced = previous_messages_synced + batch_inserted;
        assert_eq!(advanced, 450);
    }

    #[tokio::test]
    async fn second_concurrent_run_on_same_chat_fails() {
        let engine = SyncEngine::new();
        let _first = engine.acquire_chat("chat-1").await.unwrap();
        let second = engine.acquire_chat("chat-1").await;
        assert!(matches!(second, Err(OrchestratorError::SyncAlreadyRunning)));
    }

    #[tokio::test]
    async fn releasing_guard_allows_a_later_run() {
        let engine = SyncEngine::new();
        {
            let _guard = engine.acquire_chat("chat-2").await.unwrap();
        }
        let again = engine.acquire_chat("chat-2").await;
        assert!(again.is_ok());
    }

    #[tokio::test]
    async fn different_chats_do_not_contend() {
        let engine = SyncEngine::new();
        let _a = engine.acquire_chat("chat-a").await.unwrap();
        let b = engine.acquire_chat("chat-b").await;
        assert!(b.is_ok());
    }

    #[test]
    fn cancel_token_starts_uncancelled() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
    }
}
