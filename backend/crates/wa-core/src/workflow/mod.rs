//! Hybrid "mark community as read with history" workflow (§4.4.2):
//! resolves a community to its groups, triggers a history backfill on
//! any group lacking full coverage, waits for Backend-B to catch up,
//! reconciles the newly-synced messages into Backend-G, then marks the
//! community read on Backend-G. Grounded on the async-trait service
//! composition used by the orchestration layer for multi-step flows.

use crate::errors::OrchestratorError;
use crate::sync::{CancelToken, SyncConfig, SyncEngine};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use wa_clients::types::CommunityMarkReadResponse;
use wa_clients::{BackendBClient, BackendGClient};

#[derive(Debug, Clone, Copy)]
pub struct WorkflowConfig {
    pub sync_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            sync_timeout: Duration::from_secs(600),
            poll_interval: Duration::from_secs(2),
        }
    }
}

/// Composite result: sync and mark-read outcomes are reported
/// independently, since one can succeed while the other fails (§4.4.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkCommunityReadResult {
    pub community_jid: String,
    pub groups_considered: usize,
    pub sync_result: Option<crate::model::SyncResult>,
    pub sync_skipped: bool,
    pub mark_read: Option<CommunityMarkReadResponse>,
}

pub struct MarkCommunityReadWorkflow<'a> {
    pub g: &'a BackendGClient,
    pub b: &'a BackendBClient,
    pub sync_engine: &'a SyncEngine,
}

impl<'a> MarkCommunityReadWorkflow<'a> {
    /// Runs the workflow for `community_jid`. Re-running for a community
    /// already caught up is safe: coverage check finds nothing to sync
    /// and mark-read on Backend-G is itself idempotent (§4.4.2 idempotent
    /// re-run behaviour).
    pub async fn run(
        &self,
        community_jid: &str,
        config: WorkflowConfig,
    ) -> Result<MarkCommunityReadResult, OrchestratorError> {
        let started = Instant::now();
        let groups = self
            .g
            .community_groups(community_jid)
            .await
            .map_err(OrchestratorError::from)?;
        Self::log_phase_completed(community_jid, "resolve_groups", started.elapsed());

        let needs_coverage = self.needs_history_coverage(&groups.groups).await;

        let sync_result = if needs_coverage {
            let phase_started = Instant::now();
            let result = self.sync_with_backfill(&groups.groups, config).await?;
            Self::log_phase_completed(community_jid, "sync_with_backfill", phase_started.elapsed());
            Some(result)
        } else {
            None
        };

        let phase_started = Instant::now();
        let mark_read = self
            .g
            .mark_community_read(community_jid)
            .await
            .map_err(OrchestratorError::from)?;
        Self::log_phase_completed(community_jid, "mark_community_read", phase_started.elapsed());

        Ok(MarkCommunityReadResult {
            community_jid: community_jid.to_string(),
            groups_considered: groups.groups.len(),
            sync_result,
            sync_skipped: !needs_coverage,
            mark_read: Some(mark_read),
        })
    }

    fn log_phase_completed(community_jid: &str, phase: &str, elapsed: Duration) {
        tracing::info!(
            community_jid = %community_jid,
            phase = %phase,
            duration_ms = elapsed.as_millis() as u64,
            event = "workflow_phase_completed",
            "Workflow phase completed"
        );
    }

    /// A community needs a backfill if Backend-B is still mid-sync, or
    /// has never finished one, for the WhatsApp connection backing these
    /// groups (§4.4.2 "coverage needed" predicate).
    async fn needs_history_coverage(&self, _groups: &[wa_clients::types::CommunityGroup]) -> bool {
        match self.b.sync_status().await {
            Ok(status) => !status.is_latest,
            // Backend-B being unreachable is itself a reason to attempt
            // coverage before trusting Backend-G's view is complete.
            Err(_) => true,
        }
    }

    /// Fire-and-forget triggers Backend-B's history sync, polls until
    /// `is_latest` or `sync_timeout` elapses, then reconciles whatever
    /// was synced. A timeout aborts the whole workflow before any
    /// mark-read call (§4.4.2: "no partial mark-read on timeout").
    async fn sync_with_backfill(
        &self,
        groups: &[wa_clients::types::CommunityGroup],
        config: WorkflowConfig,
    ) -> Result<crate::model::SyncResult, OrchestratorError> {
        self.b
            .trigger_sync(Some(groups.iter().map(|g| g.jid.clone()).collect()))
            .await
            .map_err(OrchestratorError::from)?;

        let deadline = Instant::now() + config.sync_timeout;
        loop {
            let status = self.b.sync_status().await.map_err(OrchestratorError::from)?;
            if status.is_latest {
                break;
            }
            if Instant::now() >= deadline {
                return Err(OrchestratorError::SyncTimeout);
            }
            tokio::time::sleep(config.poll_interval).await;
        }

        let cancel = CancelToken::new();
        let mut combined = crate::model::SyncResult::default();
        for group in groups {
            let result = self
                .sync_engine
                .reconcile(self.g, self.b, Some(&group.jid), SyncConfig::default(), &cancel)
                .await?;
            combined.messages_fetched += result.messages_fetched;
            combined.messages_inserted += result.messages_inserted;
            combined.messages_deduplicated += result.messages_deduplicated;
            combined.messages_failed += result.messages_failed;
            combined.chats_processed += result.chats_processed;
            combined.chats_failed += result.chats_failed;
            combined.elapsed_ms += result.elapsed_ms;
            combined.partial = combined.partial || result.partial;
        }
        Ok(combined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sync_timeout_is_ten_minutes() {
        assert_eq!(WorkflowConfig::default().sync_timeout, Duration::from_secs(600));
    }

    #[test]
    fn default_poll_interval_is_two_seconds() {
        assert_eq!(WorkflowConfig::default().poll_interval, Duration::from_secs(2));
    }
}
