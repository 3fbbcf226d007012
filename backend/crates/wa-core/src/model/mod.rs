//! Core data model (§3): Backend Descriptor, Health Snapshot, Aggregate
//! Health, Operation Descriptor, Sync Checkpoint, Sync Result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Backend {
    G,
    B,
}

impl Backend {
    pub fn other(self) -> Backend {
        match self {
            Backend::G => Backend::B,
            Backend::B => Backend::G,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Backend::G => "G",
            Backend::B => "B",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleHint {
    Primary,
    Secondary,
}

/// A capability a backend can satisfy. `PassThrough` covers the ~70
/// non-hybrid operations that are thin proxies; both backends may be
/// tagged with it depending on which bridge actually owns the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    Send,
    Query,
    MarkRead,
    CommunityList,
    CommunityGroups,
    CommunityMarkRead,
    HistoryFetch,
    HistoryStatus,
    HistorySync,
    HistoryCancel,
    HistoryResume,
    ChatEnumeration,
    Health,
    PassThrough,
}

/// Constant at process lifetime: one instance per backend.
#[derive(Debug, Clone)]
pub struct BackendDescriptor {
    pub backend: Backend,
    pub base_url: String,
    pub role: RoleHint,
    pub capabilities: HashSet<Capability>,
}

impl BackendDescriptor {
    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

/// Backend-G's capability set (§AMBIENT F).
pub fn backend_g_capabilities() -> HashSet<Capability> {
    [
        Capability::Send,
        Capability::Query,
        Capability::MarkRead,
        Capability::CommunityList,
        Capability::CommunityGroups,
        Capability::CommunityMarkRead,
        Capability::PassThrough,
        Capability::Health,
    ]
    .into_iter()
    .collect()
}

/// Backend-B's capability set (§AMBIENT F).
pub fn backend_b_capabilities() -> HashSet<Capability> {
    [
        Capability::HistoryFetch,
        Capability::HistoryStatus,
        Capability::HistorySync,
        Capability::HistoryCancel,
        Capability::HistoryResume,
        Capability::ChatEnumeration,
        Capability::Health,
    ]
    .into_iter()
    .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthClassification {
    Ok,
    Degraded,
    Unreachable,
    Error,
}

impl HealthClassification {
    pub fn is_ok(self) -> bool {
        matches!(self, HealthClassification::Ok)
    }

    pub fn is_usable(self) -> bool {
        matches!(self, HealthClassification::Ok | HealthClassification::Degraded)
    }
}

/// One per backend, held in memory, replaced atomically (never mutated
/// in place — see `health::Monitor`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub reachable: bool,
    pub connected_to_whatsapp: bool,
    pub response_time_ms: u64,
    pub last_checked_at: DateTime<Utc>,
    pub consecutive_failures: u32,
    pub classification: HealthClassification,
}

impl HealthSnapshot {
    /// Optimistic placeholder used before the first probe completes.
    pub fn unknown() -> Self {
        Self {
            reachable: false,
            connected_to_whatsapp: false,
            response_time_ms: 0,
            last_checked_at: DateTime::<Utc>::from_timestamp(0, 0).expect("epoch is representable"),
            consecutive_failures: 0,
            classification: HealthClassification::Unreachable,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverallHealth {
    Ok,
    Degraded,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateHealth {
    pub overall: OverallHealth,
    pub available_backends: HashSet<Backend>,
}

impl AggregateHealth {
    pub fn from_snapshots(g: &HealthSnapshot, b: &HealthSnapshot) -> Self {
        let available_backends: HashSet<Backend> = [
            (Backend::G, g.classification),
            (Backend::B, b.classification),
        ]
        .into_iter()
        .filter(|(_, c)| c.is_usable())
        .map(|(backend, _)| backend)
        .collect();

        let overall = if g.classification.is_ok() && b.classification.is_ok() {
            OverallHealth::Ok
        } else if !g.classification.is_ok() && !b.classification.is_ok() {
            OverallHealth::Error
        } else {
            OverallHealth::Degraded
        };

        Self {
            overall,
            available_backends,
        }
    }
}

/// Routing strategy for an operation (§3, §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoutingStrategy {
    PrimaryOnly(Backend),
    PreferG,
    PreferB,
    RoundRobin,
    Fastest,
}

#[derive(Debug, Clone)]
pub struct OperationDescriptor {
    pub kind: String,
    pub required_capability: Capability,
    pub strategy: RoutingStrategy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncCheckpoint {
    pub chat_jid: String,
    pub last_synced_timestamp: i64,
    pub messages_synced: u64,
    pub last_message_id: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncResult {
    pub messages_fetched: u64,
    pub messages_inserted: u64,
    pub messages_deduplicated: u64,
    pub messages_failed: u64,
    pub chats_processed: u64,
    pub chats_failed: u64,
    pub elapsed_ms: u64,
    pub partial: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_health_is_ok_iff_both_backends_ok() {
        let mut g = HealthSnapshot::unknown();
        g.classification = HealthClassification::Ok;
        let mut b = HealthSnapshot::unknown();
        b.classification = HealthClassification::Ok;
        assert_eq!(AggregateHealth::from_snapshots(&g, &b).overall, OverallHealth::Ok);
    }

    #[test]
    fn aggregate_health_is_error_iff_neither_ok() {
        let mut g = HealthSnapshot::unknown();
        g.classification = HealthClassification::Unreachable;
        let mut b = HealthSnapshot::unknown();
        b.classification = HealthClassification::Error;
        assert_eq!(
            AggregateHealth::from_snapshots(&g, &b).overall,
            OverallHealth::Error
        );
    }

    #[test]
    fn aggregate_health_is_degraded_when_mixed() {
        let mut g = HealthSnapshot::unknown();
        g.classification = HealthClassification::Ok;
        let mut b = HealthSnapshot::unknown();
        b.classification = HealthClassification::Degraded;
        assert_eq!(
            AggregateHealth::from_snapshots(&g, &b).overall,
            OverallHealth::Degraded
        );
        assert!(AggregateHealth::from_snapshots(&g, &b)
            .available_backends
            .contains(&Backend::B));
    }

    #[test]
    fn degraded_backend_is_usable_but_not_ok() {
        assert!(HealthClassification::Degraded.is_usable());
        assert!(!HealthClassification::Degraded.is_ok());
    }
}
