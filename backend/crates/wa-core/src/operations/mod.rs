//! Static operation table (§3, §9 Design Notes): maps an operation kind
//! string to its required capability and routing strategy, built once at
//! startup and looked up on every request. Unknown kinds are rejected
//! before any backend is invoked (§4.3 edge case `INVALID_OPERATION`).

use crate::model::{Capability, OperationDescriptor, RoutingStrategy};
use std::collections::HashMap;

/// The four hybrid/hub operations plus a representative slice of the
/// ~70 pass-through operations proxied straight to their owning backend.
pub fn operation_table() -> HashMap<&'static str, OperationDescriptor> {
    let entries: Vec<(&'static str, Capability, RoutingStrategy)> = vec![
        // Hybrid operations (§4.4): orchestrated across both backends.
        (
            "sync.reconcile",
            Capability::HistoryFetch,
            RoutingStrategy::PrimaryOnly(crate::model::Backend::B),
        ),
        (
            "workflow.mark_community_read_with_history",
            Capability::CommunityMarkRead,
            RoutingStrategy::PrimaryOnly(crate::model::Backend::G),
        ),
        // Representative pass-through slice, Backend-G (§6).
        ("messages.send", Capability::Send, RoutingStrategy::PreferG),
        ("messages.query", Capability::Query, RoutingStrategy::Fastest),
        (
            "messages.mark_read",
            Capability::MarkRead,
            RoutingStrategy::PreferG,
        ),
        (
            "communities.list",
            Capability::CommunityList,
            RoutingStrategy::PreferG,
        ),
        (
            "communities.groups",
            Capability::CommunityGroups,
            RoutingStrategy::PreferG,
        ),
        (
            "communities.mark_read",
            Capability::CommunityMarkRead,
            RoutingStrategy::PreferG,
        ),
        // Representative pass-through slice, Backend-B (§6).
        (
            "history.chats.pending",
            Capability::ChatEnumeration,
            RoutingStrategy::PrimaryOnly(crate::model::Backend::B),
        ),
        (
            "history.fetch",
            Capability::HistoryFetch,
            RoutingStrategy::PrimaryOnly(crate::model::Backend::B),
        ),
        (
            "history.status",
            Capability::HistoryStatus,
            RoutingStrategy::PrimaryOnly(crate::model::Backend::B),
        ),
        (
            "history.sync.trigger",
            Capability::HistorySync,
            RoutingStrategy::PrimaryOnly(crate::model::Backend::B),
        ),
        (
            "history.sync.cancel",
            Capability::HistoryCancel,
            RoutingStrategy::PrimaryOnly(crate::model::Backend::B),
        ),
        (
            "history.sync.resume",
            Capability::HistoryResume,
            RoutingStrategy::PrimaryOnly(crate::model::Backend::B),
        ),
        (
            "history.fetch_older",
            Capability::HistoryFetch,
            RoutingStrategy::PrimaryOnly(crate::model::Backend::B),
        ),
        // Health: round-robins across whichever backends are reachable,
        // since either can answer the diagnostic question independently.
        ("health.check", Capability::Health, RoutingStrategy::RoundRobin),
    ];

    entries
        .into_iter()
        .map(|(kind, capability, strategy)| {
            (
                kind,
                OperationDescriptor {
                    kind: kind.to_string(),
                    required_capability: capability,
                    strategy,
                },
            )
        })
        .collect()
}

/// Looks up `kind` in the static table, or reports it as invalid
/// (§4.3: raised before any backend is contacted).
pub fn lookup(table: &HashMap<&'static str, OperationDescriptor>, kind: &str) -> Result<OperationDescriptor, crate::errors::OrchestratorError> {
    table
        .get(kind)
        .cloned()
        .ok_or_else(|| crate::errors::OrchestratorError::InvalidOperation(kind.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_contains_all_hybrid_operations() {
        let table = operation_table();
        assert!(table.contains_key("sync.reconcile"));
        assert!(table.contains_key("workflow.mark_community_read_with_history"));
    }

    #[test]
    fn unknown_kind_is_invalid_operation() {
        let table = operation_table();
        let result = lookup(&table, "nonexistent.kind");
        assert!(matches!(
            result,
            Err(crate::errors::OrchestratorError::InvalidOperation(_))
        ));
    }

    #[test]
    fn known_kind_resolves() {
        let table = operation_table();
        let result = lookup(&table, "messages.send");
        assert!(result.is_ok());
        assert_eq!(result.unwrap().required_capability, Capability::Send);
    }
}
