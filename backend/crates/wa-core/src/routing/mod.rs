//! Routing Engine (§4.3): selects a backend for an operation and executes
//! it, with fallback to the alternate backend on certain failures.

use crate::health::Monitor;
use crate::model::{AggregateHealth, Backend, Capability, OperationDescriptor, RoutingStrategy};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use wa_clients::ClientError;

/// Process-wide round-robin counter (§9 Design Notes: a single atomic
/// integer, not a per-operation structure; overflow is benign).
static ROUND_ROBIN_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, thiserror::Error, Clone)]
pub enum RoutingError {
    #[error("no backend available")]
    NoBackendAvailable,
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}

#[derive(Debug, Clone)]
pub struct RoutingInfo {
    pub selected: Option<Backend>,
    pub strategy: RoutingStrategy,
    pub primary_health: crate::model::HealthClassification,
    pub secondary_health: crate::model::HealthClassification,
}

pub struct RoutingEngine {
    monitor: Arc<Monitor>,
}

impl RoutingEngine {
    pub fn new(monitor: Arc<Monitor>) -> Self {
        Self { monitor }
    }

    /// Backend selection algorithm (§4.3 steps 1-4), independent of
    /// executing the call — used by both `route` and `routing_info`.
    async fn candidates(&self, required: Capability) -> Vec<Backend> {
        let descriptors = backend_descriptors();
        let mut candidates: Vec<Backend> = descriptors
            .iter()
            .filter(|d| d.supports(required))
            .map(|d| d.backend)
            .collect();

        let g_snapshot = self.monitor.snapshot(Backend::G).await;
        let b_snapshot = self.monitor.snapshot(Backend::B).await;
        let health_of = |b: Backend| if b == Backend::G { &g_snapshot } else { &b_snapshot };

        let ok_candidates: Vec<Backend> = candidates
            .iter()
            .copied()
            .filter(|b| health_of(*b).classification.is_ok())
            .collect();

        if !ok_candidates.is_empty() {
            candidates = ok_candidates;
        } else {
            candidates.retain(|b| health_of(*b).classification.is_usable());
        }

        candidates
    }

    fn select(&self, strategy: RoutingStrategy, candidates: &[Backend], aggregate: &AggregateHealthRates) -> Option<Backend> {
        match strategy {
            RoutingStrategy::PrimaryOnly(x) => candidates.iter().copied().find(|b| *b == x),
            RoutingStrategy::PreferG => {
                if candidates.contains(&Backend::G) {
                    Some(Backend::G)
                } else {
                    candidates.iter().copied().find(|b| *b == Backend::B)
                }
            }
            RoutingStrategy::PreferB => {
                if candidates.contains(&Backend::B) {
                    Some(Backend::B)
                } else {
                    candidates.iter().copied().find(|b| *b == Backend::G)
                }
            }
            RoutingStrategy::RoundRobin => {
                if candidates.is_empty() {
                    None
                } else {
                    let idx = ROUND_ROBIN_COUNTER.fetch_add(1, Ordering::Relaxed) as usize % candidates.len();
                    Some(candidates[idx])
                }
            }
            RoutingStrategy::Fastest => select_fastest(candidates, aggregate),
        }
    }

    /// Selects a backend and invokes the corresponding client call via
    /// `invoke`, retrying once on the alternate backend per the fallback
    /// rule (§4.3). `invoke` performs the actual HTTP call for a chosen
    /// backend.
    pub async fn route<F, Fut, T>(
        &self,
        op: &OperationDescriptor,
        invoke: F,
    ) -> Result<T, RoutingOutcome>
    where
        F: Fn(Backend) -> Fut,
        Fut: std::future::Future<Output = Result<T, ClientError>>,
    {
        // Both unreachable: fail immediately without issuing any further
        // probes (§4.3 tie-break & edge cases). This is a stronger
        // condition than "aggregate is Error" — a degraded backend may
        // still serve, per the candidate-selection fallback below.
        let aggregate = self.monitor.aggregate().await;
        let both_unreachable = aggregate.available_backends.is_empty()
            && matches!(aggregate.overall, crate::model::OverallHealth::Error);
        if both_unreachable {
            return Err(RoutingOutcome::Routing(RoutingError::NoBackendAvailable));
        }

        let candidates = self.candidates(op.required_capability).await;
        if candidates.is_empty() {
            return Err(RoutingOutcome::Routing(RoutingError::NoBackendAvailable));
        }

        let rates = self.response_time_rates().await;
        let selected = self
            .select(op.strategy, &candidates, &rates)
            .ok_or(RoutingOutcome::Routing(RoutingError::NoBackendAvailable))?;

        let first = invoke(selected).await;
        match first {
            Ok(value) => Ok(value),
            Err(err) => {
                let allow_fallback = !matches!(op.strategy, RoutingStrategy::PrimaryOnly(_)) && err.is_retryable();
                if allow_fallback {
                    let alternate = selected.other();
                    if candidates.contains(&alternate) {
                        return match invoke(alternate).await {
                            Ok(value) => Ok(value),
                            Err(err2) => Err(RoutingOutcome::Client(err2)),
                        };
                    }
                }
                Err(RoutingOutcome::Client(err))
            }
        }
    }

    pub async fn is_available(&self, required: Capability) -> bool {
        let g = self.monitor.snapshot(Backend::G).await;
        let b = self.monitor.snapshot(Backend::B).await;
        let descriptors = backend_descriptors();
        descriptors.iter().any(|d| {
            d.supports(required)
                && match d.backend {
                    Backend::G => g.classification.is_ok(),
                    Backend::B => b.classification.is_ok(),
                }
        })
    }

    pub async fn routing_info(&self, op: &OperationDescriptor) -> RoutingInfo {
        let g = self.monitor.snapshot(Backend::G).await;
        let b = self.monitor.snapshot(Backend::B).await;
        let candidates = self.candidates(op.required_capability).await;
        let rates = AggregateHealthRates {
            g_ms: g.response_time_ms,
            b_ms: b.response_time_ms,
        };
        let selected = self.select(op.strategy, &candidates, &rates);
        RoutingInfo {
            selected,
            strategy: op.strategy,
            primary_health: g.classification,
            secondary_health: b.classification,
        }
    }

    async fn response_time_rates(&self) -> AggregateHealthRates {
        let g = self.monitor.snapshot(Backend::G).await;
        let b = self.monitor.snapshot(Backend::B).await;
        AggregateHealthRates {
            g_ms: g.response_time_ms,
            b_ms: b.response_time_ms,
        }
    }
}

struct AggregateHealthRates {
    g_ms: u64,
    b_ms: u64,
}

/// `FASTEST` strategy: smaller `response_time_ms` wins; ties prefer `G`
/// (§9 open question, pinned for determinism).
fn select_fastest(candidates: &[Backend], rates: &AggregateHealthRates) -> Option<Backend> {
    if candidates.is_empty() {
        return None;
    }
    if candidates.len() == 1 {
        return Some(candidates[0]);
    }
    if rates.g_ms <= rates.b_ms {
        if candidates.contains(&Backend::G) {
            return Some(Backend::G);
        }
        return Some(Backend::B);
    }
    if candidates.contains(&Backend::B) {
        return Some(Backend::B);
    }
    Some(Backend::G)
}

/// Outcome of `RoutingEngine::route`: either a routing-layer failure
/// (no candidate, invalid operation — raised before any backend is
/// invoked) or the last backend's client error after fallback.
#[derive(Debug, Clone)]
pub enum RoutingOutcome {
    Routing(RoutingError),
    Client(ClientError),
}

pub fn backend_descriptors() -> Vec<crate::model::BackendDescriptor> {
    vec![
        crate::model::BackendDescriptor {
            backend: Backend::G,
            base_url: String::new(),
            role: crate::model::RoleHint::Primary,
            capabilities: crate::model::backend_g_capabilities(),
        },
        crate::model::BackendDescriptor {
            backend: Backend::B,
            base_url: String::new(),
            role: crate::model::RoleHint::Secondary,
            capabilities: crate::model::backend_b_capabilities(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fastest_prefers_smaller_response_time() {
        let candidates = vec![Backend::G, Backend::B];
        let rates = AggregateHealthRates { g_ms: 25, b_ms: 80 };
        assert_eq!(select_fastest(&candidates, &rates), Some(Backend::G));
    }

    #[test]
    fn fastest_breaks_ties_toward_g() {
        let candidates = vec![Backend::G, Backend::B];
        let rates = AggregateHealthRates { g_ms: 50, b_ms: 50 };
        assert_eq!(select_fastest(&candidates, &rates), Some(Backend::G));
    }

    #[test]
    fn round_robin_distributes_fairly_across_candidates() {
        ROUND_ROBIN_COUNTER.store(0, Ordering::Relaxed);
        let candidates = vec![Backend::G, Backend::B];
        let mut g_count = 0;
        let mut b_count = 0;
        for _ in 0..10 {
            let idx = ROUND_ROBIN_COUNTER.fetch_add(1, Ordering::Relaxed) as usize % candidates.len();
            if candidates[idx] == Backend::G {
                g_count += 1;
            } else {
                b_count += 1;
            }
        }
        assert_eq!(g_count, 5);
        assert_eq!(b_count, 5);
    }

    #[test]
    fn prefer_g_falls_back_to_b_when_g_not_a_candidate() {
        let engine_select = |candidates: &[Backend]| -> Option<Backend> {
            if candidates.contains(&Backend::G) {
                Some(Backend::G)
            } else {
                candidates.iter().copied().find(|b| *b == Backend::B)
            }
        };
        assert_eq!(engine_select(&[Backend::B]), Some(Backend::B));
        assert_eq!(engine_select(&[Backend::G, Backend::B]), Some(Backend::G));
    }
}
