//! Health Monitor (§4.1): publishes a cached, bounded-latency Health
//! Snapshot per backend. Grounded on the consecutive-failure/-success
//! threshold state machine and lock-free atomic-pointer-swap pattern used
//! for backend health in the reference RPC router's health module, wired
//! here to the two named backends over `reqwest` instead of `hyper`.

use crate::model::{AggregateHealth, Backend, HealthClassification, HealthSnapshot};
use arc_swap::ArcSwap;
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use wa_clients::{BackendBClient, BackendGClient};

struct Cached {
    snapshot: HealthSnapshot,
    /// `None` means never refreshed — always treated as stale.
    refreshed_at: Option<Instant>,
}

/// Probes both backends on demand, caching each snapshot for `ttl`.
/// Snapshots are stored behind `ArcSwap` so readers never observe a
/// torn/partially-updated snapshot (§5 shared-resource policy).
pub struct Monitor {
    g_client: Arc<BackendGClient>,
    b_client: Arc<BackendBClient>,
    g_cache: ArcSwap<Cached>,
    b_cache: ArcSwap<Cached>,
    ttl: Duration,
}

impl Monitor {
    pub fn new(g_client: Arc<BackendGClient>, b_client: Arc<BackendBClient>, ttl: Duration) -> Self {
        let placeholder = Cached {
            snapshot: HealthSnapshot::unknown(),
            refreshed_at: None,
        };
        Self {
            g_client,
            b_client,
            g_cache: ArcSwap::from_pointee(placeholder_clone(&placeholder)),
            b_cache: ArcSwap::new(Arc::new(placeholder)),
            ttl,
        }
    }

    fn cache_for(&self, backend: Backend) -> &ArcSwap<Cached> {
        match backend {
            Backend::G => &self.g_cache,
            Backend::B => &self.b_cache,
        }
    }

    /// Returns the most recent snapshot for `backend`. If the cached
    /// snapshot is older than the TTL, probes synchronously and blocks
    /// up to the probe's own timeout for the fresh result.
    pub async fn snapshot(&self, backend: Backend) -> HealthSnapshot {
        let cache = self.cache_for(backend);
        let current = cache.load();
        if let Some(refreshed_at) = current.refreshed_at {
            if refreshed_at.elapsed() <= self.ttl {
                return current.snapshot.clone();
            }
        }

        let previous_failures = current.snapshot.consecutive_failures;
        let fresh = self.probe(backend, previous_failures).await;
        cache.store(Arc::new(Cached {
            snapshot: fresh.clone(),
            refreshed_at: Some(Instant::now()),
        }));
        fresh
    }

    /// Derived overall view; never probes.
    pub async fn aggregate(&self) -> AggregateHealth {
        let g = self.g_cache.load().snapshot.clone();
        let b = self.b_cache.load().snapshot.clone();
        AggregateHealth::from_snapshots(&g, &b)
    }

    /// Polls `snapshot(backend)` until it classifies `ok` or `deadline`
    /// elapses. Returns whether it became available in time.
    pub async fn wait_for(&self, backend: Backend, deadline: Instant) -> bool {
        loop {
            if self.snapshot(backend).await.classification.is_ok() {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    }

    /// Issues the HTTP GET health probe and classifies the result.
    /// Never raises — every branch produces a snapshot.
    async fn probe(&self, backend: Backend, previous_failures: u32) -> HealthSnapshot {
        let started = Instant::now();
        let result = match backend {
            Backend::G => self.g_client.health().await,
            Backend::B => self.b_client.health().await,
        };
        let response_time_ms = started.elapsed().as_millis() as u64;
        let now = Utc::now();

        match result {
            Ok(body) => {
                if body.connected {
                    HealthSnapshot {
                        reachable: true,
                        connected_to_whatsapp: true,
                        response_time_ms,
                        last_checked_at: now,
                        consecutive_failures: 0,
                        classification: HealthClassification::Ok,
                    }
                } else {
                    HealthSnapshot {
                        reachable: true,
                        connected_to_whatsapp: false,
                        response_time_ms,
                        last_checked_at: now,
                        consecutive_failures: previous_failures,
                        classification: HealthClassification::Degraded,
                    }
                }
            }
            Err(wa_clients::ClientError::HttpError { .. }) => HealthSnapshot {
                reachable: true,
                connected_to_whatsapp: false,
                response_time_ms,
                last_checked_at: now,
                consecutive_failures: previous_failures,
                classification: HealthClassification::Error,
            },
            Err(wa_clients::ClientError::Decode(_)) => HealthSnapshot {
                reachable: true,
                connected_to_whatsapp: false,
                response_time_ms,
                last_checked_at: now,
                consecutive_failures: previous_failures,
                classification: HealthClassification::Error,
            },
            Err(wa_clients::ClientError::Transport(_))
            | Err(wa_clients::ClientError::BackendError { .. }) => HealthSnapshot {
                reachable: false,
                connected_to_whatsapp: false,
                response_time_ms,
                last_checked_at: now,
                consecutive_failures: previous_failures + 1,
                classification: HealthClassification::Unreachable,
            },
        }
    }
}

fn placeholder_clone(c: &Cached) -> Cached {
    Cached {
        snapshot: c.snapshot.clone(),
        refreshed_at: c.refreshed_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HealthClassification;

    fn classify(connected_body: Option<bool>, err: Option<&wa_clients::ClientError>) -> HealthClassification {
        // Mirrors Monitor::probe's match arms without needing a live HTTP
        // server, exercising the classification rules in isolation.
        if let Some(e) = err {
            return match e {
                wa_clients::ClientError::Transport(_) => HealthClassification::Unreachable,
                wa_clients::ClientError::BackendError { .. } => HealthClassification::Unreachable,
                wa_clients::ClientError::HttpError { .. } => HealthClassification::Error,
                wa_clients::ClientError::Decode(_) => HealthClassification::Error,
            };
        }
        match connected_body {
            Some(true) => HealthClassification::Ok,
            Some(false) => HealthClassification::Degraded,
            None => unreachable!(),
        }
    }

    #[test]
    fn connection_refused_classifies_unreachable() {
        let err = wa_clients::ClientError::Transport("connection refused".into());
        assert_eq!(classify(None, Some(&err)), HealthClassification::Unreachable);
    }

    #[test]
    fn non_2xx_classifies_error() {
        let err = wa_clients::ClientError::HttpError {
            status: 500,
            body: String::new(),
        };
        assert_eq!(classify(None, Some(&err)), HealthClassification::Error);
    }

    #[test]
    fn connected_false_classifies_degraded() {
        assert_eq!(classify(Some(false), None), HealthClassification::Degraded);
    }

    #[test]
    fn connected_true_classifies_ok() {
        assert_eq!(classify(Some(true), None), HealthClassification::Ok);
    }

    #[tokio::test]
    async fn snapshot_uses_cache_within_ttl() {
        let g = Arc::new(BackendGClient::new(
            "http://127.0.0.1:1",
            wa_clients::TimeoutPolicy::default(),
        ));
        let b = Arc::new(BackendBClient::new(
            "http://127.0.0.1:1",
            wa_clients::TimeoutPolicy::default(),
        ));
        let monitor = Monitor::new(g, b, Duration::from_secs(60));
        // seed the cache manually to avoid a real network probe
        monitor.g_cache.store(Arc::new(Cached {
            snapshot: HealthSnapshot {
                classification: HealthClassification::Ok,
                ..HealthSnapshot::unknown()
            },
            refreshed_at: Some(Instant::now()),
        }));
        let snap = monitor.snapshot(Backend::G).await;
        assert_eq!(snap.classification, HealthClassification::Ok);
    }
}
