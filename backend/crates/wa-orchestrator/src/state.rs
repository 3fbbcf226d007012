use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use wa_clients::{BackendBClient, BackendGClient};
use wa_core::model::OperationDescriptor;
use wa_core::{Monitor, RoutingEngine, SyncEngine};

use crate::config::OrchestratorConfig;

/// Application state shared across all request handlers: the two
/// backend clients, the routing/health/sync engines built on top of
/// them, and the static operation table.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<OrchestratorConfig>,
    pub g_client: Arc<BackendGClient>,
    pub b_client: Arc<BackendBClient>,
    pub monitor: Arc<Monitor>,
    pub routing: Arc<RoutingEngine>,
    pub sync_engine: Arc<SyncEngine>,
    pub operations: Arc<HashMap<&'static str, OperationDescriptor>>,
    pub startup_time: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(config: OrchestratorConfig) -> Self {
        let timeouts = config.timeouts.to_policy();
        let g_client = Arc::new(BackendGClient::new(config.backends.backend_g_url.clone(), timeouts));
        let b_client = Arc::new(BackendBClient::new(config.backends.backend_b_url.clone(), timeouts));

        let health_ttl = Duration::from_secs(config.retry.health_cache_ttl_secs);
        let monitor = Arc::new(Monitor::new(g_client.clone(), b_client.clone(), health_ttl));
        let routing = Arc::new(RoutingEngine::new(monitor.clone()));
        let sync_engine = Arc::new(SyncEngine::new());
        let operations = Arc::new(wa_core::operations::operation_table());

        Self {
            config: Arc::new(config),
            g_client,
            b_client,
            monitor,
            routing,
            sync_engine,
            operations,
            startup_time: chrono::Utc::now(),
        }
    }

    pub fn uptime_seconds(&self) -> i64 {
        chrono::Utc::now()
            .signed_duration_since(self.startup_time)
            .num_seconds()
    }

    pub fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppStateError {
    #[error("configuration error: {0}")]
    Configuration(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_populates_the_operation_table() {
        let state = AppState::new(OrchestratorConfig::default());
        assert!(state.operations.contains_key("sync.reconcile"));
        assert!(state.operations.contains_key("health.check"));
    }

    #[test]
    fn uptime_is_non_negative_immediately_after_startup() {
        let state = AppState::new(OrchestratorConfig::default());
        assert!(state.uptime_seconds() >= 0);
    }
}
