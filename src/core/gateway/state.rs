//! Process-wide mutable state shared by gateway instances

use super::types::GatewayResponse;
use crate::config::RelayConfig;
use crate::core::cache_manager::ResponseCache;
use crate::core::health::HealthMonitor;
use crate::core::router::RoundRobinCursor;
use std::sync::Arc;

/// Cache, health table and round-robin cursor.
///
/// Built once and handed to every component that needs it, so tests can
/// create isolated instances.
#[derive(Debug)]
pub struct GatewayState {
    pub health: Arc<HealthMonitor>,
    pub cache: ResponseCache<GatewayResponse>,
    pub cursor: Arc<RoundRobinCursor>,
}

impl GatewayState {
    pub fn new(config: &RelayConfig) -> Self {
        Self {
            health: Arc::new(HealthMonitor::new(config.health.clone())),
            cache: ResponseCache::new(&config.cache),
            cursor: Arc::new(RoundRobinCursor::new()),
        }
    }
}

impl Default for GatewayState {
    fn default() -> Self {
        Self::new(&RelayConfig::default())
    }
}
