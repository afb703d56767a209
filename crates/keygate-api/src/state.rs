//! Application state shared across all handlers.

use std::sync::Arc;

use async_trait::async_trait;

use keygate_auth::SessionManager;
use keygate_cache::CacheManager;
use keygate_core::config::AppConfig;
use keygate_core::traits::CacheProvider;
use keygate_database::DatabasePool;

/// A backing dependency the readiness probe checks.
#[async_trait]
pub trait HealthProbe: Send + Sync + std::fmt::Debug {
    /// Short name reported when the check fails.
    fn name(&self) -> &'static str;

    async fn is_healthy(&self) -> bool;
}

#[async_trait]
impl HealthProbe for DatabasePool {
    fn name(&self) -> &'static str {
        "database"
    }

    async fn is_healthy(&self) -> bool {
        self.health_check().await.unwrap_or(false)
    }
}

#[async_trait]
impl HealthProbe for CacheManager {
    fn name(&self) -> &'static str {
        "cache"
    }

    async fn is_healthy(&self) -> bool {
        self.health_check().await.unwrap_or(false)
    }
}

/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Session orchestrator.
    pub sessions: Arc<SessionManager>,
    /// Dependencies checked by `/health/ready`.
    pub probes: Arc<Vec<Arc<dyn HealthProbe>>>,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        sessions: Arc<SessionManager>,
        probes: Vec<Arc<dyn HealthProbe>>,
    ) -> Self {
        Self {
            config,
            sessions,
            probes: Arc::new(probes),
        }
    }
}
