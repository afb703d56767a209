//! Redis connection management.

use std::sync::Arc;

use redis::Client;
use redis::aio::ConnectionManager;
use tokio::sync::RwLock;
use tracing::info;

use keygate_core::config::RedisCacheConfig;
use keygate_core::error::{AppError, ErrorKind};
use keygate_core::redact::mask_url_password;
use keygate_core::result::AppResult;

/// Redis client wrapper with an explicit open/close lifecycle.
#[derive(Clone)]
pub struct RedisClient {
    /// Reconnecting connection manager; `None` once released.
    conn: Arc<RwLock<Option<ConnectionManager>>>,
    /// Key prefix for all keys.
    key_prefix: String,
}

impl std::fmt::Debug for RedisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisClient")
            .field("key_prefix", &self.key_prefix)
            .finish_non_exhaustive()
    }
}

impl RedisClient {
    /// Create a new Redis client from configuration.
    pub async fn connect(config: &RedisCacheConfig) -> AppResult<Self> {
        info!(url = %mask_url_password(&config.url), "Connecting to Redis");

        let client = Client::open(config.url.as_str()).map_err(|e| {
            AppError::with_source(ErrorKind::Cache, "Failed to create Redis client", e)
        })?;

        let conn = ConnectionManager::new(client).await.map_err(|e| {
            AppError::with_source(ErrorKind::Cache, "Failed to connect to Redis", e)
        })?;

        info!("Successfully connected to Redis");
        Ok(Self {
            conn: Arc::new(RwLock::new(Some(conn))),
            key_prefix: config.key_prefix.clone(),
        })
    }

    /// Clone out the connection manager, failing if the client was released.
    pub async fn conn_mut(&self) -> AppResult<ConnectionManager> {
        self.conn
            .read()
            .await
            .clone()
            .ok_or_else(|| AppError::cache("Redis connection already released"))
    }

    /// Drop the shared connection. In-flight clones finish their command.
    pub async fn release(&self) {
        if self.conn.write().await.take().is_some() {
            info!("Redis connection released");
        }
    }

    /// Build a full key with the configured prefix.
    pub fn prefixed_key(&self, key: &str) -> String {
        format!("{}{key}", self.key_prefix)
    }
}
