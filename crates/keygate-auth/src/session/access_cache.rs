//! Volatile liveness markers for issued tokens.
//!
//! An access token is honoured only while `access:<jti>` is present. The
//! entry's TTL equals the token lifetime, so the marker lapses no later
//! than the signature does. A restarted or flushed cache therefore
//! invalidates every outstanding access token.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use uuid::Uuid;

use keygate_cache::keys;
use keygate_core::result::AppResult;
use keygate_core::traits::CacheProvider;

/// Access-token liveness over a [`CacheProvider`].
#[derive(Debug, Clone)]
pub struct AccessCache {
    provider: Arc<dyn CacheProvider>,
}

impl AccessCache {
    pub fn new(provider: Arc<dyn CacheProvider>) -> Self {
        Self { provider }
    }

    /// Record `jti` as valid for `user_id` for `ttl`. Overwrites refresh the TTL.
    pub async fn mark_valid(&self, jti: Uuid, user_id: Uuid, ttl: Duration) -> AppResult<()> {
        self.provider
            .set(&keys::access_token(jti), &user_id.to_string(), ttl)
            .await
    }

    /// Mirror an issued refresh token. Informational only; the ledger
    /// decides refresh-token liveness.
    pub async fn mirror_refresh(&self, jti: Uuid, user_id: Uuid, ttl: Duration) -> AppResult<()> {
        self.provider
            .set(&keys::refresh_token(jti), &user_id.to_string(), ttl)
            .await
    }

    /// The user an access `jti` was issued to, if it is still live.
    pub async fn lookup(&self, jti: Uuid) -> AppResult<Option<Uuid>> {
        let Some(raw) = self.provider.get(&keys::access_token(jti)).await? else {
            return Ok(None);
        };

        match Uuid::parse_str(&raw) {
            Ok(user_id) => Ok(Some(user_id)),
            Err(_) => {
                warn!(jti = %jti, "Ignoring unreadable access cache entry");
                Ok(None)
            }
        }
    }

    /// Release the backing cache handle. Does not revoke anything.
    pub async fn clear(&self) -> AppResult<()> {
        self.provider.close().await?;
        debug!("Access cache released");
        Ok(())
    }
}
