//! Shared fixtures for session tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{EncodingKey, Header};
use serde_json::json;
use uuid::Uuid;

use keygate_auth::SessionManager;
use keygate_cache::memory::MemoryCacheProvider;
use keygate_core::config::{AuthConfig, MemoryCacheConfig};
use keygate_core::error::AppError;
use keygate_core::result::AppResult;
use keygate_core::traits::CacheProvider;
use keygate_database::memory::{InMemoryTokenLedger, InMemoryUserDirectory};

pub const ALICE_EMAIL: &str = "alice@example.com";
pub const ALICE_PASSWORD: &str = "secret123";

pub fn auth_config() -> AuthConfig {
    AuthConfig {
        secret: "integration-test-secret".to_string(),
        access_ttl_seconds: 900,
        refresh_ttl_seconds: 604_800,
        ..AuthConfig::default()
    }
}

pub fn memory_cache() -> Arc<MemoryCacheProvider> {
    Arc::new(MemoryCacheProvider::new(&MemoryCacheConfig {
        max_capacity: 10_000,
    }))
}

/// Sign a refresh token with arbitrary `jti` and `exp`, using the same
/// secret as [`auth_config`].
pub fn sign_refresh_token(subject: Uuid, token_id: Uuid, expires_at: DateTime<Utc>) -> String {
    let claims = json!({
        "sub": subject.to_string(),
        "iat": Utc::now().timestamp(),
        "exp": expires_at.timestamp(),
        "type": "refresh",
        "jti": token_id.to_string(),
    });
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(auth_config().secret.as_bytes()),
    )
    .unwrap()
}

/// A session manager wired to in-memory stores, with handles kept for
/// inspection.
pub struct TestSession {
    pub manager: SessionManager,
    pub users: InMemoryUserDirectory,
    pub ledger: InMemoryTokenLedger,
}

impl TestSession {
    pub fn new() -> Self {
        Self::with_cache(memory_cache())
    }

    pub fn with_cache(cache: Arc<dyn CacheProvider>) -> Self {
        let users = InMemoryUserDirectory::new();
        let ledger = InMemoryTokenLedger::new();
        let manager = SessionManager::new(
            &auth_config(),
            Arc::new(users.clone()),
            Arc::new(ledger.clone()),
            cache,
        );
        Self {
            manager,
            users,
            ledger,
        }
    }
}

/// Caps every TTL written through it.
#[derive(Debug)]
pub struct ClampedTtlCache {
    inner: MemoryCacheProvider,
    max_ttl: Duration,
}

impl ClampedTtlCache {
    pub fn new(max_ttl: Duration) -> Self {
        Self {
            inner: MemoryCacheProvider::new(&MemoryCacheConfig { max_capacity: 100 }),
            max_ttl,
        }
    }
}

#[async_trait]
impl CacheProvider for ClampedTtlCache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.inner.set(key, value, ttl.min(self.max_ttl)).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }

    async fn close(&self) -> AppResult<()> {
        self.inner.close().await
    }
}

/// A cache that can be switched into an outage.
#[derive(Debug)]
pub struct FlakyCache {
    inner: Option<MemoryCacheProvider>,
    down: AtomicBool,
}

impl FlakyCache {
    pub fn new() -> Self {
        Self {
            inner: Some(MemoryCacheProvider::new(&MemoryCacheConfig { max_capacity: 100 })),
            down: AtomicBool::new(false),
        }
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    fn backend(&self) -> AppResult<&MemoryCacheProvider> {
        match &self.inner {
            Some(inner) if !self.down.load(Ordering::SeqCst) => Ok(inner),
            _ => Err(AppError::cache("connection refused")),
        }
    }
}

#[async_trait]
impl CacheProvider for FlakyCache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.backend()?.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.backend()?.set(key, value, ttl).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(self.backend().is_ok())
    }

    async fn close(&self) -> AppResult<()> {
        Ok(())
    }
}
