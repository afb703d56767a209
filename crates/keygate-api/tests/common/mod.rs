//! Test harness driving the router in-process.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Request, StatusCode, header};
use tower::ServiceExt;

use keygate_api::{AppState, HealthProbe, build_app};
use keygate_auth::SessionManager;
use keygate_cache::CacheManager;
use keygate_cache::memory::MemoryCacheProvider;
use keygate_core::config::{AppConfig, MemoryCacheConfig};
use keygate_database::memory::{InMemoryTokenLedger, InMemoryUserDirectory};

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

/// A probe with a fixed answer.
#[derive(Debug)]
pub struct StaticProbe {
    pub name: &'static str,
    pub healthy: bool,
}

#[async_trait]
impl HealthProbe for StaticProbe {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn is_healthy(&self) -> bool {
        self.healthy
    }
}

pub struct TestApp {
    pub router: Router,
    pub users: InMemoryUserDirectory,
    pub ledger: InMemoryTokenLedger,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_database_healthy(true).await
    }

    pub async fn with_database_healthy(healthy: bool) -> Self {
        let config = AppConfig::from_toml_str(
            r#"
            [database]
            url = "postgres://unused"

            [auth]
            secret = "api-test-secret"
            "#,
        )
        .unwrap();

        let users = InMemoryUserDirectory::new();
        let ledger = InMemoryTokenLedger::new();
        let cache = CacheManager::from_provider(Arc::new(MemoryCacheProvider::new(
            &MemoryCacheConfig { max_capacity: 1000 },
        )));

        let sessions = SessionManager::new(
            &config.auth,
            Arc::new(users.clone()),
            Arc::new(ledger.clone()),
            Arc::new(cache.clone()),
        );

        let probes: Vec<Arc<dyn HealthProbe>> = vec![
            Arc::new(StaticProbe {
                name: "database",
                healthy,
            }),
            Arc::new(cache),
        ];

        let state = AppState::new(Arc::new(config), Arc::new(sessions), probes);

        Self {
            router: build_app(state),
            users,
            ledger,
        }
    }

    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<serde_json::Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Register and log in, returning the token response body.
    pub async fn signed_in(&self, email: &str, password: &str) -> serde_json::Value {
        let response = self
            .request(
                "POST",
                "/api/v1/auth/register",
                Some(serde_json::json!({ "email": email, "password": password })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);

        let response = self
            .request(
                "POST",
                "/api/v1/auth/login",
                Some(serde_json::json!({ "email": email, "password": password })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
        response.body
    }
}
