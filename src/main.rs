//! Keygate Server: token-based authentication service.
//!
//! Main entry point that wires the stores, the session orchestrator and
//! the HTTP surface together and runs until a shutdown signal arrives.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt};

use keygate_api::{AppState, HealthProbe, build_app, serve, shutdown_signal};
use keygate_auth::SessionManager;
use keygate_cache::CacheManager;
use keygate_core::config::AppConfig;
use keygate_database::{DatabasePool, RefreshTokenRepository, UserRepository};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e:#}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %format!("{e:#}"), "Server error");
        std::process::exit(1);
    }
}

/// Load layered configuration for `KEYGATE_ENV` (default `development`).
fn load_configuration() -> anyhow::Result<AppConfig> {
    let env = std::env::var("KEYGATE_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env).with_context(|| format!("loading configuration for '{env}'"))
}

/// Initialize tracing. `RUST_LOG` overrides the configured level.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting Keygate");

    if config.auth.uses_default_secret() {
        tracing::warn!("auth.secret is the shipped default; set KEYGATE__AUTH__SECRET");
    }

    let database = DatabasePool::connect(&config.database)
        .await
        .context("connecting to database")?;

    if config.database.run_migrations {
        keygate_database::migration::run_migrations(database.pool())
            .await
            .context("running migrations")?;
    }

    let cache = CacheManager::new(&config.cache)
        .await
        .context("initializing cache")?;

    let sessions = Arc::new(SessionManager::new(
        &config.auth,
        Arc::new(UserRepository::new(database.pool().clone())),
        Arc::new(RefreshTokenRepository::new(database.pool().clone())),
        Arc::new(cache.clone()),
    ));

    let probes: Vec<Arc<dyn HealthProbe>> =
        vec![Arc::new(database.clone()), Arc::new(cache.clone())];

    let config = Arc::new(config);
    let state = AppState::new(Arc::clone(&config), Arc::clone(&sessions), probes);
    let app = build_app(state);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(address = %addr, "Keygate listening");

    let served = serve(
        listener,
        app,
        shutdown_signal(),
        Duration::from_secs(config.server.shutdown_grace_seconds),
    )
    .await;

    // Release both store handles whether or not the server exited cleanly.
    if let Err(e) = sessions.shutdown().await {
        tracing::warn!(error = %e, "Failed to release cache");
    }
    database.close().await;
    tracing::info!("Keygate stopped");

    served.context("serving HTTP")
}
