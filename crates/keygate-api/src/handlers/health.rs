//! Health check handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::warn;

use crate::dto::response::{HealthResponse, MessageResponse};
use crate::state::AppState;

/// GET /
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: format!("Keygate API v{}", env!("CARGO_PKG_VERSION")),
    })
}

/// GET /api/v1/health/live
pub async fn live() -> Json<HealthResponse> {
    Json(HealthResponse::status("alive"))
}

/// GET /api/v1/health/ready
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let mut failing = Vec::new();
    for probe in state.probes.iter() {
        if !probe.is_healthy().await {
            warn!(dependency = probe.name(), "Readiness check failed");
            failing.push(probe.name().to_string());
        }
    }

    if failing.is_empty() {
        (StatusCode::OK, Json(HealthResponse::status("ready")))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unavailable".to_string(),
                failing,
            }),
        )
    }
}
