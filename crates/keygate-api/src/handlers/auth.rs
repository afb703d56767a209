//! Auth handlers: register, login, refresh, logout.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use validator::Validate;

use crate::dto::request::{LoginRequest, RefreshRequest, RegisterRequest};
use crate::dto::response::{MessageResponse, TokenResponse, UserRead};
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserRead>), ApiError> {
    req.validate()?;

    let user = state
        .sessions
        .register(&req.email, &req.password, req.full_name)
        .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    req.validate()?;

    let pair = state.sessions.login(&req.email, &req.password).await?;
    Ok(Json(pair.into()))
}

/// POST /api/v1/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let pair = state.sessions.refresh(&req.refresh_token).await?;
    Ok(Json(pair.into()))
}

/// POST /api/v1/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    state.sessions.logout(&req.refresh_token).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse {
            message: "Logged out".to_string(),
        }),
    ))
}
