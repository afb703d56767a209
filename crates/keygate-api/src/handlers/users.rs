//! User handlers.

use axum::Json;
use axum::extract::State;

use crate::dto::response::UserRead;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/v1/users/me
pub async fn me(auth: AuthUser) -> Json<UserRead> {
    Json(auth.0.into())
}

/// GET /api/v1/users
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<UserRead>>, ApiError> {
    let users = state.sessions.list_users(&auth).await?;
    Ok(Json(users.into_iter().map(UserRead::from).collect()))
}
