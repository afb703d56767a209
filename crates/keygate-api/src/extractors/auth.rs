//! `AuthUser` extractor: resolves the bearer token into the calling user.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use keygate_entity::user::User;

use crate::error::ApiError;
use crate::state::AppState;

/// The resolved, active user behind the request's access token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl std::ops::Deref for AuthUser {
    type Target = User;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token);

        let user = state.sessions.resolve(token).await?;
        Ok(AuthUser(user))
    }
}

/// The credentials of a `Bearer` authorization header. The scheme is
/// matched case-insensitively; any other scheme yields `None`.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, credentials) = header.split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then_some(credentials.trim())
}
