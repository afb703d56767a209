//! Bearer token to user identity.

use tracing::debug;

use keygate_database::UserDirectory;
use keygate_entity::user::User;

use super::access_cache::AccessCache;
use crate::error::AuthError;
use crate::jwt::{JwtDecoder, TokenType};

/// Resolve the identity behind an access token.
///
/// The checks run in a fixed order: presence, signature and expiry, type,
/// cache liveness, then the user's active flag. A cache that cannot be
/// reached fails as [`AuthError::Infrastructure`], not as
/// [`AuthError::NotCached`].
pub async fn resolve_identity(
    bearer: Option<&str>,
    decoder: &JwtDecoder,
    access: &AccessCache,
    users: &dyn UserDirectory,
) -> Result<User, AuthError> {
    let token = bearer
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingCredentials)?;

    let claims = decoder.decode(token)?;
    if !claims.is_type(TokenType::Access) {
        return Err(AuthError::WrongTokenType);
    }

    let jti = claims.token_id()?;
    let subject = claims.subject()?;

    let cached_user = access.lookup(jti).await?.ok_or(AuthError::NotCached)?;
    if cached_user != subject {
        debug!(jti = %jti, "Access cache entry names a different subject");
        return Err(AuthError::InvalidToken);
    }

    match users.get_by_id(subject).await? {
        Some(user) if user.can_login() => Ok(user),
        _ => Err(AuthError::InactiveUser),
    }
}
