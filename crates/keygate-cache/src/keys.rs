//! Cache key builders.
//!
//! Centralising key construction keeps the wire layout of the volatile
//! store in one place.

use uuid::Uuid;

/// Key marking an access token identifier as currently valid.
pub fn access_token(jti: Uuid) -> String {
    format!("access:{jti}")
}

/// Informational mirror of an issued refresh token identifier.
pub fn refresh_token(jti: Uuid) -> String {
    format!("refresh:{jti}")
}
