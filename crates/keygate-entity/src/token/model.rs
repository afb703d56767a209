//! Refresh token ledger row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A durable record of one issued refresh token.
///
/// `token_id` equals the `jti` claim of the issued token. A record is
/// created active, revoked at most once, and never reactivated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RefreshTokenRecord {
    /// Internal row identifier.
    pub id: Uuid,
    /// Globally unique token identifier.
    pub token_id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Set once the token has been rotated or logged out.
    pub revoked: bool,
    /// Hard expiry of the token.
    pub expires_at: DateTime<Utc>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    /// Not revoked and not yet expired at `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && self.expires_at > now
    }
}
