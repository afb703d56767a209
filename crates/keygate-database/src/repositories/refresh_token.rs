//! Refresh token ledger.
//!
//! The ledger is the only authority on refresh-token liveness. Every
//! state change is a single conditional statement so concurrent callers
//! racing on the same token identifier observe exactly one winner.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use keygate_core::result::AppResult;
use keygate_entity::token::RefreshTokenRecord;

use super::map_db_error;

/// A refresh token about to be recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewRefreshToken {
    /// Owning user.
    pub user_id: Uuid,
    /// The token's `jti`.
    pub token_id: Uuid,
    /// The token's `exp`.
    pub expires_at: DateTime<Utc>,
}

/// Durable record of issued refresh tokens.
#[async_trait]
pub trait TokenLedger: Send + Sync + std::fmt::Debug {
    /// Insert a new active record. A duplicate `token_id` fails with `Conflict`.
    async fn save(&self, token: NewRefreshToken) -> AppResult<RefreshTokenRecord>;

    /// Mark the record revoked. Idempotent: returns `true` only for the
    /// call that flipped an active record, `false` if it was already
    /// revoked or never existed.
    async fn revoke(&self, token_id: Uuid) -> AppResult<bool>;

    /// True iff a record exists, is not revoked, and has not expired.
    async fn is_active(&self, token_id: Uuid) -> AppResult<bool>;

    /// Revoke `old_token_id` and record `replacement` as one unit.
    ///
    /// Returns `None` without writing anything if `old_token_id` was not
    /// active at the moment of the conditional update, which is how a
    /// losing concurrent rotation learns it lost.
    async fn rotate(
        &self,
        old_token_id: Uuid,
        replacement: NewRefreshToken,
    ) -> AppResult<Option<RefreshTokenRecord>>;
}

/// PostgreSQL-backed [`TokenLedger`].
#[derive(Debug, Clone)]
pub struct RefreshTokenRepository {
    pool: PgPool,
}

impl RefreshTokenRepository {
    /// Create a new ledger over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const INSERT_SQL: &str = "INSERT INTO refresh_tokens (id, token_id, user_id, expires_at) \
                          VALUES ($1, $2, $3, $4) RETURNING *";

const REVOKE_SQL: &str = "UPDATE refresh_tokens SET revoked = TRUE, updated_at = NOW() \
                          WHERE token_id = $1 AND revoked = FALSE";

#[async_trait]
impl TokenLedger for RefreshTokenRepository {
    async fn save(&self, token: NewRefreshToken) -> AppResult<RefreshTokenRecord> {
        sqlx::query_as::<_, RefreshTokenRecord>(INSERT_SQL)
            .bind(Uuid::new_v4())
            .bind(token.token_id)
            .bind(token.user_id)
            .bind(token.expires_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to save refresh token", e))
    }

    async fn revoke(&self, token_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(REVOKE_SQL)
            .bind(token_id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to revoke refresh token", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn is_active(&self, token_id: Uuid) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM refresh_tokens \
             WHERE token_id = $1 AND revoked = FALSE AND expires_at > NOW())",
        )
        .bind(token_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to check refresh token", e))
    }

    async fn rotate(
        &self,
        old_token_id: Uuid,
        replacement: NewRefreshToken,
    ) -> AppResult<Option<RefreshTokenRecord>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_error("Failed to begin rotation", e))?;

        let revoked = sqlx::query(
            "UPDATE refresh_tokens SET revoked = TRUE, updated_at = NOW() \
             WHERE token_id = $1 AND revoked = FALSE AND expires_at > NOW()",
        )
        .bind(old_token_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_db_error("Failed to revoke refresh token", e))?;

        if revoked.rows_affected() == 0 {
            debug!(token_id = %old_token_id, "Rotation lost: token no longer active");
            tx.rollback()
                .await
                .map_err(|e| map_db_error("Failed to roll back rotation", e))?;
            return Ok(None);
        }

        let record = sqlx::query_as::<_, RefreshTokenRecord>(INSERT_SQL)
            .bind(Uuid::new_v4())
            .bind(replacement.token_id)
            .bind(replacement.user_id)
            .bind(replacement.expires_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_db_error("Failed to save refresh token", e))?;

        tx.commit()
            .await
            .map_err(|e| map_db_error("Failed to commit rotation", e))?;

        Ok(Some(record))
    }
}
