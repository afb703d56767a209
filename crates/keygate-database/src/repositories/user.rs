//! User directory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use keygate_core::result::AppResult;
use keygate_entity::user::{CreateUser, User};

use super::map_db_error;

/// Durable store of user identity and credential hash.
#[async_trait]
pub trait UserDirectory: Send + Sync + std::fmt::Debug {
    /// Find a user by primary key.
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find a user by exact (case-sensitive) email.
    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Insert a new user. Fails with a `Conflict` error if the email is taken.
    async fn create(&self, data: CreateUser) -> AppResult<User>;

    /// All users, newest first.
    async fn list(&self) -> AppResult<Vec<User>>;

    /// Stamp the last successful login and return the updated row.
    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<Option<User>>;
}

/// PostgreSQL-backed [`UserDirectory`].
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for UserRepository {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to find user by id", e))
    }

    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to find user by email", e))
    }

    async fn create(&self, data: CreateUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email, hashed_password, full_name) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&data.email)
        .bind(&data.hashed_password)
        .bind(&data.full_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to create user", e))
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to list users", e))
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET last_login_at = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to update last login", e))
    }
}
