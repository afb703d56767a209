//! In-memory store doubles for tests.
//!
//! Enabled with the `testing` feature. Both doubles honour the same
//! contracts as the PostgreSQL repositories, including email uniqueness
//! and single-winner revocation.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

use keygate_core::error::AppError;
use keygate_core::result::AppResult;
use keygate_entity::token::RefreshTokenRecord;
use keygate_entity::user::{CreateUser, User};

use crate::repositories::{NewRefreshToken, TokenLedger, UserDirectory};

/// [`UserDirectory`] backed by two concurrent maps.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserDirectory {
    users: Arc<DashMap<Uuid, User>>,
    by_email: Arc<DashMap<String, Uuid>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `f` to a stored user, e.g. to deactivate or promote it.
    pub fn update(&self, id: Uuid, f: impl FnOnce(&mut User)) -> bool {
        match self.users.get_mut(&id) {
            Some(mut user) => {
                f(&mut user);
                user.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let Some(id) = self.by_email.get(email).map(|id| *id) else {
            return Ok(None);
        };
        self.get_by_id(id).await
    }

    async fn create(&self, data: CreateUser) -> AppResult<User> {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: data.email,
            hashed_password: data.hashed_password,
            full_name: data.full_name,
            is_active: true,
            is_superuser: false,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };

        match self.by_email.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(AppError::conflict("Email already registered")),
            Entry::Vacant(slot) => {
                slot.insert(user.id);
                self.users.insert(user.id, user.clone());
                Ok(user)
            }
        }
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let mut users: Vec<User> = self.users.iter().map(|u| u.clone()).collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<Option<User>> {
        Ok(self.users.get_mut(&id).map(|mut user| {
            user.last_login_at = Some(at);
            user.updated_at = Utc::now();
            user.clone()
        }))
    }
}

/// [`TokenLedger`] keyed by token identifier.
#[derive(Debug, Default, Clone)]
pub struct InMemoryTokenLedger {
    records: Arc<DashMap<Uuid, RefreshTokenRecord>>,
}

impl InMemoryTokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a single record.
    pub fn record(&self, token_id: Uuid) -> Option<RefreshTokenRecord> {
        self.records.get(&token_id).map(|r| r.clone())
    }

    /// Snapshot of every record owned by `user_id`.
    pub fn records_for(&self, user_id: Uuid) -> Vec<RefreshTokenRecord> {
        self.records
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.clone())
            .collect()
    }

    fn insert(&self, token: NewRefreshToken) -> AppResult<RefreshTokenRecord> {
        let now = Utc::now();
        match self.records.entry(token.token_id) {
            Entry::Occupied(_) => Err(AppError::conflict("Duplicate refresh token id")),
            Entry::Vacant(slot) => {
                let record = RefreshTokenRecord {
                    id: Uuid::new_v4(),
                    token_id: token.token_id,
                    user_id: token.user_id,
                    revoked: false,
                    expires_at: token.expires_at,
                    created_at: now,
                    updated_at: now,
                };
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    /// Flip an active record to revoked under the shard lock.
    fn revoke_if_active(&self, token_id: Uuid, require_unexpired: bool) -> bool {
        let now = Utc::now();
        match self.records.get_mut(&token_id) {
            Some(mut record) => {
                let eligible = if require_unexpired {
                    record.is_active_at(now)
                } else {
                    !record.revoked
                };
                if eligible {
                    record.revoked = true;
                    record.updated_at = now;
                }
                eligible
            }
            None => false,
        }
    }
}

#[async_trait]
impl TokenLedger for InMemoryTokenLedger {
    async fn save(&self, token: NewRefreshToken) -> AppResult<RefreshTokenRecord> {
        self.insert(token)
    }

    async fn revoke(&self, token_id: Uuid) -> AppResult<bool> {
        Ok(self.revoke_if_active(token_id, false))
    }

    async fn is_active(&self, token_id: Uuid) -> AppResult<bool> {
        let now = Utc::now();
        Ok(self
            .records
            .get(&token_id)
            .is_some_and(|r| r.is_active_at(now)))
    }

    async fn rotate(
        &self,
        old_token_id: Uuid,
        replacement: NewRefreshToken,
    ) -> AppResult<Option<RefreshTokenRecord>> {
        if self.records.contains_key(&replacement.token_id) {
            return Err(AppError::conflict("Duplicate refresh token id"));
        }
        if !self.revoke_if_active(old_token_id, true) {
            return Ok(None);
        }
        self.insert(replacement).map(Some)
    }
}
