//! Session lifecycle: register, login, refresh, logout.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{debug, info};
use uuid::Uuid;

use keygate_core::config::AuthConfig;
use keygate_core::error::AppError;
use keygate_core::traits::CacheProvider;
use keygate_database::repositories::NewRefreshToken;
use keygate_database::{TokenLedger, UserDirectory};
use keygate_entity::user::{CreateUser, User};

use super::access_cache::AccessCache;
use super::resolver::resolve_identity;
use crate::error::AuthError;
use crate::jwt::{IssuedToken, JwtDecoder, JwtEncoder, TokenIntrospection, TokenType};
use crate::password::PasswordHasher;

/// Hashed once and verified against when an email is unknown.
const DECOY_PASSWORD: &str = "keygate-decoy-password";

/// An access/refresh pair handed to a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Always `"bearer"`.
    pub token_type: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}

impl TokenPair {
    fn new(access: &IssuedToken, refresh: &IssuedToken) -> Self {
        Self {
            access_token: access.token.clone(),
            refresh_token: refresh.token.clone(),
            token_type: "bearer".to_string(),
            access_expires_at: access.expires_at,
            refresh_expires_at: refresh.expires_at,
        }
    }
}

/// Coordinates the user directory, refresh ledger, access cache and
/// token codec.
///
/// Durable writes always happen before the matching cache write, so a
/// cache failure can leave a usable refresh token behind but never a
/// cached access token without its ledger record.
#[derive(Clone)]
pub struct SessionManager {
    users: Arc<dyn UserDirectory>,
    ledger: Arc<dyn TokenLedger>,
    access_cache: AccessCache,
    jwt_encoder: Arc<JwtEncoder>,
    jwt_decoder: Arc<JwtDecoder>,
    password_hasher: PasswordHasher,
    decoy_hash: Arc<OnceCell<String>>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

impl SessionManager {
    pub fn new(
        config: &AuthConfig,
        users: Arc<dyn UserDirectory>,
        ledger: Arc<dyn TokenLedger>,
        cache: Arc<dyn CacheProvider>,
    ) -> Self {
        Self {
            users,
            ledger,
            access_cache: AccessCache::new(cache),
            jwt_encoder: Arc::new(JwtEncoder::new(config)),
            jwt_decoder: Arc::new(JwtDecoder::new(config)),
            password_hasher: PasswordHasher::new(),
            decoy_hash: Arc::new(OnceCell::new()),
            access_ttl: Duration::from_secs(config.access_ttl_seconds),
            refresh_ttl: Duration::from_secs(config.refresh_ttl_seconds),
        }
    }

    /// Create an account. Emails are unique and compared case-sensitively.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: Option<String>,
    ) -> Result<User, AuthError> {
        if self.users.get_by_email(email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let hashed_password = self.hash_password(password).await?;
        let created = self
            .users
            .create(CreateUser {
                email: email.to_string(),
                hashed_password,
                full_name,
            })
            .await;

        // A concurrent registration can win between the lookup and the insert.
        let user = match created {
            Ok(user) => user,
            Err(e) if e.is_conflict() => return Err(AuthError::EmailTaken),
            Err(e) => return Err(e.into()),
        };

        info!(user_id = %user.id, email = %user.email, "user.created");
        Ok(user)
    }

    /// Check credentials without issuing tokens.
    ///
    /// Returns `None` for an unknown email, an inactive account or a wrong
    /// password alike. Every path runs one password verification, against
    /// a decoy hash when the email is unknown. On success the last-login
    /// time is stamped.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, AuthError> {
        let user = self.users.get_by_email(email).await?;
        let stored_hash = match &user {
            Some(user) => user.hashed_password.clone(),
            None => self.decoy_hash().await?.to_string(),
        };
        let verified = self.verify_password(password, &stored_hash).await?;

        let Some(user) = user else {
            return Ok(None);
        };
        if !verified || !user.can_login() {
            return Ok(None);
        }

        Ok(self.users.record_login(user.id, Utc::now()).await?)
    }

    /// Authenticate and issue a fresh pair.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AuthError> {
        let user = self
            .authenticate(email, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let pair = self.issue_token_pair(&user).await?;
        info!(user_id = %user.id, "auth.login");
        Ok(pair)
    }

    /// Issue a pair for an already-authenticated user.
    ///
    /// The refresh record is committed before either cache entry is
    /// written.
    pub async fn issue_token_pair(&self, user: &User) -> Result<TokenPair, AuthError> {
        let (access, refresh) = self.mint(user.id)?;
        self.ledger
            .save(NewRefreshToken {
                user_id: user.id,
                token_id: refresh.id,
                expires_at: refresh.expires_at,
            })
            .await?;
        self.publish(user.id, &access, &refresh).await?;

        Ok(TokenPair::new(&access, &refresh))
    }

    /// Exchange a live refresh token for a new pair.
    ///
    /// The presented token is revoked and the replacement recorded in one
    /// ledger operation, so of two concurrent calls with the same token
    /// exactly one succeeds and the other fails with `TokenRevoked`.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self.jwt_decoder.decode(refresh_token)?;
        if !claims.is_type(TokenType::Refresh) {
            return Err(AuthError::WrongTokenType);
        }
        let old_token_id = claims.token_id()?;
        let user_id = claims.subject()?;

        if !self.ledger.is_active(old_token_id).await? {
            return Err(AuthError::TokenRevoked);
        }

        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let (access, refresh) = self.mint(user.id)?;
        let replacement = NewRefreshToken {
            user_id: user.id,
            token_id: refresh.id,
            expires_at: refresh.expires_at,
        };
        if self.ledger.rotate(old_token_id, replacement).await?.is_none() {
            return Err(AuthError::TokenRevoked);
        }
        self.publish(user.id, &access, &refresh).await?;

        info!(user_id = %user.id, old_token_id = %old_token_id, "auth.refresh");
        Ok(TokenPair::new(&access, &refresh))
    }

    /// Revoke a refresh token.
    ///
    /// Anything that is not a verifiable refresh token is ignored, and
    /// revoking an already revoked token is a no-op. The access token
    /// issued alongside stays valid until its cache entry lapses.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        let claims = match self.jwt_decoder.decode(refresh_token) {
            Ok(claims) => claims,
            Err(e) => {
                debug!(reason = %e, "Ignoring logout with unverifiable token");
                return Ok(());
            }
        };
        if !claims.is_type(TokenType::Refresh) {
            return Ok(());
        }
        let Ok(token_id) = claims.token_id() else {
            return Ok(());
        };

        if self.ledger.revoke(token_id).await? {
            info!(token_id = %token_id, "auth.logout");
        }
        Ok(())
    }

    /// Resolve a bearer access token to its user.
    pub async fn resolve(&self, bearer: Option<&str>) -> Result<User, AuthError> {
        resolve_identity(
            bearer,
            &self.jwt_decoder,
            &self.access_cache,
            self.users.as_ref(),
        )
        .await
    }

    /// Every user, newest first. Superusers only.
    pub async fn list_users(&self, identity: &User) -> Result<Vec<User>, AuthError> {
        if !identity.is_superuser {
            return Err(AuthError::Forbidden);
        }
        Ok(self.users.list().await?)
    }

    /// Verify any token and describe it.
    pub fn introspect(&self, token: &str) -> Result<TokenIntrospection, AuthError> {
        self.jwt_decoder.decode(token)?.introspect()
    }

    /// Release the cache handle.
    pub async fn shutdown(&self) -> Result<(), AuthError> {
        Ok(self.access_cache.clear().await?)
    }

    fn mint(&self, user_id: Uuid) -> Result<(IssuedToken, IssuedToken), AuthError> {
        let access = self
            .jwt_encoder
            .issue(user_id, TokenType::Access, self.access_ttl)?;
        let refresh = self
            .jwt_encoder
            .issue(user_id, TokenType::Refresh, self.refresh_ttl)?;
        Ok((access, refresh))
    }

    async fn publish(
        &self,
        user_id: Uuid,
        access: &IssuedToken,
        refresh: &IssuedToken,
    ) -> Result<(), AuthError> {
        self.access_cache
            .mark_valid(access.id, user_id, self.access_ttl)
            .await?;
        self.access_cache
            .mirror_refresh(refresh.id, user_id, self.refresh_ttl)
            .await?;
        Ok(())
    }

    async fn decoy_hash(&self) -> Result<&str, AuthError> {
        let hash = self
            .decoy_hash
            .get_or_try_init(|| self.hash_password(DECOY_PASSWORD))
            .await?;
        Ok(hash)
    }

    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let hasher = self.password_hasher.clone();
        let password = password.to_string();
        let hashed = tokio::task::spawn_blocking(move || hasher.hash_password(&password))
            .await
            .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))??;
        Ok(hashed)
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let hasher = self.password_hasher.clone();
        let password = password.to_string();
        let hash = hash.to_string();
        let verified =
            tokio::task::spawn_blocking(move || hasher.verify_password(&password, &hash))
                .await
                .map_err(|e| {
                    AppError::internal(format!("Password verification task failed: {e}"))
                })?;
        Ok(verified)
    }
}
