//! Signed token creation.

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use keygate_core::config::AuthConfig;
use keygate_core::error::AppError;

use super::algorithm;
use super::claims::{Claims, TokenType};

/// A freshly signed token and the identifiers it embeds.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Compact JWS string.
    pub token: String,
    /// The `jti` claim.
    pub id: Uuid,
    /// The `exp` claim.
    pub expires_at: DateTime<Utc>,
}

/// Signs access and refresh tokens with the configured shared secret.
#[derive(Clone)]
pub struct JwtEncoder {
    encoding_key: EncodingKey,
    header: Header,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("algorithm", &self.header.alg)
            .finish()
    }
}

impl JwtEncoder {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            header: Header::new(algorithm(config.algorithm)),
        }
    }

    /// Sign a token for `subject` that expires `ttl` from now.
    ///
    /// Every call draws a fresh random `jti`.
    pub fn issue(
        &self,
        subject: Uuid,
        token_type: TokenType,
        ttl: Duration,
    ) -> Result<IssuedToken, AppError> {
        let id = Uuid::new_v4();
        let issued_at = Utc::now().timestamp();
        let ttl_seconds = i64::try_from(ttl.as_secs())
            .map_err(|_| AppError::internal("Token lifetime out of range"))?;
        let exp = issued_at.saturating_add(ttl_seconds);
        let expires_at = DateTime::from_timestamp(exp, 0)
            .ok_or_else(|| AppError::internal("Token expiry out of range"))?;

        let claims = Claims {
            sub: Some(subject.to_string()),
            iat: issued_at,
            exp,
            token_type: Some(token_type.as_str().to_string()),
            jti: Some(id.to_string()),
        };

        let token = encode(&self.header, &claims, &self.encoding_key).map_err(|e| {
            AppError::internal(format!("Failed to encode {token_type} token: {e}"))
        })?;

        Ok(IssuedToken {
            token,
            id,
            expires_at,
        })
    }
}
