//! JWT claims carried by access and refresh tokens.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuthError;

/// Distinguishes access tokens from refresh tokens.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Short-lived token presented on every request.
    Access,
    /// Long-lived token exchanged for a new pair.
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "access" => Some(Self::Access),
            "refresh" => Some(Self::Refresh),
            _ => None,
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claims payload as it appears on the wire.
///
/// `sub`, `type` and `jti` are optional at the serde level so a token that
/// verifies but omits them is reported as malformed by the accessors
/// rather than failing inside the decoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiry, seconds since epoch.
    pub exp: i64,
    /// `"access"` or `"refresh"`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Unique token identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

impl Claims {
    /// Whether the `type` claim names exactly `expected`.
    pub fn is_type(&self, expected: TokenType) -> bool {
        self.token_type.as_deref() == Some(expected.as_str())
    }

    /// The subject as a user ID.
    pub fn subject(&self) -> Result<Uuid, AuthError> {
        parse_uuid(self.sub.as_deref())
    }

    /// The `jti` as a token identifier.
    pub fn token_id(&self) -> Result<Uuid, AuthError> {
        parse_uuid(self.jti.as_deref())
    }

    pub fn expires_at(&self) -> Result<DateTime<Utc>, AuthError> {
        DateTime::from_timestamp(self.exp, 0).ok_or(AuthError::MalformedToken)
    }

    /// Summarise the claims once all of them are present and well formed.
    pub fn introspect(&self) -> Result<TokenIntrospection, AuthError> {
        let token_type = self
            .token_type
            .as_deref()
            .and_then(TokenType::parse)
            .ok_or(AuthError::MalformedToken)?;

        Ok(TokenIntrospection {
            subject: self.subject()?,
            token_id: self.token_id()?,
            token_type,
            expires_at: self.expires_at()?,
        })
    }
}

fn parse_uuid(raw: Option<&str>) -> Result<Uuid, AuthError> {
    raw.and_then(|s| Uuid::parse_str(s).ok())
        .ok_or(AuthError::MalformedToken)
}

/// What a verified token says about itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenIntrospection {
    pub subject: Uuid,
    pub token_id: Uuid,
    pub token_type: TokenType,
    pub expires_at: DateTime<Utc>,
}
