//! Token signing and lifetime configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Shared-secret signature algorithms accepted for bearer tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SigningAlgorithm {
    /// HMAC with SHA-256.
    #[default]
    #[serde(rename = "HS256")]
    Hs256,
    /// HMAC with SHA-384.
    #[serde(rename = "HS384")]
    Hs384,
    /// HMAC with SHA-512.
    #[serde(rename = "HS512")]
    Hs512,
}

/// Authentication and token configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared secret used to sign and verify tokens.
    #[serde(default = "default_secret")]
    pub secret: String,
    /// Signature algorithm.
    #[serde(default)]
    pub algorithm: SigningAlgorithm,
    /// Access token validity window in seconds.
    #[serde(default = "default_access_ttl", alias = "accessTtlSeconds")]
    pub access_ttl_seconds: u64,
    /// Refresh token validity window in seconds.
    #[serde(default = "default_refresh_ttl", alias = "refreshTtlSeconds")]
    pub refresh_ttl_seconds: u64,
    /// Clock-skew tolerance applied when checking `exp`.
    #[serde(default)]
    pub leeway_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: default_secret(),
            algorithm: SigningAlgorithm::default(),
            access_ttl_seconds: default_access_ttl(),
            refresh_ttl_seconds: default_refresh_ttl(),
            leeway_seconds: 0,
        }
    }
}

impl AuthConfig {
    /// Whether the shipped placeholder secret is still in use.
    pub fn uses_default_secret(&self) -> bool {
        self.secret == default_secret()
    }

    pub(crate) fn validate(&self) -> Result<(), AppError> {
        if self.secret.is_empty() {
            return Err(AppError::configuration("auth.secret must not be empty"));
        }
        if self.access_ttl_seconds == 0 {
            return Err(AppError::configuration(
                "auth.access_ttl_seconds must be greater than zero",
            ));
        }
        if self.refresh_ttl_seconds <= self.access_ttl_seconds {
            return Err(AppError::configuration(
                "auth.refresh_ttl_seconds must exceed auth.access_ttl_seconds",
            ));
        }
        // Access TTLs are strictly smaller, so this bounds both.
        if self.refresh_ttl_seconds > MAX_TOKEN_TTL_SECONDS {
            return Err(AppError::configuration(format!(
                "auth.refresh_ttl_seconds must not exceed {MAX_TOKEN_TTL_SECONDS}"
            )));
        }
        Ok(())
    }
}

/// Ten years. Longer lifetimes overflow expiry timestamps and cache TTLs.
pub const MAX_TOKEN_TTL_SECONDS: u64 = 10 * 365 * 24 * 60 * 60;

fn default_secret() -> String {
    "change-me".to_string()
}

fn default_access_ttl() -> u64 {
    900
}

fn default_refresh_ttl() -> u64 {
    604_800
}
