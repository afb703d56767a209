//! Error taxonomy for authentication and session operations.

use thiserror::Error;

use keygate_core::error::AppError;

/// Broad grouping of [`AuthError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The request conflicts with existing state or is malformed.
    Validation,
    /// The caller could not be authenticated.
    Token,
    /// The caller is authenticated but not permitted.
    Authorization,
    /// A referenced record does not exist.
    NotFound,
    /// A backing store failed.
    Infrastructure,
}

/// Every failure the session layer can report.
///
/// `InvalidCredentials` is returned for both an unknown email and a wrong
/// password so callers cannot tell the two apart.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User with this email already exists")]
    EmailTaken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Malformed token")]
    MalformedToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Wrong token type")]
    WrongTokenType,

    #[error("Refresh token revoked")]
    TokenRevoked,

    #[error("User not found")]
    UserNotFound,

    #[error("Missing credentials")]
    MissingCredentials,

    /// The access token verified but is absent from the cache.
    #[error("Token expired")]
    NotCached,

    #[error("Inactive user")]
    InactiveUser,

    #[error("Not enough privileges")]
    Forbidden,

    #[error("Conflicting record")]
    Conflict,

    #[error("Infrastructure failure: {0}")]
    Infrastructure(AppError),
}

impl AuthError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::EmailTaken | Self::Conflict => ErrorCategory::Validation,
            Self::InvalidCredentials
            | Self::InvalidToken
            | Self::MalformedToken
            | Self::TokenExpired
            | Self::WrongTokenType
            | Self::TokenRevoked
            | Self::MissingCredentials
            | Self::NotCached
            | Self::InactiveUser => ErrorCategory::Token,
            Self::Forbidden => ErrorCategory::Authorization,
            Self::UserNotFound => ErrorCategory::NotFound,
            Self::Infrastructure(_) => ErrorCategory::Infrastructure,
        }
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        if err.is_conflict() {
            Self::Conflict
        } else {
            Self::Infrastructure(err)
        }
    }
}
