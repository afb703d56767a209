//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Maximum length of an email address, in characters.
pub const EMAIL_MAX_LENGTH: u64 = 320;

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Unique, case-sensitive email address.
    pub email: String,
    /// Salted one-way password hash.
    #[serde(skip_serializing)]
    pub hashed_password: String,
    /// Human-readable name.
    pub full_name: Option<String>,
    /// Inactive users cannot log in or resolve tokens.
    pub is_active: bool,
    /// Superusers may list every account.
    pub is_superuser: bool,
    /// Last successful login time.
    pub last_login_at: Option<DateTime<Utc>>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check if the user can log in or act on a resolved token.
    pub fn can_login(&self) -> bool {
        self.is_active
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Email address.
    pub email: String,
    /// Pre-hashed password.
    pub hashed_password: String,
    /// Full name (optional).
    pub full_name: Option<String>,
}
