//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use keygate_entity::user::model::EMAIL_MAX_LENGTH;

/// Registration request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        email(message = "Must be a valid email address"),
        length(max = EMAIL_MAX_LENGTH, message = "Email is too long")
    )]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    pub full_name: Option<String>,
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(
        email(message = "Must be a valid email address"),
        length(max = EMAIL_MAX_LENGTH, message = "Email is too long")
    )]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Body of refresh and logout requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}
