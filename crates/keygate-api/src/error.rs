//! Maps session errors to HTTP responses.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use keygate_auth::{AuthError, ErrorCategory};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Optional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Every failure a handler can return.
#[derive(Debug)]
pub enum ApiError {
    /// A session-layer failure.
    Auth(AuthError),
    /// The request body failed field validation.
    Validation(validator::ValidationErrors),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self::Auth(err)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err)
    }
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::Auth(AuthError::EmailTaken) => (StatusCode::BAD_REQUEST, "EMAIL_TAKEN"),
            Self::Auth(err) => match err.category() {
                ErrorCategory::Validation => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
                ErrorCategory::Token | ErrorCategory::NotFound => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED")
                }
                ErrorCategory::Authorization => (StatusCode::FORBIDDEN, "FORBIDDEN"),
                ErrorCategory::Infrastructure => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();

        let (message, details) = match self {
            Self::Validation(errors) => (
                "Request validation failed".to_string(),
                serde_json::to_value(&errors).ok(),
            ),
            Self::Auth(AuthError::Infrastructure(err)) => {
                tracing::error!(error = %err, kind = %err.kind, "Internal server error");
                ("Internal server error".to_string(), None)
            }
            Self::Auth(err) => (err.to_string(), None),
        };

        let body = ApiErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        };

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
