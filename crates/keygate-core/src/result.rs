//! Convenience result type alias for Keygate.

use crate::error::AppError;

/// A specialized `Result` type for Keygate infrastructure operations.
pub type AppResult<T> = Result<T, AppError>;
