//! Durable stores behind the session layer.
//!
//! Each store is an async trait so the session orchestrator can run
//! against PostgreSQL in production and in-memory doubles in tests.

pub mod refresh_token;
pub mod user;

pub use refresh_token::{NewRefreshToken, RefreshTokenRepository, TokenLedger};
pub use user::{UserDirectory, UserRepository};

use keygate_core::error::{AppError, ErrorKind};

/// Map a sqlx error, surfacing unique-constraint violations as conflicts.
pub(crate) fn map_db_error(context: &'static str, err: sqlx::Error) -> AppError {
    let unique = err
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation());
    if unique {
        AppError::with_source(ErrorKind::Conflict, context, err)
    } else {
        AppError::with_source(ErrorKind::Database, context, err)
    }
}
