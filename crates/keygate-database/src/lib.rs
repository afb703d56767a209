//! # keygate-database
//!
//! PostgreSQL connection management, embedded migrations, and the two
//! durable stores used by the session layer: the [`UserDirectory`] and
//! the refresh [`TokenLedger`].

pub mod connection;
#[cfg(any(test, feature = "testing"))]
pub mod memory;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::{RefreshTokenRepository, TokenLedger, UserDirectory, UserRepository};
