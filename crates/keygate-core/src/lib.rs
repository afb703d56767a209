//! # keygate-core
//!
//! Core crate for Keygate. Contains configuration schemas, the unified
//! error system, and the cache provider trait implemented by
//! `keygate-cache`.
//!
//! This crate has **no** internal dependencies on other Keygate crates.

pub mod config;
pub mod error;
pub mod redact;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
