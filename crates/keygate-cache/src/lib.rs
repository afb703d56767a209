//! # keygate-cache
//!
//! Cache provider implementations for Keygate. Supports two modes:
//!
//! - **redis**: Redis-backed cache using the [redis](https://crates.io/crates/redis) crate
//! - **memory**: In-process cache using [moka](https://crates.io/crates/moka),
//!   honouring per-entry TTLs
//!
//! The provider is selected at runtime based on configuration.

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use provider::CacheManager;
