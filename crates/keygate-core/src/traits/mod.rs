//! Core traits defined in `keygate-core` and implemented by other crates.

pub mod cache;

pub use cache::CacheProvider;
