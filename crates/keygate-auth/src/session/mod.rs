//! Session orchestration and identity resolution.

pub mod access_cache;
pub mod manager;
pub mod resolver;

pub use access_cache::AccessCache;
pub use manager::{SessionManager, TokenPair};
pub use resolver::resolve_identity;
