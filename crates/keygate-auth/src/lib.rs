//! # keygate-auth
//!
//! Token issuance and verification, password hashing, and the session
//! orchestrator that ties the durable stores to the access cache.
//!
//! ## Modules
//!
//! - `jwt`: signed access/refresh tokens and their claims
//! - `password`: Argon2id credential hashing
//! - `session`: register, login, refresh, logout and identity resolution
//! - `error`: the [`AuthError`] taxonomy returned by every operation

pub mod error;
pub mod jwt;
pub mod password;
pub mod session;

pub use error::{AuthError, ErrorCategory};
pub use jwt::{Claims, IssuedToken, JwtDecoder, JwtEncoder, TokenIntrospection, TokenType};
pub use password::PasswordHasher;
pub use session::{AccessCache, SessionManager, TokenPair};
