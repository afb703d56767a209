//! Refresh token ledger entities.

pub mod model;

pub use model::RefreshTokenRecord;
