//! # keygate-entity
//!
//! Domain entity models for Keygate. Every struct in this crate
//! represents a database table row or the input used to create one.
//! Row types derive `sqlx::FromRow` in addition to serde.

pub mod token;
pub mod user;
