//! # keygate-api
//!
//! HTTP surface for Keygate built on Axum.
//!
//! Exposes registration, login, refresh and logout under `/api/v1/auth`,
//! bearer-authenticated user endpoints under `/api/v1/users`, and
//! liveness/readiness probes. Every auth failure is mapped to a status
//! code in [`error`].

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, serve, shutdown_signal};
pub use error::ApiError;
pub use state::{AppState, HealthProbe};
