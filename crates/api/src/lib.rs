// Test code patterns:
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Stratagem API Library
//!
//! Token-based authentication and authorization for the Stratagem game
//! backend: player registration, login with signed session tokens, and the
//! authorization middleware protecting player-owned routes.

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use state::AppState;
