//! Authentication module for Stratagem

pub mod jwt;
pub mod middleware;
#[cfg(test)]
mod middleware_tests;
pub mod password;

pub use jwt::{Claims, JwtManager, TokenError};
pub use middleware::{require_auth, AuthPlayer, AuthState};
pub use password::{hash_password, verify_password};
