//! Application state

use sqlx::PgPool;

use crate::{
    auth::{AuthState, JwtManager},
    config::Config,
    store::PlayerStore,
};

/// Shared application state. Cloned per request; everything inside is either
/// immutable after startup (config, signing keys) or internally synchronized
/// (the pool behind the store).
#[derive(Clone)]
pub struct AppState {
    pub store: PlayerStore,
    pub config: Config,
    pub jwt_manager: JwtManager,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config) -> Self {
        let jwt_manager = JwtManager::new(&config.jwt_secret, config.token_expiry_hours);
        Self {
            store: PlayerStore::new(pool),
            config,
            jwt_manager,
        }
    }

    /// State handed to the authorization middleware.
    pub fn auth_state(&self) -> AuthState {
        AuthState {
            jwt_manager: self.jwt_manager.clone(),
        }
    }
}
