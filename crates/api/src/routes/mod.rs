//! HTTP routes

pub mod players;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{auth::require_auth, state::AppState};

async fn welcome() -> &'static str {
    "Welcome to the Stratagem backend"
}

pub fn create_router(state: AppState) -> Router {
    let auth_state = state.auth_state();

    Router::new()
        .route("/", get(welcome))
        .route("/players/register", post(players::register))
        .route("/players/login", post(players::login))
        .route(
            "/players/{username}/edit",
            put(players::edit).layer(middleware::from_fn_with_state(auth_state, require_auth)),
        )
        .with_state(state)
}
