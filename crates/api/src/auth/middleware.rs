//! Authorization middleware for protected routes

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use super::jwt::{Claims, JwtManager};
use crate::error::ApiError;

/// State needed to authenticate a request.
#[derive(Clone)]
pub struct AuthState {
    pub jwt_manager: JwtManager,
}

/// Identity attached to the request after successful token verification.
/// Owned by the in-flight request; downstream handlers read it from the
/// request extensions and must treat its absence as an error, never as an
/// anonymous caller.
#[derive(Debug, Clone)]
pub struct AuthPlayer {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub photo_profile: String,
    pub role: String,
    pub data: serde_json::Value,
}

/// Extracts the identity attached by `require_auth`. Absence means the
/// route was wired without the middleware; that is reported as its own
/// unauthorized error, never as an anonymous request.
impl<S> FromRequestParts<S> for AuthPlayer
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthPlayer>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Failed to resolve authenticated player"))
    }
}

impl From<Claims> for AuthPlayer {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username,
            email: claims.email,
            photo_profile: claims.photo_profile,
            role: claims.role,
            data: claims.data,
        }
    }
}

fn bearer_token(request: &Request) -> Result<&str, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized("Authorization header is missing"))?;

    // A present header that is not UTF-8 is a bad token, not a missing
    // header.
    match header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
    {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(ApiError::unauthorized("Authorization token is missing")),
    }
}

/// Middleware that requires a valid session token. On success the verified
/// identity is attached to the request and the wrapped handler runs; on any
/// failure the handler is never invoked.
pub async fn require_auth(
    State(auth_state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match bearer_token(&request) {
        Ok(token) => token,
        Err(err) => return err.into_response(),
    };

    match auth_state.jwt_manager.verify(token) {
        Ok(claims) => {
            request.extensions_mut().insert(AuthPlayer::from(claims));
            next.run(request).await
        }
        Err(err) => {
            // Which check failed stays internal; clients see one generic
            // rejection regardless.
            tracing::warn!(path = %request.uri().path(), error = %err, "token verification failed");
            ApiError::unauthorized("Invalid token").into_response()
        }
    }
}
