//! Unit tests for the authorization middleware
//!
//! Exercises the middleware through a real router so the full
//! header-extraction, verification, and identity-propagation path runs.

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        middleware,
        routing::put,
        Router,
    };
    use serde_json::json;
    use time::OffsetDateTime;
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::auth::middleware::{require_auth, AuthPlayer, AuthState};
    use crate::auth::JwtManager;
    use crate::models::{Player, DEFAULT_PHOTO_PROFILE, DEFAULT_ROLE};

    fn test_player(username: &str) -> Player {
        let now = OffsetDateTime::now_utc();
        Player {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "$argon2id$not-a-real-hash".to_string(),
            photo_profile: DEFAULT_PHOTO_PROFILE.to_string(),
            role: DEFAULT_ROLE.to_string(),
            data: json!({}),
            created_at: now,
            updated_at: now,
        }
    }

    /// Echoes the propagated identity into a response header.
    async fn echo_identity(player: AuthPlayer) -> impl axum::response::IntoResponse {
        ([("x-username", player.username)], "ok")
    }

    fn app(jwt_manager: JwtManager) -> Router {
        Router::new().route(
            "/players/{username}/edit",
            put(echo_identity)
                .layer(middleware::from_fn_with_state(AuthState { jwt_manager }, require_auth)),
        )
    }

    fn request(auth_header: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("PUT")
            .uri("/players/alice1/edit");
        if let Some(value) = auth_header {
            builder = builder.header("Authorization", value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn missing_header_is_rejected() {
        let app = app(JwtManager::new("test-secret", 24));
        let response = app.oneshot(request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn empty_bearer_token_is_rejected() {
        let app = app(JwtManager::new("test-secret", 24));
        let response = app.oneshot(request(Some("Bearer "))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_rejected() {
        let app = app(JwtManager::new("test-secret", 24));
        let response = app.oneshot(request(Some("Token abc"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn non_utf8_header_is_a_token_error_not_a_missing_header() {
        let app = app(JwtManager::new("test-secret", 24));
        let mut req = request(None);
        req.headers_mut().insert(
            "Authorization",
            axum::http::HeaderValue::from_bytes(b"Bearer \xff\xfe").unwrap(),
        );

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("Authorization token is missing"));
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let app = app(JwtManager::new("test-secret", 24));
        let response = app
            .oneshot(request(Some("Bearer not-a-token")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn token_signed_with_another_secret_is_rejected() {
        let other = JwtManager::new("other-secret", 24);
        let token = other.sign(&test_player("alice1")).unwrap();

        let app = app(JwtManager::new("test-secret", 24));
        let response = app
            .oneshot(request(Some(&format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn identity_extractor_rejects_routes_wired_without_the_middleware() {
        // Same handler, no require_auth layer: the AuthPlayer extractor must
        // refuse rather than treat the caller as anonymous.
        let app = Router::new().route("/players/{username}/edit", put(echo_identity));
        let response = app.oneshot(request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn valid_token_reaches_the_handler_with_its_identity() {
        let jwt_manager = JwtManager::new("test-secret", 24);
        let token = jwt_manager.sign(&test_player("alice1")).unwrap();

        let app = app(jwt_manager);
        let response = app
            .oneshot(request(Some(&format!("Bearer {token}"))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-username"], "alice1");
    }
}
