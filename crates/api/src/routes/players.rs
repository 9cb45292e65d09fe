//! Player registration, login, and profile edit handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    auth::{hash_password, verify_password, AuthPlayer},
    error::{ApiError, ApiResult},
    models::{DEFAULT_PHOTO_PROFILE, DEFAULT_ROLE},
    state::AppState,
    store::{DuplicateField, NewPlayer, StoreError},
};

const MIN_USERNAME_LEN: usize = 4;
const MIN_PASSWORD_LEN: usize = 6;

const CREDENTIALS_INCORRECT: &str = "Username/email or password is incorrect";

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct EditRequest {
    pub username: Option<String>,
    pub photo_profile: Option<String>,
}

/// POST /players/register
///
/// Registration does not imply login: no token is returned.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    validate_registration(&req)?;

    let role = match req.role.as_deref() {
        Some(role) if !role.is_empty() => role,
        _ => DEFAULT_ROLE,
    };

    // Pre-checks give friendly errors for the common case. They race with
    // concurrent registrations; the table's unique constraints arbitrate.
    if state.store.find_by_username(&req.username).await?.is_some() {
        return Err(ApiError::conflict("Username is already taken"));
    }
    if state.store.find_by_email(&req.email).await?.is_some() {
        return Err(ApiError::conflict("Email is already registered"));
    }

    let password_hash = hash_password(&req.password)?;

    let new_player = NewPlayer {
        username: &req.username,
        email: &req.email,
        password_hash: &password_hash,
        photo_profile: DEFAULT_PHOTO_PROFILE,
        role,
        data: json!({}),
    };

    match state.store.insert(&new_player).await {
        Ok(_) => Ok((
            StatusCode::CREATED,
            Json(json!({ "message": "Player registered successfully" })),
        )),
        Err(StoreError::Duplicate(DuplicateField::Username)) => {
            Err(ApiError::conflict("Username is already taken"))
        }
        Err(StoreError::Duplicate(DuplicateField::Email)) => {
            Err(ApiError::conflict("Email is already registered"))
        }
        Err(err) => Err(err.into()),
    }
}

/// POST /players/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let player = if !req.username.is_empty() {
        state.store.find_by_username(&req.username).await?
    } else if !req.email.is_empty() {
        state.store.find_by_email(&req.email).await?
    } else {
        return Err(ApiError::bad_request("Username or email is required"));
    };

    // Unknown identity and wrong password are deliberately indistinguishable
    // to avoid username enumeration.
    let Some(player) = player else {
        return Err(ApiError::unauthorized(CREDENTIALS_INCORRECT));
    };
    if !verify_password(&req.password, &player.password_hash)? {
        return Err(ApiError::unauthorized(CREDENTIALS_INCORRECT));
    }

    let token = state.jwt_manager.sign(&player).map_err(|err| {
        tracing::error!(error = %err, "session token signing failed");
        ApiError::internal("Failed to generate token")
    })?;

    Ok(Json(json!({
        "message": "Login successful",
        "player": player,
        "token": token,
    })))
}

/// PUT /players/{username}/edit
///
/// Runs behind `require_auth`; the middleware attaches the verified identity
/// to the request extensions.
pub async fn edit(
    State(state): State<AppState>,
    Path(username): Path<String>,
    auth_player: AuthPlayer,
    body: Result<Json<EditRequest>, JsonRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    // Ownership is decided before the body is even looked at: a caller
    // editing someone else's record gets 401 no matter what they sent.
    ensure_owner(&auth_player.username, &username)?;

    let Json(req) = body.map_err(|_| ApiError::bad_request("Invalid request body"))?;

    let new_username = req.username.as_deref().filter(|u| !u.is_empty());
    let new_photo_profile = req.photo_profile.as_deref().filter(|p| !p.is_empty());
    if new_username.is_none() && new_photo_profile.is_none() {
        return Err(ApiError::bad_request("No fields to update"));
    }

    if let Some(candidate) = new_username {
        if state.store.find_by_username(candidate).await?.is_some() {
            return Err(ApiError::conflict("Username is already taken"));
        }
    }

    match state
        .store
        .update_fields(&username, new_username, new_photo_profile)
        .await
    {
        Ok(_) => Ok(Json(json!({ "message": "Player updated successfully" }))),
        Err(StoreError::Duplicate(_)) => Err(ApiError::conflict("Username is already taken")),
        Err(err) => Err(err.into()),
    }
}

/// A valid token proves who the caller is, not that they own this record.
fn ensure_owner(auth_username: &str, path_username: &str) -> Result<(), ApiError> {
    if auth_username != path_username {
        return Err(ApiError::unauthorized("Unauthorized"));
    }
    Ok(())
}

fn validate_registration(req: &RegisterRequest) -> Result<(), ApiError> {
    if !is_valid_email(&req.email) {
        return Err(ApiError::bad_request("Invalid email format"));
    }
    if req.username.len() < MIN_USERNAME_LEN {
        return Err(ApiError::bad_request(
            "Username must be at least 4 characters",
        ));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(
            "Password must be at least 6 characters",
        ));
    }
    Ok(())
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !email.contains(' ')
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
