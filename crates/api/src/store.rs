//! Credential store adapter for the players collection
//!
//! Wraps the PostgreSQL pool behind unique-field lookup, insert, and field
//! update. Every call is bounded by a 5 second deadline; a missed deadline
//! surfaces as `StoreError::Timeout`, distinct from "not found".

use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use tokio::time::timeout;

use crate::models::Player;

const STORE_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Which unique field a rejected write collided on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateField {
    Username,
    Email,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store operation timed out")]
    Timeout,
    #[error("unique constraint violated on {0:?}")]
    Duplicate(DuplicateField),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// New identity to persist. The password arrives already hashed.
#[derive(Debug)]
pub struct NewPlayer<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub photo_profile: &'a str,
    pub role: &'a str,
    pub data: serde_json::Value,
}

const FIND_BY_USERNAME: &str = "SELECT id, username, email, password_hash, photo_profile, role, \
     data, created_at, updated_at FROM players WHERE username = $1";

const FIND_BY_EMAIL: &str = "SELECT id, username, email, password_hash, photo_profile, role, \
     data, created_at, updated_at FROM players WHERE email = $1";

const INSERT_PLAYER: &str = "INSERT INTO players (username, email, password_hash, photo_profile, role, data) \
     VALUES ($1, $2, $3, $4, $5, $6) \
     RETURNING id, username, email, password_hash, photo_profile, role, data, created_at, updated_at";

const UPDATE_FIELDS: &str = "UPDATE players \
     SET username = COALESCE($2, username), \
         photo_profile = COALESCE($3, photo_profile), \
         updated_at = NOW() \
     WHERE username = $1";

#[derive(Clone)]
pub struct PlayerStore {
    pool: PgPool,
}

impl PlayerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<Player>, StoreError> {
        let query = sqlx::query_as::<_, Player>(FIND_BY_USERNAME)
            .bind(username)
            .fetch_optional(&self.pool);
        match timeout(STORE_TIMEOUT, query).await {
            Ok(result) => result.map_err(StoreError::from),
            Err(_) => Err(StoreError::Timeout),
        }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Player>, StoreError> {
        let query = sqlx::query_as::<_, Player>(FIND_BY_EMAIL)
            .bind(email)
            .fetch_optional(&self.pool);
        match timeout(STORE_TIMEOUT, query).await {
            Ok(result) => result.map_err(StoreError::from),
            Err(_) => Err(StoreError::Timeout),
        }
    }

    /// Insert a new player, relying on the table's unique constraints to
    /// reject duplicate usernames or emails.
    pub async fn insert(&self, player: &NewPlayer<'_>) -> Result<Player, StoreError> {
        let query = sqlx::query_as::<_, Player>(INSERT_PLAYER)
            .bind(player.username)
            .bind(player.email)
            .bind(player.password_hash)
            .bind(player.photo_profile)
            .bind(player.role)
            .bind(player.data.clone())
            .fetch_one(&self.pool);
        match timeout(STORE_TIMEOUT, query).await {
            Ok(result) => result.map_err(map_unique_violation),
            Err(_) => Err(StoreError::Timeout),
        }
    }

    /// Update username and/or photo profile for the record keyed by
    /// `username`. `None` fields are left untouched. Returns the number of
    /// rows updated.
    pub async fn update_fields(
        &self,
        username: &str,
        new_username: Option<&str>,
        new_photo_profile: Option<&str>,
    ) -> Result<u64, StoreError> {
        let query = sqlx::query(UPDATE_FIELDS)
            .bind(username)
            .bind(new_username)
            .bind(new_photo_profile)
            .execute(&self.pool);
        match timeout(STORE_TIMEOUT, query).await {
            Ok(result) => result
                .map(|done| done.rows_affected())
                .map_err(map_unique_violation),
            Err(_) => Err(StoreError::Timeout),
        }
    }
}

fn map_unique_violation(err: sqlx::Error) -> StoreError {
    match duplicate_field(&err) {
        Some(field) => StoreError::Duplicate(field),
        None => StoreError::Database(err),
    }
}

fn duplicate_field(err: &sqlx::Error) -> Option<DuplicateField> {
    let db = err.as_database_error()?;
    if !db.is_unique_violation() {
        return None;
    }
    match db.constraint() {
        Some("players_username_key") => Some(DuplicateField::Username),
        Some("players_email_key") => Some(DuplicateField::Email),
        _ => None,
    }
}
