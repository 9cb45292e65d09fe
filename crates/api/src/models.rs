//! Player identity model

use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

pub const DEFAULT_ROLE: &str = "guest";
pub const DEFAULT_PHOTO_PROFILE: &str = "/images/default_profile.png";

/// A registered player. Username and email are globally unique; the password
/// exists only as a one-way hash and is never serialized into a response.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Player {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub photo_profile: String,
    pub role: String,
    /// Opaque extensible attribute map, empty by default.
    pub data: serde_json::Value,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}
