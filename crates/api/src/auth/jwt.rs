//! Session token codec
//!
//! Signs a time-bounded projection of a player into an opaque HS256 token
//! and validates it back. Verification is stateless: no store round-trip,
//! no revocation list. The expiry window bounds the blast radius of a
//! leaked token.

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::models::Player;

/// Claims carried inside every session token. Immutable once signed; after
/// a successful verify they are trusted verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Player id.
    pub sub: Uuid,
    pub username: String,
    pub email: String,
    pub photo_profile: String,
    pub role: String,
    /// Opaque attribute map copied from the player record at login.
    pub data: serde_json::Value,
    /// Issued-at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token structure could not be parsed")]
    Malformed,
    #[error("token signature mismatch")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("token signing failed")]
    Signing,
}

/// Holds the process-wide signing secret. Constructed once at startup and
/// shared read-only across all requests.
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry: Duration,
}

impl JwtManager {
    pub fn new(secret: &str, expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry: Duration::hours(expiry_hours),
        }
    }

    /// Sign a session token for a player. The stored password hash never
    /// enters the claims.
    pub fn sign(&self, player: &Player) -> Result<String, TokenError> {
        self.sign_at(player, OffsetDateTime::now_utc())
    }

    fn sign_at(&self, player: &Player, issued_at: OffsetDateTime) -> Result<String, TokenError> {
        let claims = Claims {
            sub: player.id,
            username: player.username.clone(),
            email: player.email.clone(),
            photo_profile: player.photo_profile.clone(),
            role: player.role.clone(),
            data: player.data.clone(),
            iat: issued_at.unix_timestamp(),
            exp: (issued_at + self.expiry).unix_timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|_| TokenError::Signing)
    }

    /// Parse and validate a token: structure, signature, then expiry. The
    /// caller translates all three failures into the same generic
    /// unauthorized rejection.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DEFAULT_PHOTO_PROFILE, DEFAULT_ROLE};
    use serde_json::json;

    fn test_player() -> Player {
        let now = OffsetDateTime::now_utc();
        Player {
            id: Uuid::new_v4(),
            username: "alice1".to_string(),
            email: "a@x.com".to_string(),
            password_hash: "$argon2id$not-a-real-hash".to_string(),
            photo_profile: DEFAULT_PHOTO_PROFILE.to_string(),
            role: DEFAULT_ROLE.to_string(),
            data: json!({ "level": 3 }),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn verify_returns_the_signed_claims() {
        let manager = JwtManager::new("test-secret", 24);
        let player = test_player();

        let token = manager.sign(&player).unwrap();
        let claims = manager.verify(&token).unwrap();

        assert_eq!(claims.sub, player.id);
        assert_eq!(claims.username, player.username);
        assert_eq!(claims.email, player.email);
        assert_eq!(claims.photo_profile, player.photo_profile);
        assert_eq!(claims.role, player.role);
        assert_eq!(claims.data, player.data);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn wrong_secret_is_an_invalid_signature() {
        let signer = JwtManager::new("secret-one", 24);
        let verifier = JwtManager::new("secret-two", 24);

        let token = signer.sign(&test_player()).unwrap();
        assert_eq!(verifier.verify(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn tampered_payload_is_an_invalid_signature() {
        let manager = JwtManager::new("test-secret", 24);
        let token = manager.sign(&test_player()).unwrap();

        // Flip one base64url character in the payload segment.
        let mut chars: Vec<char> = token.chars().collect();
        let mut idx = token.len() / 2;
        if chars[idx] == '.' {
            idx += 1;
        }
        chars[idx] = if chars[idx] == 'A' { 'B' } else { 'A' };
        let tampered: String = chars.into_iter().collect();

        assert_eq!(
            manager.verify(&tampered),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn expired_token_is_rejected() {
        let manager = JwtManager::new("test-secret", 24);
        let issued_at = OffsetDateTime::now_utc() - Duration::hours(25);

        let token = manager.sign_at(&test_player(), issued_at).unwrap();
        assert_eq!(manager.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn token_just_inside_the_window_still_verifies() {
        let manager = JwtManager::new("test-secret", 24);
        let issued_at = OffsetDateTime::now_utc() - Duration::hours(23);

        let token = manager.sign_at(&test_player(), issued_at).unwrap();
        assert!(manager.verify(&token).is_ok());
    }

    #[test]
    fn garbage_input_is_malformed() {
        let manager = JwtManager::new("test-secret", 24);
        assert_eq!(manager.verify("not-a-token"), Err(TokenError::Malformed));
        assert_eq!(manager.verify(""), Err(TokenError::Malformed));
    }
}
