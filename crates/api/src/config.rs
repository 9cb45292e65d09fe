//! Environment configuration
//!
//! Loaded once at startup; the signing secret is never logged and never
//! mutated after construction.

use anyhow::{bail, Context};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_address: String,
    pub token_expiry_hours: i64,
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let jwt_secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        if jwt_secret.is_empty() {
            bail!("JWT_SECRET must not be empty");
        }

        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let token_expiry_hours = match std::env::var("TOKEN_EXPIRY_HOURS") {
            Ok(raw) => raw
                .parse::<i64>()
                .context("TOKEN_EXPIRY_HOURS must be an integer")?,
            Err(_) => 24,
        };
        if token_expiry_hours <= 0 {
            bail!("TOKEN_EXPIRY_HOURS must be positive");
        }

        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            database_url,
            jwt_secret,
            bind_address,
            token_expiry_hours,
            allowed_origins,
        })
    }
}
