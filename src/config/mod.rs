//! Application configuration loaded from environment.

use std::net::SocketAddr;
use std::time::Duration;

/// Minimum accepted length of the token signing secret, in bytes.
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Application configuration loaded from `.env` and environment variables.
#[derive(Clone)]
pub struct Config {
    /// Server bind address (e.g. `0.0.0.0:3000`).
    pub server_addr: SocketAddr,
    /// PostgreSQL connection URL. `None` runs on the in-memory stores.
    pub database_url: Option<String>,
    /// Token signing secret (min 32 bytes).
    pub jwt_secret: String,
    /// Lifetime of issued session tokens.
    pub token_ttl: Duration,
    /// Origin allowed by the CORS layer.
    pub cors_origin: String,
    /// Log level: `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("server_addr", &self.server_addr)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("cors_origin", &self.cors_origin)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment. Call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigLoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_addr = lookup("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let server_addr: SocketAddr = server_addr
            .parse()
            .map_err(|_| ConfigLoadError::InvalidServerAddr)?;

        let database_url = lookup("DATABASE_URL").filter(|s| !s.trim().is_empty());

        let jwt_secret = lookup("JWT_SECRET")
            .unwrap_or_else(|| "feedpulse_jwt_secret_change_in_production_32chars".to_string());
        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigLoadError::WeakJwtSecret);
        }

        let token_ttl = match lookup("TOKEN_TTL_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or(ConfigLoadError::InvalidTokenTtl)?,
            None => Duration::from_secs(3600),
        };

        let cors_origin =
            lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string());
        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        Ok(Self {
            server_addr,
            database_url,
            jwt_secret,
            token_ttl,
            cors_origin,
            log_level,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Invalid SERVER_ADDR")]
    InvalidServerAddr,
    #[error("JWT_SECRET must be at least 32 bytes")]
    WeakJwtSecret,
    #[error("TOKEN_TTL_SECS must be a positive number of seconds")]
    InvalidTokenTtl,
}
