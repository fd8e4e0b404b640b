//! Process configuration, loaded once at startup.
//!
//! Responsibility:
//! - Read and validate environment variables (signing authority, store,
//!   CORS, pagination). Missing required values abort boot.
//! - Keep defaults conservative so a bare dev environment still starts.

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use url::Url;

use crate::services::pagination::DEFAULT_PAGE_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Where verification key material comes from.
///
/// Exactly one of the two must be configured:
/// - `AUTH_JWKS`: an inline JWK set (JSON), for fixed keys
/// - `AUTH_JWKS_URL`: a JWKS endpoint, polled with a cache for key rotation
#[derive(Debug, Clone)]
pub enum JwksSource {
    Inline(String),
    Remote(Url),
}

pub struct Config {
    pub addr: SocketAddr,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    /// Absent => the in-memory store is used (dev/test runs without Postgres).
    pub database_url: Option<String>,

    pub auth_issuer: String,
    pub auth_audience: String,
    pub jwks: JwksSource,
    pub access_token_leeway_seconds: u64,
    pub jwks_cache_ttl_seconds: u64,
    pub jwks_fetch_timeout_ms: u64,

    pub page_size: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let database_url = std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());

        let auth_issuer =
            std::env::var("AUTH_ISSUER").map_err(|_| ConfigError::Missing("AUTH_ISSUER"))?;

        let auth_audience =
            std::env::var("AUTH_AUDIENCE").map_err(|_| ConfigError::Missing("AUTH_AUDIENCE"))?;

        let jwks_inline = std::env::var("AUTH_JWKS").ok().filter(|s| !s.is_empty());
        let jwks_url = std::env::var("AUTH_JWKS_URL").ok().filter(|s| !s.is_empty());

        let jwks = match (jwks_inline, jwks_url) {
            (Some(_), Some(_)) => return Err(ConfigError::Invalid("AUTH_JWKS / AUTH_JWKS_URL")),
            (Some(json), None) => JwksSource::Inline(json),
            (None, Some(raw)) => {
                let url = Url::parse(&raw).map_err(|_| ConfigError::Invalid("AUTH_JWKS_URL"))?;
                JwksSource::Remote(url)
            }
            (None, None) => return Err(ConfigError::Missing("AUTH_JWKS or AUTH_JWKS_URL")),
        };

        let access_token_leeway_seconds = std::env::var("ACCESS_TOKEN_LEEWAY_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(60);

        let jwks_cache_ttl_seconds = std::env::var("JWKS_CACHE_TTL_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(300);

        let jwks_fetch_timeout_ms = std::env::var("JWKS_FETCH_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(3_000);

        let page_size = std::env::var("PAGE_SIZE")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE);

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            database_url,
            auth_issuer,
            auth_audience,
            jwks,
            access_token_leeway_seconds,
            jwks_cache_ttl_seconds,
            jwks_fetch_timeout_ms,
            page_size,
        })
    }
}
