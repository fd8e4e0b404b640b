/// Factory: build `AuthService` from application `Config`.
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, JwksSource};
use crate::error::AppError;
use crate::services::auth::AuthService;
use crate::services::auth::keys::{KeyProvider, RemoteJwks, StaticJwks};

pub fn build_auth_service(config: &Config) -> Result<Arc<AuthService>, AppError> {
    let keys: Arc<dyn KeyProvider> = match &config.jwks {
        JwksSource::Inline(json) => {
            let jwks = StaticJwks::from_json(json).map_err(|e| {
                tracing::error!(error = %e, "AUTH_JWKS is not a usable JWK set");
                AppError::Internal
            })?;
            Arc::new(jwks)
        }
        JwksSource::Remote(url) => Arc::new(RemoteJwks::new(
            url.clone(),
            Duration::from_secs(config.jwks_cache_ttl_seconds),
            Duration::from_millis(config.jwks_fetch_timeout_ms),
        )),
    };

    Ok(Arc::new(AuthService::new(
        keys,
        &config.auth_issuer,
        &config.auth_audience,
        config.access_token_leeway_seconds,
    )))
}
