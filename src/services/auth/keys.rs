//! Verification key material, resolved by the `kid` a token names.
//!
//! Two providers:
//! - `StaticJwks`: a fixed JWK set handed over at boot (dev/test, pinned keys)
//! - `RemoteJwks`: a JWKS endpoint with an in-process cache to support key
//!   rotation. The cache holds one immutable snapshot; a refresh replaces it
//!   wholesale instead of mutating in place, so concurrent readers always see
//!   a consistent set. A refresh is triggered when the snapshot is stale or
//!   when a token names a kid the snapshot does not carry.

use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::jwk::JwkSet;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::time::Instant;
use url::Url;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("unknown key id '{0}'")]
    UnknownKid(String),

    #[error("key set fetch timed out")]
    Timeout,

    #[error("key set fetch failed: {0}")]
    Fetch(String),

    #[error("unusable key material: {0}")]
    InvalidKey(String),
}

/// Resolves a decoding key for a token's `kid`.
///
/// Implementations must be safe for concurrent use; the verifier calls
/// `resolve` on every request.
#[async_trait]
pub trait KeyProvider: Send + Sync {
    // Provider name, for logging.
    fn name(&self) -> &'static str;

    async fn resolve(&self, kid: &str) -> Result<DecodingKey, KeyError>;
}

fn key_for<'a>(keys: &'a JwkSet, kid: &str) -> Option<&'a jsonwebtoken::jwk::Jwk> {
    keys.find(kid)
}

/// Fixed JWK set, no refresh.
pub struct StaticJwks {
    keys: JwkSet,
}

impl StaticJwks {
    pub fn from_json(json: &str) -> Result<Self, KeyError> {
        let keys: JwkSet =
            serde_json::from_str(json).map_err(|e| KeyError::InvalidKey(e.to_string()))?;

        Ok(Self { keys })
    }
}

#[async_trait]
impl KeyProvider for StaticJwks {
    fn name(&self) -> &'static str {
        "static-jwks"
    }

    async fn resolve(&self, kid: &str) -> Result<DecodingKey, KeyError> {
        let jwk = key_for(&self.keys, kid).ok_or_else(|| KeyError::UnknownKid(kid.to_string()))?;

        DecodingKey::from_jwk(jwk).map_err(|e| KeyError::InvalidKey(e.to_string()))
    }
}

struct Snapshot {
    keys: JwkSet,
    fetched_at: Instant,
}

/// JWKS endpoint with a whole-snapshot cache.
pub struct RemoteJwks {
    client: reqwest::Client,
    url: Url,
    cache_ttl: Duration,
    fetch_timeout: Duration,
    cache: RwLock<Option<Snapshot>>,
}

impl RemoteJwks {
    pub fn new(url: Url, cache_ttl: Duration, fetch_timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            cache_ttl,
            fetch_timeout,
            cache: RwLock::new(None),
        }
    }

    /// Key from the cached snapshot, or `None` when the snapshot is absent,
    /// stale, or does not carry `kid`.
    async fn cached(&self, kid: &str) -> Result<Option<DecodingKey>, KeyError> {
        let cache = self.cache.read().await;

        let Some(snapshot) = cache.as_ref() else {
            return Ok(None);
        };
        if snapshot.fetched_at.elapsed() >= self.cache_ttl {
            return Ok(None);
        }

        match key_for(&snapshot.keys, kid) {
            Some(jwk) => {
                let key =
                    DecodingKey::from_jwk(jwk).map_err(|e| KeyError::InvalidKey(e.to_string()))?;
                Ok(Some(key))
            }
            None => Ok(None),
        }
    }

    /// Fetch the key set and replace the snapshot wholesale.
    ///
    /// The fetch is bounded by its own timeout so a wedged JWKS endpoint
    /// cannot stall request handling beyond it.
    async fn refresh(&self) -> Result<(), KeyError> {
        let fetch = async {
            self.client
                .get(self.url.clone())
                .send()
                .await?
                .error_for_status()?
                .json::<JwkSet>()
                .await
        };

        let keys = tokio::time::timeout(self.fetch_timeout, fetch)
            .await
            .map_err(|_| KeyError::Timeout)?
            .map_err(|e: reqwest::Error| KeyError::Fetch(e.to_string()))?;

        let mut cache = self.cache.write().await;
        *cache = Some(Snapshot {
            keys,
            fetched_at: Instant::now(),
        });

        Ok(())
    }
}

#[async_trait]
impl KeyProvider for RemoteJwks {
    fn name(&self) -> &'static str {
        "remote-jwks"
    }

    async fn resolve(&self, kid: &str) -> Result<DecodingKey, KeyError> {
        if let Some(key) = self.cached(kid).await? {
            return Ok(key);
        }

        // Miss: either no fresh snapshot, or the kid is unknown to it
        // (rotation may have happened since the last fetch).
        // TODO: rate-limit unknown-kid refreshes so a flood of garbage tokens
        // cannot hammer the JWKS endpoint.
        self.refresh().await?;

        match self.cached(kid).await? {
            Some(key) => Ok(key),
            None => Err(KeyError::UnknownKid(kid.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JWKS_JSON: &str = include_str!("../../../testdata/jwks.json");
    const KNOWN_KID: &str = "test-key-1";

    #[tokio::test]
    async fn static_jwks_resolves_known_kid() {
        let provider = StaticJwks::from_json(JWKS_JSON).unwrap();

        assert!(provider.resolve(KNOWN_KID).await.is_ok());
    }

    #[tokio::test]
    async fn static_jwks_rejects_unknown_kid() {
        let provider = StaticJwks::from_json(JWKS_JSON).unwrap();

        match provider.resolve("nope").await {
            Err(KeyError::UnknownKid(kid)) => assert_eq!(kid, "nope"),
            other => panic!("expected UnknownKid, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn static_jwks_rejects_garbage_json() {
        assert!(matches!(
            StaticJwks::from_json("not json"),
            Err(KeyError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn remote_jwks_fetches_and_caches() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/jwks.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(JWKS_JSON)
            .expect(1)
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/jwks.json", server.url())).unwrap();
        let provider = RemoteJwks::new(url, Duration::from_secs(300), Duration::from_secs(5));

        // Two resolves, one fetch: the second is served from the snapshot.
        assert!(provider.resolve(KNOWN_KID).await.is_ok());
        assert!(provider.resolve(KNOWN_KID).await.is_ok());

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn remote_jwks_unknown_kid_refreshes_then_fails() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/jwks.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(JWKS_JSON)
            .expect(2)
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/jwks.json", server.url())).unwrap();
        let provider = RemoteJwks::new(url, Duration::from_secs(300), Duration::from_secs(5));

        assert!(provider.resolve(KNOWN_KID).await.is_ok());

        // Unknown kid must force a refetch before giving up.
        assert!(matches!(
            provider.resolve("rotated-away").await,
            Err(KeyError::UnknownKid(_))
        ));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn remote_jwks_maps_http_errors() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/jwks.json")
            .with_status(500)
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/jwks.json", server.url())).unwrap();
        let provider = RemoteJwks::new(url, Duration::from_secs(300), Duration::from_secs(5));

        assert!(matches!(
            provider.resolve(KNOWN_KID).await,
            Err(KeyError::Fetch(_))
        ));
    }
}
