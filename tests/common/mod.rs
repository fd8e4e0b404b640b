//! Shared scaffolding for API tests.
//!
//! The app under test runs on the in-memory store; credentials are minted
//! locally with the test signing key whose public half is the configured
//! JWK set (`testdata/jwks.json`).

// Each test binary uses a different subset of this module.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, header};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::Serialize;
use tower::ServiceExt;

use casting_agency_api::app::build_router;
use casting_agency_api::config::{AppEnv, Config, JwksSource};
use casting_agency_api::repos::memory::MemoryStore;
use casting_agency_api::services::auth::build_auth_service;
use casting_agency_api::state::AppState;

pub const SIGNING_KEY_PEM: &str = include_str!("../../testdata/signing_key.pem");
pub const JWKS_JSON: &str = include_str!("../../testdata/jwks.json");
pub const KID: &str = "test-key-1";
pub const ISSUER: &str = "https://auth.example.test/";
pub const AUDIENCE: &str = "casting-agency";

fn config() -> Config {
    Config {
        addr: SocketAddr::from_str("127.0.0.1:0").unwrap(),
        app_env: AppEnv::Development,
        cors_allowed_origins: Vec::new(),
        database_url: None,
        auth_issuer: ISSUER.to_string(),
        auth_audience: AUDIENCE.to_string(),
        jwks: JwksSource::Inline(JWKS_JSON.to_string()),
        access_token_leeway_seconds: 0,
        jwks_cache_ttl_seconds: 300,
        jwks_fetch_timeout_ms: 3_000,
        page_size: 10,
    }
}

/// Fresh app over an empty in-memory store.
pub fn app() -> Router {
    let config = config();
    let auth = build_auth_service(&config).expect("test JWKS must build");
    let state = AppState::new(Arc::new(MemoryStore::new()), auth, config.page_size);

    build_router(state, &config)
}

#[derive(Serialize)]
struct TestClaims {
    iss: String,
    aud: String,
    sub: String,
    exp: u64,
    permissions: Vec<String>,
}

/// Mint a valid RS256 token carrying exactly the given permissions.
pub fn token(permissions: &[&str]) -> String {
    let exp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
        + 3600;

    let claims = TestClaims {
        iss: ISSUER.to_string(),
        aud: AUDIENCE.to_string(),
        sub: "auth0|integration-tester".to_string(),
        exp,
        permissions: permissions.iter().map(|p| p.to_string()).collect(),
    };

    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(KID.to_string());

    jsonwebtoken::encode(
        &header,
        &claims,
        &EncodingKey::from_rsa_pem(SIGNING_KEY_PEM.as_bytes()).unwrap(),
    )
    .unwrap()
}

/// Drive one request through the app; returns (status, parsed JSON body).
pub async fn send(app: &Router, request: Request<Body>) -> (u16, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status().as_u16();

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

pub fn get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(
    method: &str,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Request with no Authorization header (and no body).
pub fn bare(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// The exact failure envelope the API promises for a status.
pub fn error_envelope(status: u16, message: &str) -> serde_json::Value {
    serde_json::json!({
        "success": false,
        "error": status,
        "message": message,
    })
}
