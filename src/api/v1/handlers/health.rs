/*
 * Responsibility
 * - GET /health (liveness)
 * - Deliberately unguarded: probes carry no credential
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}
