//! Application-wide error type and its single HTTP translation point.
//!
//! Responsibility:
//! - Define the failure kinds handlers and middleware are allowed to surface.
//! - Render every failure as the fixed JSON envelope
//!   `{"success": false, "error": <status>, "message": "<canonical text>"}`.
//!
//! Notes:
//! - The envelope only ever carries 400/401/404/405/422/500 with the
//!   canonical messages below. Anything unexpected collapses into 500.
//! - Auth failures always render as 401 "Unauthorized"; the internal kind
//!   (bad signature vs. missing scope vs. expired, ...) is logged where the
//!   failure is detected and never reaches the client.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::store::StoreError;

/// Wire shape of every failure response.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: u16,
    pub message: &'static str,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request")]
    BadRequest,

    #[error("unauthorized")]
    Unauthorized,

    #[error("resource not found")]
    NotFound,

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("unprocessable")]
    Unprocessable,

    #[error("internal server error")]
    Internal,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Unprocessable => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Canonical client-facing message per status. Fixed; not derived from
    /// the underlying cause.
    fn message(&self) -> &'static str {
        match self {
            AppError::BadRequest => "Bad request",
            AppError::Unauthorized => "Unauthorized",
            AppError::NotFound => "Resource not found",
            AppError::MethodNotAllowed => "Method not allowed",
            AppError::Unprocessable => "Unprocessable",
            AppError::Internal => "Internal server error",
        }
    }

    /// Body-extraction failures:
    /// - well-formed JSON of the wrong shape (missing/invalid field) => 422
    /// - structurally absent or unparseable body where one is required => 400
    pub fn from_json_rejection(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(_) => AppError::Unprocessable,
            _ => AppError::BadRequest,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorEnvelope {
            success: false,
            error: status.as_u16(),
            message: self.message(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            // Constraint violation on otherwise valid input (duplicate title
            // etc.) renders as unprocessable, matching the rest of the
            // request-validation surface.
            StoreError::Conflict(_) => AppError::Unprocessable,
            StoreError::Db(_) => {
                tracing::error!(error = %e, "store backend failure");
                AppError::Internal
            }
        }
    }
}

/// Router fallback for unknown paths.
pub async fn not_found() -> AppError {
    AppError::NotFound
}

/// Router fallback for a known path hit with an unsupported method.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_messages_per_status() {
        let cases = [
            (AppError::BadRequest, 400, "Bad request"),
            (AppError::Unauthorized, 401, "Unauthorized"),
            (AppError::NotFound, 404, "Resource not found"),
            (AppError::MethodNotAllowed, 405, "Method not allowed"),
            (AppError::Unprocessable, 422, "Unprocessable"),
            (AppError::Internal, 500, "Internal server error"),
        ];

        for (err, code, message) in cases {
            assert_eq!(err.status().as_u16(), code);
            assert_eq!(err.message(), message);
        }
    }

    #[test]
    fn envelope_wire_shape_is_exact() {
        let body = ErrorEnvelope {
            success: false,
            error: 404,
            message: "Resource not found",
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": false,
                "error": 404,
                "message": "Resource not found"
            })
        );
    }

    #[test]
    fn store_conflict_maps_to_unprocessable() {
        let err: AppError = StoreError::Conflict("movies.title").into();
        assert!(matches!(err, AppError::Unprocessable));
    }
}
