//! Per-route authorization middleware.
//!
//! A protected route declares its required permission(s) at registration
//! time; this middleware verifies the bearer credential, checks the grant,
//! and attaches the verified context for handlers. Every failure mode
//! short-circuits to the uniform 401 envelope; the internal failure kind is
//! only ever logged.

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::gate;
use crate::state::AppState;

/// What a protected route declares at registration time: the shared state
/// plus the permission(s) a caller must hold (AND-ed when more than one).
#[derive(Clone)]
pub struct RouteGuard {
    state: AppState,
    required: &'static [&'static str],
}

impl RouteGuard {
    pub fn new(state: AppState, required: &'static [&'static str]) -> Self {
        Self { state, required }
    }
}

/// Middleware body for `axum::middleware::from_fn_with_state`:
///
/// ```ignore
/// get(list_actors).layer(middleware::from_fn_with_state(
///     RouteGuard::new(state.clone(), &["get:actors"]),
///     access::guard,
/// ))
/// ```
pub async fn guard(
    State(route): State<RouteGuard>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let raw_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    // Verification strictly precedes authorization; permissions are never
    // matched against a claim set whose signature and claims did not hold up.
    let verified = match route.state.auth.verify(raw_header).await {
        Ok(verified) => verified,
        Err(err) => {
            tracing::warn!(error = %err, "access token verification failed");
            return Err(AppError::Unauthorized);
        }
    };

    if let Err(err) = gate::authorize(&verified, route.required) {
        tracing::warn!(error = %err, subject = %verified.sub, "permission denied");
        return Err(AppError::Unauthorized);
    }

    let ctx = AuthCtx::new(verified.sub, verified.permissions);

    // middleware → extractor handoff
    req.extensions_mut().insert(ctx);

    Ok(next.run(req).await)
}
