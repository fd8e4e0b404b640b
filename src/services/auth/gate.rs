//! Permission gate: claim set + required permissions -> allow/deny.
//!
//! Exact string match only; no wildcards, no hierarchy. Multiple required
//! permissions are AND-ed. Pure decision function, no side effects.

use crate::services::auth::access_jwt::{AuthError, VerifiedAccessToken};

pub fn authorize(claims: &VerifiedAccessToken, required: &[&str]) -> Result<(), AuthError> {
    for permission in required {
        if !claims.permissions.iter().any(|have| have == permission) {
            return Err(AuthError::InsufficientScope((*permission).to_string()));
        }
    }

    Ok(())
}
