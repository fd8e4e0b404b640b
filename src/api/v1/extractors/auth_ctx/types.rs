/*!
 * Authenticated-request context, as handlers see it.
 *
 * The access middleware verifies the credential and stores this in request
 * extensions; handlers only ever receive the already-verified view.
 */

/// Context attached to a request that passed verification and authorization.
///
/// - `sub` is the credential's subject, used for audit logging
/// - `permissions` is the full grant list the credential carried (the
///   route-level requirement was already enforced by the middleware)
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub sub: String,
    pub permissions: Vec<String>,
}

impl AuthCtx {
    pub fn new(sub: String, permissions: Vec<String>) -> Self {
        Self { sub, permissions }
    }
}
