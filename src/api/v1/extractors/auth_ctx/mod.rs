/*!
 * Authentication context extractor
 *
 * Responsibility:
 * - Hand the verified caller context (AuthCtx) to handlers.
 * - Keep the HTTP/axum coupling in core; types stays plain data.
 *
 * Public API:
 * - AuthCtx
 * - AuthCtxExtractor
 */

mod core;
mod types;

pub use core::AuthCtxExtractor;
pub use types::AuthCtx;
