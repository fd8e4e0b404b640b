//! Shared application context handed to the Router.
//!
//! Clone-cheap by construction: every field is an `Arc` or `Copy`.

use std::sync::Arc;

use crate::repos::store::RosterStore;
use crate::services::auth::AuthService;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RosterStore>,
    pub auth: Arc<AuthService>,
    pub page_size: usize,
}

impl AppState {
    pub fn new(store: Arc<dyn RosterStore>, auth: Arc<AuthService>, page_size: usize) -> Self {
        Self {
            store,
            auth,
            page_size,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("auth", &self.auth)
            .field("page_size", &self.page_size)
            .finish()
    }
}
