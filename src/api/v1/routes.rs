/*
 * Responsibility
 * - v1 URL structure
 * - Per-route authorization: each protected method router is wrapped with a
 *   guard declaring its single required permission at registration time
 */
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post},
};

use crate::api::v1::handlers::{actors, health, movies};
use crate::middleware::auth::access::{self, RouteGuard};
use crate::state::AppState;

/// Static permission requirements, one per protected operation.
mod permissions {
    pub const GET_ACTORS: &[&str] = &["get:actors"];
    pub const POST_ACTORS: &[&str] = &["post:actors"];
    pub const PATCH_ACTORS: &[&str] = &["patch:actors"];
    pub const DELETE_ACTORS: &[&str] = &["delete:actors"];

    pub const GET_MOVIES: &[&str] = &["get:movies"];
    pub const POST_MOVIES: &[&str] = &["post:movies"];
    pub const PATCH_MOVIES: &[&str] = &["patch:movies"];
    pub const DELETE_MOVIES: &[&str] = &["delete:movies"];
}

pub fn routes(state: AppState) -> Router<AppState> {
    let guard = |required: &'static [&'static str]| {
        from_fn_with_state(RouteGuard::new(state.clone(), required), access::guard)
    };

    Router::new()
        .route("/health", get(health::health))
        .route(
            "/actors",
            get(actors::list_actors)
                .layer(guard(permissions::GET_ACTORS))
                .merge(post(actors::create_actor).layer(guard(permissions::POST_ACTORS))),
        )
        .route(
            "/actors/{actor_id}",
            patch(actors::edit_actor)
                .layer(guard(permissions::PATCH_ACTORS))
                .merge(delete(actors::delete_actor).layer(guard(permissions::DELETE_ACTORS))),
        )
        .route(
            "/movies",
            get(movies::list_movies)
                .layer(guard(permissions::GET_MOVIES))
                .merge(post(movies::create_movie).layer(guard(permissions::POST_MOVIES))),
        )
        .route(
            "/movies/{movie_id}",
            patch(movies::edit_movie)
                .layer(guard(permissions::PATCH_MOVIES))
                .merge(delete(movies::delete_movie).layer(guard(permissions::DELETE_MOVIES))),
        )
}
