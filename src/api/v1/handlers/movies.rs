/*
 * Responsibility
 * - /movies CRUD handlers
 * - Mirrors the /actors surface; the one extra wrinkle is the unique title,
 *   which the store reports as a conflict (rendered 422)
 */
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
};

use crate::{
    api::v1::{
        dto::movies::{
            CreateMovieRequest, CreateMovieResponse, DeleteMovieResponse, EditMovieResponse,
            MovieListResponse, MovieResponse, UpdateMovieRequest,
        },
        dto::query::ListQuery,
        extractors::AuthCtxExtractor,
    },
    error::AppError,
    repos::store::MovieRecord,
    services::pagination::Page,
    state::AppState,
};

/// Optional case-insensitive substring filter on the title, applied before
/// pagination.
fn filtered(records: Vec<MovieRecord>, search: Option<&str>) -> Vec<MovieRecord> {
    match search.map(str::trim).filter(|s| !s.is_empty()) {
        Some(term) => {
            let needle = term.to_lowercase();
            records
                .into_iter()
                .filter(|m| m.title.to_lowercase().contains(&needle))
                .collect()
        }
        None => records,
    }
}

fn page_of(records: &[MovieRecord], query: &ListQuery, page_size: usize) -> Vec<MovieResponse> {
    Page::from_param(query.page.as_deref(), page_size)
        .window(records)
        .iter()
        .map(MovieResponse::from)
        .collect()
}

pub async fn list_movies(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<MovieListResponse>, AppError> {
    let query = query.map(|Query(q)| q).unwrap_or_default();

    let records = filtered(state.store.list_movies().await?, query.search.as_deref());
    let total = records.len();

    let current = page_of(&records, &query, state.page_size);

    if total > 0 && current.is_empty() {
        return Err(AppError::NotFound);
    }

    Ok(Json(MovieListResponse {
        success: true,
        movies: current,
        total_movies: total,
    }))
}

pub async fn create_movie(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    query: Result<Query<ListQuery>, QueryRejection>,
    payload: Result<Json<CreateMovieRequest>, JsonRejection>,
) -> Result<Json<CreateMovieResponse>, AppError> {
    let query = query.map(|Query(q)| q).unwrap_or_default();
    let Json(req) = payload.map_err(AppError::from_json_rejection)?;
    req.validate().map_err(|_| AppError::Unprocessable)?;

    let created = state.store.insert_movie(req.into_new()).await?;
    tracing::info!(subject = %ctx.sub, movie_id = created.id, "movie created");

    let records = state.store.list_movies().await?;
    let total = records.len();

    Ok(Json(CreateMovieResponse {
        success: true,
        created_movie_id: created.id,
        movies: page_of(&records, &query, state.page_size),
        total_movies: total,
    }))
}

pub async fn edit_movie(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    movie_id: Result<Path<i64>, PathRejection>,
    query: Result<Query<ListQuery>, QueryRejection>,
    payload: Result<Json<UpdateMovieRequest>, JsonRejection>,
) -> Result<Json<EditMovieResponse>, AppError> {
    // A non-numeric id can't name any movie; same outcome as an unknown one.
    let Path(movie_id) = movie_id.map_err(|_| AppError::NotFound)?;
    let query = query.map(|Query(q)| q).unwrap_or_default();
    let Json(req) = payload.map_err(AppError::from_json_rejection)?;
    req.validate().map_err(|_| AppError::Unprocessable)?;

    let updated = state
        .store
        .update_movie(movie_id, req.into_patch())
        .await?
        .ok_or(AppError::NotFound)?;
    tracing::info!(subject = %ctx.sub, movie_id = updated.id, "movie updated");

    let records = state.store.list_movies().await?;
    let total = records.len();

    Ok(Json(EditMovieResponse {
        success: true,
        edited_movie_id: updated.id,
        movies: page_of(&records, &query, state.page_size),
        total_movies: total,
    }))
}

pub async fn delete_movie(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    movie_id: Result<Path<i64>, PathRejection>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<DeleteMovieResponse>, AppError> {
    let Path(movie_id) = movie_id.map_err(|_| AppError::NotFound)?;
    let query = query.map(|Query(q)| q).unwrap_or_default();

    let deleted = state.store.delete_movie(movie_id).await?;
    if !deleted {
        return Err(AppError::NotFound);
    }
    tracing::info!(subject = %ctx.sub, movie_id, "movie deleted");

    let records = state.store.list_movies().await?;
    let total = records.len();

    Ok(Json(DeleteMovieResponse {
        success: true,
        deleted_movie_id: movie_id,
        movies: page_of(&records, &query, state.page_size),
        total_movies: total,
    }))
}
