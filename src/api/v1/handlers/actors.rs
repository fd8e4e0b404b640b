/*
 * Responsibility
 * - /actors CRUD handlers
 * - Route guards have already verified the caller; handlers validate the
 *   payload, talk to the store, and shape the success envelope
 * - Every list-shaped response echoes the requested page window plus the
 *   full-collection count
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
        dto::actors::{
            ActorListResponse, ActorResponse, CreateActorRequest, CreateActorResponse,
            DeleteActorResponse, EditActorResponse, UpdateActorRequest,
        },
        dto::query::ListQuery,
        extractors::AuthCtxExtractor,
    },
    error::AppError,
    repos::store::ActorRecord,
    services::pagination::Page,
    state::AppState,
};

/// Optional case-insensitive substring filter on the actor name, applied
/// before pagination.
fn filtered(records: Vec<ActorRecord>, search: Option<&str>) -> Vec<ActorRecord> {
    match search.map(str::trim).filter(|s| !s.is_empty()) {
        Some(term) => {
            let needle = term.to_lowercase();
            records
                .into_iter()
                .filter(|a| a.name.to_lowercase().contains(&needle))
                .collect()
        }
        None => records,
    }
}

fn page_of(records: &[ActorRecord], query: &ListQuery, page_size: usize) -> Vec<ActorResponse> {
    Page::from_param(query.page.as_deref(), page_size)
        .window(records)
        .iter()
        .map(ActorResponse::from)
        .collect()
}

pub async fn list_actors(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<ActorListResponse>, AppError> {
    // The list parameters are lenient by contract; an undecodable query
    // string is treated the same as none at all.
    let query = query.map(|Query(q)| q).unwrap_or_default();

    let records = filtered(state.store.list_actors().await?, query.search.as_deref());
    let total = records.len();

    let current = page_of(&records, &query, state.page_size);

    // A page past the end of a collection that does have entries is a miss;
    // an empty collection is just an empty first page.
    if total > 0 && current.is_empty() {
        return Err(AppError::NotFound);
    }

    Ok(Json(ActorListResponse {
        success: true,
        actors: current,
        total_actors: total,
    }))
}

pub async fn create_actor(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    query: Result<Query<ListQuery>, QueryRejection>,
    payload: Result<Json<CreateActorRequest>, JsonRejection>,
) -> Result<Json<CreateActorResponse>, AppError> {
    let query = query.map(|Query(q)| q).unwrap_or_default();
    let Json(req) = payload.map_err(AppError::from_json_rejection)?;
    req.validate().map_err(|_| AppError::Unprocessable)?;

    let created = state.store.insert_actor(req.into_new()).await?;
    tracing::info!(subject = %ctx.sub, actor_id = created.id, "actor created");

    let records = state.store.list_actors().await?;
    let total = records.len();

    Ok(Json(CreateActorResponse {
        success: true,
        created_actor_id: created.id,
        actors: page_of(&records, &query, state.page_size),
        total_actors: total,
    }))
}

pub async fn edit_actor(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    actor_id: Result<Path<i64>, PathRejection>,
    query: Result<Query<ListQuery>, QueryRejection>,
    payload: Result<Json<UpdateActorRequest>, JsonRejection>,
) -> Result<Json<EditActorResponse>, AppError> {
    // A non-numeric id can't name any actor; same outcome as an unknown one.
    let Path(actor_id) = actor_id.map_err(|_| AppError::NotFound)?;
    let query = query.map(|Query(q)| q).unwrap_or_default();
    let Json(req) = payload.map_err(AppError::from_json_rejection)?;
    req.validate().map_err(|_| AppError::Unprocessable)?;

    let updated = state
        .store
        .update_actor(actor_id, req.into_patch())
        .await?
        .ok_or(AppError::NotFound)?;
    tracing::info!(subject = %ctx.sub, actor_id = updated.id, "actor updated");

    let records = state.store.list_actors().await?;
    let total = records.len();

    Ok(Json(EditActorResponse {
        success: true,
        edited_actor_id: updated.id,
        actors: page_of(&records, &query, state.page_size),
        total_actors: total,
    }))
}

pub async fn delete_actor(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    actor_id: Result<Path<i64>, PathRejection>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<DeleteActorResponse>, AppError> {
    let Path(actor_id) = actor_id.map_err(|_| AppError::NotFound)?;
    let query = query.map(|Query(q)| q).unwrap_or_default();

    let deleted = state.store.delete_actor(actor_id).await?;
    if !deleted {
        return Err(AppError::NotFound);
    }
    tracing::info!(subject = %ctx.sub, actor_id, "actor deleted");

    let records = state.store.list_actors().await?;
    let total = records.len();

    Ok(Json(DeleteActorResponse {
        success: true,
        deleted_actor_id: actor_id,
        actors: page_of(&records, &query, state.page_size),
        total_actors: total,
    }))
}
