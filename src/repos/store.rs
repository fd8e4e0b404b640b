//! Persistence collaborator interface.
//!
//! Responsibility:
//! - The record shapes handlers work with.
//! - The `RosterStore` trait every backend implements; handlers receive it
//!   as `Arc<dyn RosterStore>` through `AppState`, never through a global.
//!
//! Error meaning:
//! - `Conflict`: the input was valid but violates a uniqueness constraint
//! - `Db`: backend failure; the handler must not leak its message

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("conflict on {0}")]
    Conflict(&'static str),

    #[error("db error: {0}")]
    Db(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct ActorRecord {
    pub id: i64,
    pub name: String,
    pub age: i32,
    pub gender: String,
}

#[derive(Debug, Clone)]
pub struct MovieRecord {
    pub id: i64,
    pub title: String,
    pub release_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct NewActor {
    pub name: String,
    pub age: i32,
    pub gender: String,
}

/// Field-wise patch; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct ActorPatch {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewMovie {
    pub title: String,
    pub release_date: NaiveDate,
}

#[derive(Debug, Clone, Default)]
pub struct MoviePatch {
    pub title: Option<String>,
    pub release_date: Option<NaiveDate>,
}

/// Roster persistence operations.
///
/// Lists are returned in insertion (id) order; pagination happens above this
/// layer. `update_*`/`find_*` return `None` for an unknown id, `delete_*`
/// returns whether a row was removed.
#[async_trait]
pub trait RosterStore: Send + Sync {
    async fn list_actors(&self) -> Result<Vec<ActorRecord>, StoreError>;
    async fn find_actor(&self, id: i64) -> Result<Option<ActorRecord>, StoreError>;
    async fn insert_actor(&self, new: NewActor) -> Result<ActorRecord, StoreError>;
    async fn update_actor(
        &self,
        id: i64,
        patch: ActorPatch,
    ) -> Result<Option<ActorRecord>, StoreError>;
    async fn delete_actor(&self, id: i64) -> Result<bool, StoreError>;

    async fn list_movies(&self) -> Result<Vec<MovieRecord>, StoreError>;
    async fn find_movie(&self, id: i64) -> Result<Option<MovieRecord>, StoreError>;
    async fn insert_movie(&self, new: NewMovie) -> Result<MovieRecord, StoreError>;
    async fn update_movie(
        &self,
        id: i64,
        patch: MoviePatch,
    ) -> Result<Option<MovieRecord>, StoreError>;
    async fn delete_movie(&self, id: i64) -> Result<bool, StoreError>;
}
