//! In-memory store for tests and database-less dev runs.
//!
//! Ids are assigned from a monotonic counter and never reused, so a created
//! record's id is always distinct from every id handed out before it.

use std::sync::RwLock;

use async_trait::async_trait;

use crate::repos::store::{
    ActorPatch, ActorRecord, MoviePatch, MovieRecord, NewActor, NewMovie, RosterStore, StoreError,
};

#[derive(Default)]
struct Inner {
    actors: Vec<ActorRecord>,
    movies: Vec<MovieRecord>,
    next_actor_id: i64,
    next_movie_id: i64,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

// Lock scope never crosses an await; the std RwLock is enough here.
#[async_trait]
impl RosterStore for MemoryStore {
    async fn list_actors(&self) -> Result<Vec<ActorRecord>, StoreError> {
        Ok(self.inner.read().unwrap().actors.clone())
    }

    async fn find_actor(&self, id: i64) -> Result<Option<ActorRecord>, StoreError> {
        let inner = self.inner.read().unwrap();

        Ok(inner.actors.iter().find(|a| a.id == id).cloned())
    }

    async fn insert_actor(&self, new: NewActor) -> Result<ActorRecord, StoreError> {
        let mut inner = self.inner.write().unwrap();

        inner.next_actor_id += 1;
        let record = ActorRecord {
            id: inner.next_actor_id,
            name: new.name,
            age: new.age,
            gender: new.gender,
        };
        inner.actors.push(record.clone());

        Ok(record)
    }

    async fn update_actor(
        &self,
        id: i64,
        patch: ActorPatch,
    ) -> Result<Option<ActorRecord>, StoreError> {
        let mut inner = self.inner.write().unwrap();

        let Some(actor) = inner.actors.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };

        if let Some(name) = patch.name {
            actor.name = name;
        }
        if let Some(age) = patch.age {
            actor.age = age;
        }
        if let Some(gender) = patch.gender {
            actor.gender = gender;
        }

        Ok(Some(actor.clone()))
    }

    async fn delete_actor(&self, id: i64) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().unwrap();

        let before = inner.actors.len();
        inner.actors.retain(|a| a.id != id);

        Ok(inner.actors.len() < before)
    }

    async fn list_movies(&self) -> Result<Vec<MovieRecord>, StoreError> {
        Ok(self.inner.read().unwrap().movies.clone())
    }

    async fn find_movie(&self, id: i64) -> Result<Option<MovieRecord>, StoreError> {
        let inner = self.inner.read().unwrap();

        Ok(inner.movies.iter().find(|m| m.id == id).cloned())
    }

    async fn insert_movie(&self, new: NewMovie) -> Result<MovieRecord, StoreError> {
        let mut inner = self.inner.write().unwrap();

        // Same uniqueness rule the Postgres schema enforces on movies.title.
        if inner.movies.iter().any(|m| m.title == new.title) {
            return Err(StoreError::Conflict("movies.title"));
        }

        inner.next_movie_id += 1;
        let record = MovieRecord {
            id: inner.next_movie_id,
            title: new.title,
            release_date: new.release_date,
        };
        inner.movies.push(record.clone());

        Ok(record)
    }

    async fn update_movie(
        &self,
        id: i64,
        patch: MoviePatch,
    ) -> Result<Option<MovieRecord>, StoreError> {
        let mut inner = self.inner.write().unwrap();

        if let Some(title) = &patch.title {
            if inner.movies.iter().any(|m| m.id != id && &m.title == title) {
                return Err(StoreError::Conflict("movies.title"));
            }
        }

        let Some(movie) = inner.movies.iter_mut().find(|m| m.id == id) else {
            return Ok(None);
        };

        if let Some(title) = patch.title {
            movie.title = title;
        }
        if let Some(release_date) = patch.release_date {
            movie.release_date = release_date;
        }

        Ok(Some(movie.clone()))
    }

    async fn delete_movie(&self, id: i64) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().unwrap();

        let before = inner.movies.len();
        inner.movies.retain(|m| m.id != id);

        Ok(inner.movies.len() < before)
    }
}
