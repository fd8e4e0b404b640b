//! Postgres-backed store.
//!
//! Expected schema (managed outside this service):
//!   actors(id BIGSERIAL PK, name TEXT NOT NULL, age INT NOT NULL,
//!          gender TEXT NOT NULL)
//!   movies(id BIGSERIAL PK, title TEXT NOT NULL UNIQUE,
//!          release_date DATE NOT NULL)

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::repos::store::{
    ActorPatch, ActorRecord, MoviePatch, MovieRecord, NewActor, NewMovie, RosterStore, StoreError,
};

#[derive(Debug, Clone, sqlx::FromRow)]
struct ActorRow {
    id: i64,
    name: String,
    age: i32,
    gender: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct MovieRow {
    id: i64,
    title: String,
    release_date: NaiveDate,
}

impl From<ActorRow> for ActorRecord {
    fn from(row: ActorRow) -> Self {
        ActorRecord {
            id: row.id,
            name: row.name,
            age: row.age,
            gender: row.gender,
        }
    }
}

impl From<MovieRow> for MovieRecord {
    fn from(row: MovieRow) -> Self {
        MovieRecord {
            id: row.id,
            title: row.title,
            release_date: row.release_date,
        }
    }
}

// Postgres unique_violation
fn map_insert_err(e: sqlx::Error, constraint: &'static str) -> StoreError {
    if let sqlx::Error::Database(dbe) = &e
        && dbe.code().as_deref() == Some("23505")
    {
        return StoreError::Conflict(constraint);
    }
    StoreError::Db(e)
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RosterStore for PgStore {
    async fn list_actors(&self) -> Result<Vec<ActorRecord>, StoreError> {
        let rows = sqlx::query_as::<_, ActorRow>(
            r#"
            SELECT id, name, age, gender
            FROM actors
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_actor(&self, id: i64) -> Result<Option<ActorRecord>, StoreError> {
        let row = sqlx::query_as::<_, ActorRow>(
            r#"
            SELECT id, name, age, gender
            FROM actors
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn insert_actor(&self, new: NewActor) -> Result<ActorRecord, StoreError> {
        let row = sqlx::query_as::<_, ActorRow>(
            r#"
            INSERT INTO actors (name, age, gender)
            VALUES ($1, $2, $3)
            RETURNING id, name, age, gender
            "#,
        )
        .bind(&new.name)
        .bind(new.age)
        .bind(&new.gender)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn update_actor(
        &self,
        id: i64,
        patch: ActorPatch,
    ) -> Result<Option<ActorRecord>, StoreError> {
        let row = sqlx::query_as::<_, ActorRow>(
            r#"
            UPDATE actors
            SET
                name = COALESCE($2, name),
                age = COALESCE($3, age),
                gender = COALESCE($4, gender)
            WHERE id = $1
            RETURNING id, name, age, gender
            "#,
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.age)
        .bind(patch.gender)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn delete_actor(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM actors
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_movies(&self) -> Result<Vec<MovieRecord>, StoreError> {
        let rows = sqlx::query_as::<_, MovieRow>(
            r#"
            SELECT id, title, release_date
            FROM movies
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_movie(&self, id: i64) -> Result<Option<MovieRecord>, StoreError> {
        let row = sqlx::query_as::<_, MovieRow>(
            r#"
            SELECT id, title, release_date
            FROM movies
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn insert_movie(&self, new: NewMovie) -> Result<MovieRecord, StoreError> {
        let row = sqlx::query_as::<_, MovieRow>(
            r#"
            INSERT INTO movies (title, release_date)
            VALUES ($1, $2)
            RETURNING id, title, release_date
            "#,
        )
        .bind(&new.title)
        .bind(new.release_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_err(e, "movies.title"))?;

        Ok(row.into())
    }

    async fn update_movie(
        &self,
        id: i64,
        patch: MoviePatch,
    ) -> Result<Option<MovieRecord>, StoreError> {
        let row = sqlx::query_as::<_, MovieRow>(
            r#"
            UPDATE movies
            SET
                title = COALESCE($2, title),
                release_date = COALESCE($3, release_date)
            WHERE id = $1
            RETURNING id, title, release_date
            "#,
        )
        .bind(id)
        .bind(patch.title)
        .bind(patch.release_date)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_insert_err(e, "movies.title"))?;

        Ok(row.map(Into::into))
    }

    async fn delete_movie(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM movies
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
