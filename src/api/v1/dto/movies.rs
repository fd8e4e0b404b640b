/*
 * Responsibility
 * - Movies request/response DTOs
 * - release_date rides serde's ISO-8601 date handling (chrono::NaiveDate);
 *   a malformed date is a deserialization failure, not a validation one
 */
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::repos::store::{MoviePatch, MovieRecord, NewMovie};

#[derive(Debug, Deserialize)]
pub struct CreateMovieRequest {
    pub title: String,
    pub release_date: NaiveDate,
}

impl CreateMovieRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.title.trim().is_empty() {
            return Err("title is required");
        }

        Ok(())
    }

    pub fn into_new(self) -> NewMovie {
        NewMovie {
            title: self.title,
            release_date: self.release_date,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateMovieRequest {
    pub title: Option<String>,
    pub release_date: Option<NaiveDate>,
}

impl UpdateMovieRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(title) = &self.title
            && title.trim().is_empty()
        {
            return Err("title cannot be empty");
        }

        Ok(())
    }

    pub fn into_patch(self) -> MoviePatch {
        MoviePatch {
            title: self.title,
            release_date: self.release_date,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MovieResponse {
    pub id: i64,
    pub title: String,
    pub release_date: NaiveDate,
}

impl From<&MovieRecord> for MovieResponse {
    fn from(record: &MovieRecord) -> Self {
        MovieResponse {
            id: record.id,
            title: record.title.clone(),
            release_date: record.release_date,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MovieListResponse {
    pub success: bool,
    pub movies: Vec<MovieResponse>,
    pub total_movies: usize,
}

#[derive(Debug, Serialize)]
pub struct CreateMovieResponse {
    pub success: bool,
    pub created_movie_id: i64,
    pub movies: Vec<MovieResponse>,
    pub total_movies: usize,
}

#[derive(Debug, Serialize)]
pub struct EditMovieResponse {
    pub success: bool,
    pub edited_movie_id: i64,
    pub movies: Vec<MovieResponse>,
    pub total_movies: usize,
}

#[derive(Debug, Serialize)]
pub struct DeleteMovieResponse {
    pub success: bool,
    pub deleted_movie_id: i64,
    pub movies: Vec<MovieResponse>,
    pub total_movies: usize,
}
