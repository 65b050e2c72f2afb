//! Genres and languages repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::classification::{Genre, Language},
};

#[derive(Clone)]
pub struct ClassificationRepository {
    pool: Pool<Postgres>,
}

impl ClassificationRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        let genres = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(genres)
    }

    pub async fn count_genres(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM genres")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Create a genre; names are unique ignoring case
    pub async fn create_genre(&self, name: &str) -> AppResult<Genre> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM genres WHERE LOWER(name) = LOWER($1))")
                .bind(name)
                .fetch_one(&self.pool)
                .await?;
        if exists {
            return Err(AppError::Conflict(format!("Genre '{}' already exists", name)));
        }

        let genre = sqlx::query_as::<_, Genre>(
            "INSERT INTO genres (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(genre)
    }

    pub async fn list_languages(&self) -> AppResult<Vec<Language>> {
        let languages =
            sqlx::query_as::<_, Language>("SELECT id, name FROM languages ORDER BY name")
                .fetch_all(&self.pool)
                .await?;
        Ok(languages)
    }

    /// Create a language; names are unique ignoring case
    pub async fn create_language(&self, name: &str) -> AppResult<Language> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM languages WHERE LOWER(name) = LOWER($1))",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        if exists {
            return Err(AppError::Conflict(format!("Language '{}' already exists", name)));
        }

        let language = sqlx::query_as::<_, Language>(
            "INSERT INTO languages (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(language)
    }
}
