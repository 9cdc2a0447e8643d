//! Genres repository for database operations

use sqlx::{Pool, Postgres};

use super::violated_constraint;
use crate::{
    error::{AppError, AppResult},
    models::genre::{Genre, GenrePatch, GenrePayload},
};

fn unique_title_error(e: sqlx::Error) -> AppError {
    match violated_constraint(&e).as_deref() {
        Some("genres_title_key") => AppError::invalid("title", "A genre with this title already exists."),
        _ => AppError::from(e),
    }
}

#[derive(Clone)]
pub struct GenresRepository {
    pool: Pool<Postgres>,
}

impl GenresRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> AppResult<Vec<Genre>> {
        let rows = sqlx::query_as::<_, Genre>("SELECT id, title FROM genres ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Genre> {
        sqlx::query_as::<_, Genre>("SELECT id, title FROM genres WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Genre {} not found", id)))
    }

    pub async fn create(&self, data: &GenrePayload) -> AppResult<Genre> {
        sqlx::query_as::<_, Genre>("INSERT INTO genres (title) VALUES ($1) RETURNING id, title")
            .bind(&data.title)
            .fetch_one(&self.pool)
            .await
            .map_err(unique_title_error)
    }

    pub async fn update(&self, id: i32, data: &GenrePayload) -> AppResult<Genre> {
        sqlx::query_as::<_, Genre>("UPDATE genres SET title = $1 WHERE id = $2 RETURNING id, title")
            .bind(&data.title)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unique_title_error)?
            .ok_or_else(|| AppError::NotFound(format!("Genre {} not found", id)))
    }

    pub async fn patch(&self, id: i32, data: &GenrePatch) -> AppResult<Genre> {
        sqlx::query_as::<_, Genre>(
            "UPDATE genres SET title = COALESCE($1, title) WHERE id = $2 RETURNING id, title",
        )
        .bind(&data.title)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unique_title_error)?
        .ok_or_else(|| AppError::NotFound(format!("Genre {} not found", id)))
    }

    /// Delete a genre no book refers to
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query_scalar::<_, i32>("SELECT id FROM genres WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Genre {} not found", id)))?;

        let referenced: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM books WHERE genre_id = $1)")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        if referenced {
            return Err(AppError::Protected(format!(
                "Genre {} is referenced by books and cannot be deleted",
                id
            )));
        }

        sqlx::query("DELETE FROM genres WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}
