//! Authors repository for database operations

use sqlx::{Pool, Postgres};

use super::violated_constraint;
use crate::{
    error::{AppError, AppResult},
    models::author::{Author, AuthorPatch, AuthorPayload},
};

fn unique_name_error(e: sqlx::Error) -> AppError {
    match violated_constraint(&e).as_deref() {
        Some("authors_name_key") => AppError::invalid("name", "An author with this name already exists."),
        _ => AppError::from(e),
    }
}

#[derive(Clone)]
pub struct AuthorsRepository {
    pool: Pool<Postgres>,
}

impl AuthorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> AppResult<Vec<Author>> {
        let rows = sqlx::query_as::<_, Author>("SELECT id, name FROM authors ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Author> {
        sqlx::query_as::<_, Author>("SELECT id, name FROM authors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))
    }

    pub async fn create(&self, data: &AuthorPayload) -> AppResult<Author> {
        sqlx::query_as::<_, Author>("INSERT INTO authors (name) VALUES ($1) RETURNING id, name")
            .bind(&data.name)
            .fetch_one(&self.pool)
            .await
            .map_err(unique_name_error)
    }

    pub async fn update(&self, id: i32, data: &AuthorPayload) -> AppResult<Author> {
        sqlx::query_as::<_, Author>("UPDATE authors SET name = $1 WHERE id = $2 RETURNING id, name")
            .bind(&data.name)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unique_name_error)?
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))
    }

    /// Update the name when given; an empty patch only checks existence
    pub async fn patch(&self, id: i32, data: &AuthorPatch) -> AppResult<Author> {
        sqlx::query_as::<_, Author>(
            "UPDATE authors SET name = COALESCE($1, name) WHERE id = $2 RETURNING id, name",
        )
        .bind(&data.name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unique_name_error)?
        .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))
    }

    /// Delete an author no book refers to.
    ///
    /// The author row is locked for the duration of the check so a book
    /// cannot start referencing it between the check and the delete.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query_scalar::<_, i32>("SELECT id FROM authors WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))?;

        let books: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE author_id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if books > 0 {
            return Err(AppError::Protected(format!(
                "Author {} is referenced by {} book(s) and cannot be deleted",
                id, books
            )));
        }

        sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}
