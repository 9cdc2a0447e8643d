//! Books repository for database operations.
//!
//! Book reads always carry their aggregates (review count, mean rating, the
//! caller's rating); they are computed in the same statement on every fetch.

use sqlx::{Pool, Postgres};

use super::violated_constraint;
use crate::{
    error::{AppError, AppResult},
    models::book::{BookPatch, BookPayload, BookRow, CountChange},
};

/// `$1` is the caller's user id, NULL for anonymous requests
const BOOK_SELECT: &str = r#"
    SELECT b.id, b.title, b.release_year, b.inventory_count, b.description,
           b.author_id, b.genre_id,
           a.name AS author_name,
           g.title AS genre_title,
           (SELECT COUNT(*) FROM reviews r WHERE r.book_id = b.id) AS review_count,
           (SELECT AVG(rt.rating)::float8 FROM ratings rt WHERE rt.book_id = b.id) AS average_rating,
           (SELECT rt.rating FROM ratings rt WHERE rt.book_id = b.id AND rt.user_id = $1) AS caller_rating
    FROM books b
    JOIN authors a ON a.id = b.author_id
    JOIN genres g ON g.id = b.genre_id
"#;

fn reference_error(e: sqlx::Error, author: Option<i32>, genre: Option<i32>) -> AppError {
    match violated_constraint(&e).as_deref() {
        Some("books_author_id_fkey") => AppError::invalid(
            "author",
            format!("Invalid pk \"{}\" - object does not exist.", author.unwrap_or_default()),
        ),
        Some("books_genre_id_fkey") => AppError::invalid(
            "genre",
            format!("Invalid pk \"{}\" - object does not exist.", genre.unwrap_or_default()),
        ),
        Some("books_inventory_count_check") => {
            AppError::invalid("inventory_count", "Inventory count cannot be negative")
        }
        _ => AppError::from(e),
    }
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // READ
    // =========================================================================

    pub async fn list(&self, caller: Option<i32>) -> AppResult<Vec<BookRow>> {
        let query = format!("{} ORDER BY b.id", BOOK_SELECT);
        let rows = sqlx::query_as::<_, BookRow>(&query)
            .bind(caller)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: i32, caller: Option<i32>) -> AppResult<BookRow> {
        let query = format!("{} WHERE b.id = $2", BOOK_SELECT);
        sqlx::query_as::<_, BookRow>(&query)
            .bind(caller)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    /// Current inventory count, None when the book does not exist
    pub async fn inventory_count(&self, id: i32) -> AppResult<Option<i32>> {
        let count = sqlx::query_scalar::<_, i32>("SELECT inventory_count FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn exists(&self, id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM books WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    // =========================================================================
    // WRITE
    // =========================================================================

    /// Insert a book and return its id
    pub async fn create(&self, data: &BookPayload) -> AppResult<i32> {
        sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO books (title, release_year, inventory_count, description, author_id, genre_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&data.title)
        .bind(data.release_year)
        .bind(data.inventory_count.unwrap_or(0))
        .bind(&data.description)
        .bind(data.author)
        .bind(data.genre)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| reference_error(e, Some(data.author), Some(data.genre)))
    }

    /// Replace every field; an omitted inventory count is kept
    pub async fn update(&self, id: i32, data: &BookPayload) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET title = $1, release_year = $2,
                inventory_count = COALESCE($3, inventory_count),
                description = $4, author_id = $5, genre_id = $6
            WHERE id = $7
            "#,
        )
        .bind(&data.title)
        .bind(data.release_year)
        .bind(data.inventory_count)
        .bind(&data.description)
        .bind(data.author)
        .bind(data.genre)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| reference_error(e, Some(data.author), Some(data.genre)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }
        Ok(())
    }

    /// Update only the fields present in `data`
    pub async fn patch(&self, id: i32, data: &BookPatch) -> AppResult<()> {
        if data.is_empty() {
            if !self.exists(id).await? {
                return Err(AppError::NotFound(format!("Book {} not found", id)));
            }
            return Ok(());
        }

        let mut sets = Vec::new();
        let mut idx = 1;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.title, "title");
        add_field!(data.release_year, "release_year");
        add_field!(data.description, "description");
        add_field!(data.inventory_count, "inventory_count");
        add_field!(data.author, "author_id");
        add_field!(data.genre, "genre_id");

        let query = format!("UPDATE books SET {} WHERE id = ${}", sets.join(", "), idx);

        let mut builder = sqlx::query(&query);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.title);
        bind_field!(data.release_year);
        bind_field!(data.description);
        bind_field!(data.inventory_count);
        bind_field!(data.author);
        bind_field!(data.genre);

        let result = builder
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| reference_error(e, data.author, data.genre))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }
        Ok(())
    }

    /// Add `delta` to the inventory count in a single relative update.
    ///
    /// Returns None when no row was changed: either the book does not exist or
    /// the result would leave the `0..=i32::MAX` range.
    pub async fn adjust_inventory_count(&self, id: i32, delta: i64) -> AppResult<Option<CountChange>> {
        let row = sqlx::query_as::<_, CountChange>(
            r#"
            UPDATE books
            SET inventory_count = (inventory_count::bigint + $2)::integer
            WHERE id = $1
              AND inventory_count::bigint + $2 BETWEEN 0 AND 2147483647
            RETURNING id, inventory_count
            "#,
        )
        .bind(id)
        .bind(delta)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Delete a book; its reviews and ratings go with it
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }
        Ok(())
    }
}
