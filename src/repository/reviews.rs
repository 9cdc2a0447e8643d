//! Reviews repository for database operations

use sqlx::{Pool, Postgres};

use super::violated_constraint;
use crate::{
    error::{AppError, AppResult},
    models::review::{Review, ReviewPatch, ReviewPayload},
};

const REVIEW_COLUMNS: &str = r#"
    r.id, r.review, r.book_id, r.user_id, u.username, b.title AS book_title
"#;

fn constraint_error(constraint: &str, book: Option<i32>) -> Option<AppError> {
    match constraint {
        "reviews_book_id_fkey" => Some(AppError::invalid(
            "book",
            format!("Invalid pk \"{}\" - object does not exist.", book.unwrap_or_default()),
        )),
        // Token still valid for an account that is gone
        "reviews_user_id_fkey" => Some(AppError::Authentication("User not found".to_string())),
        _ => None,
    }
}

fn review_error(e: sqlx::Error, book: Option<i32>) -> AppError {
    match violated_constraint(&e).and_then(|c| constraint_error(&c, book)) {
        Some(err) => err,
        None => AppError::from(e),
    }
}

#[derive(Clone)]
pub struct ReviewsRepository {
    pool: Pool<Postgres>,
}

impl ReviewsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> AppResult<Vec<Review>> {
        let query = format!(
            "SELECT {} FROM reviews r JOIN users u ON u.id = r.user_id JOIN books b ON b.id = r.book_id ORDER BY r.id",
            REVIEW_COLUMNS
        );
        let rows = sqlx::query_as::<_, Review>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Review> {
        let query = format!(
            "SELECT {} FROM reviews r JOIN users u ON u.id = r.user_id JOIN books b ON b.id = r.book_id WHERE r.id = $1",
            REVIEW_COLUMNS
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Review {} not found", id)))
    }

    pub async fn create(&self, user_id: i32, data: &ReviewPayload) -> AppResult<Review> {
        let query = format!(
            r#"
            WITH r AS (
                INSERT INTO reviews (review, book_id, user_id)
                VALUES ($1, $2, $3)
                RETURNING *
            )
            SELECT {} FROM r JOIN users u ON u.id = r.user_id JOIN books b ON b.id = r.book_id
            "#,
            REVIEW_COLUMNS
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(&data.review)
            .bind(data.book)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| review_error(e, Some(data.book)))
    }

    /// Replace text and book; the reviewer is kept
    pub async fn update(&self, id: i32, data: &ReviewPayload) -> AppResult<Review> {
        let query = format!(
            r#"
            WITH r AS (
                UPDATE reviews SET review = $1, book_id = $2
                WHERE id = $3
                RETURNING *
            )
            SELECT {} FROM r JOIN users u ON u.id = r.user_id JOIN books b ON b.id = r.book_id
            "#,
            REVIEW_COLUMNS
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(&data.review)
            .bind(data.book)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| review_error(e, Some(data.book)))?
            .ok_or_else(|| AppError::NotFound(format!("Review {} not found", id)))
    }

    /// Change only the fields present in `data`
    pub async fn patch(&self, id: i32, data: &ReviewPatch) -> AppResult<Review> {
        let query = format!(
            r#"
            WITH r AS (
                UPDATE reviews SET review = COALESCE($1, review), book_id = COALESCE($2, book_id)
                WHERE id = $3
                RETURNING *
            )
            SELECT {} FROM r JOIN users u ON u.id = r.user_id JOIN books b ON b.id = r.book_id
            "#,
            REVIEW_COLUMNS
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(&data.review)
            .bind(data.book)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| review_error(e, data.book))?
            .ok_or_else(|| AppError::NotFound(format!("Review {} not found", id)))
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Review {} not found", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_errors() {
        assert!(matches!(
            constraint_error("reviews_book_id_fkey", Some(4)),
            Some(AppError::Validation(fields)) if fields.contains_key("book")
        ));
        assert!(matches!(
            constraint_error("reviews_user_id_fkey", Some(4)),
            Some(AppError::Authentication(_))
        ));
        assert!(constraint_error("reviews_pkey", None).is_none());
    }
}
