//! Ratings repository for database operations

use sqlx::{Pool, Postgres};

use super::violated_constraint;
use crate::{
    error::{AppError, AppResult, NON_FIELD_ERRORS},
    models::rating::{Rating, RatingPatch, RatingPayload},
};

const RATING_COLUMNS: &str = r#"
    rt.id, rt.rating, rt.book_id, rt.user_id, u.username, b.title AS book_title
"#;

fn constraint_error(constraint: &str, book: Option<i32>) -> Option<AppError> {
    let err = match constraint {
        "ratings_book_id_fkey" => AppError::invalid(
            "book",
            format!("Invalid pk \"{}\" - object does not exist.", book.unwrap_or_default()),
        ),
        "ratings_user_id_fkey" => AppError::Authentication("User not found".to_string()),
        "ratings_book_user_key" => {
            AppError::invalid(NON_FIELD_ERRORS, "This book has already been rated by this user.")
        }
        "ratings_rating_check" => AppError::invalid("rating", "Rating must be between 1 and 10"),
        _ => return None,
    };
    Some(err)
}

fn rating_error(e: sqlx::Error, book: Option<i32>) -> AppError {
    match violated_constraint(&e).and_then(|c| constraint_error(&c, book)) {
        Some(err) => err,
        None => AppError::from(e),
    }
}

#[derive(Clone)]
pub struct RatingsRepository {
    pool: Pool<Postgres>,
}

impl RatingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> AppResult<Vec<Rating>> {
        let query = format!(
            "SELECT {} FROM ratings rt JOIN users u ON u.id = rt.user_id JOIN books b ON b.id = rt.book_id ORDER BY rt.id",
            RATING_COLUMNS
        );
        let rows = sqlx::query_as::<_, Rating>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Rating> {
        let query = format!(
            "SELECT {} FROM ratings rt JOIN users u ON u.id = rt.user_id JOIN books b ON b.id = rt.book_id WHERE rt.id = $1",
            RATING_COLUMNS
        );
        sqlx::query_as::<_, Rating>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Rating {} not found", id)))
    }

    /// Insert the caller's rating for a book, or overwrite the value of the
    /// one they already gave. An existing row keeps its id.
    pub async fn upsert(&self, user_id: i32, data: &RatingPayload) -> AppResult<Rating> {
        let query = format!(
            r#"
            WITH rt AS (
                INSERT INTO ratings (rating, book_id, user_id)
                VALUES ($1, $2, $3)
                ON CONFLICT (book_id, user_id) DO UPDATE SET rating = EXCLUDED.rating
                RETURNING *
            )
            SELECT {} FROM rt JOIN users u ON u.id = rt.user_id JOIN books b ON b.id = rt.book_id
            "#,
            RATING_COLUMNS
        );
        sqlx::query_as::<_, Rating>(&query)
            .bind(data.rating)
            .bind(data.book)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| rating_error(e, Some(data.book)))
    }

    /// Replace value and book of an existing rating; the owner is kept
    pub async fn update(&self, id: i32, data: &RatingPayload) -> AppResult<Rating> {
        let query = format!(
            r#"
            WITH rt AS (
                UPDATE ratings SET rating = $1, book_id = $2
                WHERE id = $3
                RETURNING *
            )
            SELECT {} FROM rt JOIN users u ON u.id = rt.user_id JOIN books b ON b.id = rt.book_id
            "#,
            RATING_COLUMNS
        );
        sqlx::query_as::<_, Rating>(&query)
            .bind(data.rating)
            .bind(data.book)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| rating_error(e, Some(data.book)))?
            .ok_or_else(|| AppError::NotFound(format!("Rating {} not found", id)))
    }

    pub async fn patch(&self, id: i32, data: &RatingPatch) -> AppResult<Rating> {
        let query = format!(
            r#"
            WITH rt AS (
                UPDATE ratings SET rating = COALESCE($1, rating), book_id = COALESCE($2, book_id)
                WHERE id = $3
                RETURNING *
            )
            SELECT {} FROM rt JOIN users u ON u.id = rt.user_id JOIN books b ON b.id = rt.book_id
            "#,
            RATING_COLUMNS
        );
        sqlx::query_as::<_, Rating>(&query)
            .bind(data.rating)
            .bind(data.book)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| rating_error(e, data.book))?
            .ok_or_else(|| AppError::NotFound(format!("Rating {} not found", id)))
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM ratings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Rating {} not found", id)));
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
            constraint_error("ratings_user_id_fkey", Some(1)),
            Some(AppError::Authentication(_))
        ));
        assert!(matches!(
            constraint_error("ratings_book_user_key", Some(1)),
            Some(AppError::Validation(fields)) if fields.contains_key(NON_FIELD_ERRORS)
        ));
        assert!(matches!(
            constraint_error("ratings_rating_check", None),
            Some(AppError::Validation(fields)) if fields.contains_key("rating")
        ));
        assert!(constraint_error("ratings_pkey", None).is_none());
    }
}
