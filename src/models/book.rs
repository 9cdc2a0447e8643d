//! Book model, derived rating information and inventory count arithmetic

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Book row joined with its author, genre and per-request aggregates
#[derive(Debug, Clone, FromRow)]
pub struct BookRow {
    pub id: i32,
    pub title: String,
    pub release_year: i16,
    pub inventory_count: i32,
    pub description: String,
    pub author_id: i32,
    pub genre_id: i32,
    pub author_name: String,
    pub genre_title: String,
    pub review_count: i64,
    pub average_rating: Option<f64>,
    pub caller_rating: Option<i16>,
}

/// Book as returned by the API
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub release_year: i16,
    /// Number of physical copies held
    pub inventory_count: i32,
    pub description: String,
    /// Author name
    pub author: String,
    /// Genre title
    pub genre: String,
    pub additional_info: AdditionalInfo,
}

/// Values computed from reviews and ratings on every fetch
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdditionalInfo {
    pub review_count: i64,
    /// Mean of all ratings, two decimals; absent when the book has no rating
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    /// The caller's own rating; absent for anonymous callers or when not rated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caller_rating: Option<i16>,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Book {
            id: row.id,
            title: row.title,
            release_year: row.release_year,
            inventory_count: row.inventory_count,
            description: row.description,
            author: row.author_name,
            genre: row.genre_title,
            additional_info: AdditionalInfo {
                review_count: row.review_count,
                average_rating: row.average_rating.map(round_rating),
                caller_rating: row.caller_rating,
            },
        }
    }
}

/// Round a mean rating to two decimal places
pub fn round_rating(mean: f64) -> f64 {
    (mean * 100.0).round() / 100.0
}

/// Create / full update request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BookPayload {
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: String,
    #[validate(range(min = 0, message = "Release year cannot be negative"))]
    pub release_year: i16,
    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: String,
    /// Defaults to 0 on create, left unchanged on update when omitted
    #[validate(range(min = 0, message = "Inventory count cannot be negative"))]
    pub inventory_count: Option<i32>,
    /// Author id
    pub author: i32,
    /// Genre id
    pub genre: i32,
}

/// Partial update request
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct BookPatch {
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: Option<String>,
    #[validate(range(min = 0, message = "Release year cannot be negative"))]
    pub release_year: Option<i16>,
    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Inventory count cannot be negative"))]
    pub inventory_count: Option<i32>,
    pub author: Option<i32>,
    pub genre: Option<i32>,
}

impl BookPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.release_year.is_none()
            && self.description.is_none()
            && self.inventory_count.is_none()
            && self.author.is_none()
            && self.genre.is_none()
    }
}

/// Inventory count adjustment request
#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangeCountRequest {
    /// Signed number of copies to add (negative to remove)
    #[serde(default)]
    #[schema(value_type = i64)]
    pub value: serde_json::Value,
}

impl ChangeCountRequest {
    /// The requested delta. Integers, integral floats (`1.0`) and their
    /// string forms (`" 3 "`, `"3.00"`) are accepted.
    pub fn delta(&self) -> AppResult<i64> {
        let delta = match &self.value {
            serde_json::Value::Null => {
                return Err(AppError::invalid("value", "This field is required."))
            }
            serde_json::Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
            serde_json::Value::String(s) => parse_integer(s.trim()),
            _ => None,
        };
        delta.ok_or_else(|| AppError::invalid("value", "A valid integer is required."))
    }
}

fn integral(f: f64) -> Option<i64> {
    // i64::MAX is not exactly representable; stay strictly below 2^63
    (f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64)
        .then(|| f as i64)
}

/// Integer text, optionally followed by a decimal point and zeros
fn parse_integer(s: &str) -> Option<i64> {
    let digits = match s.split_once('.') {
        Some((head, zeros)) if zeros.bytes().all(|b| b == b'0') => head,
        Some(_) => return None,
        None => s,
    };
    digits.parse().ok()
}

/// Inventory count after an adjustment
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct CountChange {
    pub id: i32,
    pub inventory_count: i32,
}

/// Count resulting from adding `delta` to `current`
pub fn adjusted_count(current: i32, delta: i64) -> AppResult<i32> {
    let new_count = (current as i64)
        .checked_add(delta)
        .ok_or_else(|| AppError::invalid("value", "resulting count is out of range"))?;
    if new_count < 0 {
        return Err(AppError::invalid("value", "resulting count cannot be negative"));
    }
    i32::try_from(new_count)
        .map_err(|_| AppError::invalid("value", "resulting count is out of range"))
}
