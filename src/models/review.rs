//! Review model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::permissions::Owned;

/// Review joined with its author's username and the book title
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Review {
    pub id: i32,
    pub review: String,
    #[serde(skip_serializing)]
    pub book_id: i32,
    #[serde(skip_serializing)]
    pub user_id: i32,
    /// Username of the reviewer
    #[serde(rename = "user")]
    pub username: String,
    pub book_title: String,
}

impl Owned for Review {
    fn owner_id(&self) -> i32 {
        self.user_id
    }
}

/// Create / replace review request; the reviewer is always the caller
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReviewPayload {
    /// Book id
    pub book: i32,
    #[validate(length(min = 1, message = "Review must not be empty"))]
    pub review: String,
}

/// Partial update request; omitted fields keep their value
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct ReviewPatch {
    pub book: Option<i32>,
    #[validate(length(min = 1, message = "Review must not be empty"))]
    pub review: Option<String>,
}
