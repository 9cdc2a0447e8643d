//! Rating model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::permissions::Owned;

/// Rating joined with its owner's username and the book title
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Rating {
    pub id: i32,
    pub rating: i16,
    #[serde(skip_serializing)]
    pub book_id: i32,
    #[serde(skip_serializing)]
    pub user_id: i32,
    #[serde(rename = "user")]
    pub username: String,
    pub book_title: String,
}

impl Owned for Rating {
    fn owner_id(&self) -> i32 {
        self.user_id
    }
}

/// Submit / replace rating request; one rating per (book, caller)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RatingPayload {
    /// Book id
    pub book: i32,
    #[validate(range(min = 1, max = 10, message = "Rating must be between 1 and 10"))]
    pub rating: i16,
}

/// Partial update request; omitted fields keep their value
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct RatingPatch {
    pub book: Option<i32>,
    #[validate(range(min = 1, max = 10, message = "Rating must be between 1 and 10"))]
    pub rating: Option<i16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        for (rating, valid) in [(0, false), (1, true), (7, true), (10, true), (11, false), (-3, false)] {
            let payload = RatingPayload { book: 1, rating };
            assert_eq!(payload.validate().is_ok(), valid, "rating {}", rating);
        }
    }

    #[test]
    fn test_patch_bounds() {
        assert!(RatingPatch::default().validate().is_ok());
        assert!(RatingPatch { book: None, rating: Some(10) }.validate().is_ok());
        assert!(RatingPatch { book: None, rating: Some(0) }.validate().is_err());
    }

    #[test]
    fn test_partial_update_limited_to_owner() {
        use crate::{
            models::user::{Role, UserClaims},
            permissions::{Access, Action, Policy},
        };

        let rating = Rating {
            id: 3,
            rating: 8,
            book_id: 1,
            user_id: 2,
            username: "User1".to_string(),
            book_title: "Book1".to_string(),
        };
        let caller = |user_id| UserClaims {
            sub: format!("user{}", user_id),
            user_id,
            role: Role::User,
            exp: 0,
            iat: 0,
        };
        let policy = Policy::ADMIN_OR_OWNER_OR_READ_ONLY;
        assert_eq!(
            policy.evaluate_object(Some(&caller(2)), Action::PartialUpdate, &rating),
            Access::Allow
        );
        assert_eq!(
            policy.evaluate_object(Some(&caller(3)), Action::PartialUpdate, &rating),
            Access::Deny
        );
    }

    #[test]
    fn test_serialized_shape() {
        let rating = Rating {
            id: 3,
            rating: 8,
            book_id: 1,
            user_id: 2,
            username: "User1".to_string(),
            book_title: "Book1".to_string(),
        };
        assert_eq!(
            serde_json::to_value(rating).unwrap(),
            serde_json::json!({"id": 3, "rating": 8, "user": "User1", "book_title": "Book1"})
        );
    }
}
