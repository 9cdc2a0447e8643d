//! Book reviews service

use validator::Validate;

use crate::{
    error::AppResult,
    models::review::{Review, ReviewPatch, ReviewPayload},
    repository::Repository,
};

#[derive(Clone)]
pub struct ReviewsService {
    repository: Repository,
}

impl ReviewsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Review>> {
        self.repository.reviews.list().await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Review> {
        self.repository.reviews.get_by_id(id).await
    }

    /// Post a review as `user_id`
    pub async fn create(&self, user_id: i32, data: &ReviewPayload) -> AppResult<Review> {
        data.validate()?;
        let review = self.repository.reviews.create(user_id, data).await?;
        tracing::info!("User id={} reviewed book id={} (review id={})", user_id, review.book_id, review.id);
        Ok(review)
    }

    pub async fn update(&self, id: i32, data: &ReviewPayload) -> AppResult<Review> {
        data.validate()?;
        self.repository.reviews.update(id, data).await
    }

    pub async fn patch(&self, id: i32, data: &ReviewPatch) -> AppResult<Review> {
        data.validate()?;
        self.repository.reviews.patch(id, data).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.reviews.delete(id).await?;
        tracing::info!("Deleted review id={}", id);
        Ok(())
    }
}
