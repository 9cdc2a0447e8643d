//! Book ratings service

use validator::Validate;

use crate::{
    error::AppResult,
    models::rating::{Rating, RatingPatch, RatingPayload},
    repository::Repository,
};

#[derive(Clone)]
pub struct RatingsService {
    repository: Repository,
}

impl RatingsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Rating>> {
        self.repository.ratings.list().await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Rating> {
        self.repository.ratings.get_by_id(id).await
    }

    /// Rate a book as `user_id`. Rating the same book again overwrites the
    /// previous value and keeps the rating id.
    pub async fn submit(&self, user_id: i32, data: &RatingPayload) -> AppResult<Rating> {
        data.validate()?;
        let rating = self.repository.ratings.upsert(user_id, data).await?;
        tracing::info!(
            "User id={} rated book id={} with {} (rating id={})",
            user_id,
            rating.book_id,
            rating.rating,
            rating.id
        );
        Ok(rating)
    }

    pub async fn update(&self, id: i32, data: &RatingPayload) -> AppResult<Rating> {
        data.validate()?;
        self.repository.ratings.update(id, data).await
    }

    pub async fn patch(&self, id: i32, data: &RatingPatch) -> AppResult<Rating> {
        data.validate()?;
        self.repository.ratings.patch(id, data).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.ratings.delete(id).await?;
        tracing::info!("Deleted rating id={}", id);
        Ok(())
    }
}
