//! Business logic services

pub mod auth;
pub mod catalog;
pub mod ratings;
pub mod reviews;

use crate::{config::AuthConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub reviews: reviews::ReviewsService,
    pub ratings: ratings::RatingsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            catalog: catalog::CatalogService::new(repository.clone()),
            reviews: reviews::ReviewsService::new(repository.clone()),
            ratings: ratings::RatingsService::new(repository.clone()),
            repository,
        }
    }
}
