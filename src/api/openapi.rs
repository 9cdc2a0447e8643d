//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, authors, books, genres, health, ratings, reviews};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Librest API",
        version = "1.0.0",
        description = "Library catalog REST API: books, authors, genres, reviews and ratings",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    modifiers(&SecurityAddon),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::me,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::update_author,
        authors::patch_author,
        authors::delete_author,
        // Genres
        genres::list_genres,
        genres::get_genre,
        genres::create_genre,
        genres::update_genre,
        genres::patch_genre,
        genres::delete_genre,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::patch_book,
        books::delete_book,
        books::change_count,
        // Reviews
        reviews::list_reviews,
        reviews::get_review,
        reviews::create_review,
        reviews::update_review,
        reviews::patch_review,
        reviews::delete_review,
        // Ratings
        ratings::list_ratings,
        ratings::get_rating,
        ratings::submit_rating,
        ratings::update_rating,
        ratings::patch_rating,
        ratings::delete_rating,
    ),
    components(
        schemas(
            // Auth
            auth::LoginResponse,
            crate::models::user::User,
            crate::models::user::Role,
            crate::models::user::RegisterRequest,
            crate::models::user::LoginRequest,
            // Catalog
            crate::models::author::Author,
            crate::models::author::AuthorPayload,
            crate::models::author::AuthorPatch,
            crate::models::genre::Genre,
            crate::models::genre::GenrePayload,
            crate::models::genre::GenrePatch,
            crate::models::book::Book,
            crate::models::book::AdditionalInfo,
            crate::models::book::BookPayload,
            crate::models::book::BookPatch,
            crate::models::book::ChangeCountRequest,
            crate::models::book::CountChange,
            // Reviews and ratings
            crate::models::review::Review,
            crate::models::review::ReviewPayload,
            crate::models::review::ReviewPatch,
            crate::models::rating::Rating,
            crate::models::rating::RatingPayload,
            crate::models::rating::RatingPatch,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration and authentication"),
        (name = "authors", description = "Author management"),
        (name = "genres", description = "Genre management"),
        (name = "books", description = "Book catalog and inventory"),
        (name = "reviews", description = "Book reviews"),
        (name = "ratings", description = "Book ratings")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
