//! Book (catalog) endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::book::{Book, BookPatch, BookPayload, ChangeCountRequest, CountChange},
    permissions::{Action, Policy},
    AppState,
};

use super::{IdPath, JsonBody, OptionalUser};

const POLICY: Policy = Policy::ADMIN_OR_READ_ONLY;
const CHANGE_COUNT_POLICY: Policy = Policy::ADMIN_OR_AUTHENTICATED;

/// List books with their review count and ratings
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    responses(
        (status = 200, description = "List of books", body = Vec<Book>)
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    user: OptionalUser,
) -> AppResult<Json<Vec<Book>>> {
    POLICY.check(user.claims(), Action::List)?;
    let books = state.services.catalog.list_books(user.user_id()).await?;
    Ok(Json(books))
}

/// Get book details by ID.
///
/// `additional_info.caller_rating` is only present for an authenticated
/// caller who rated the book.
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    user: OptionalUser,
    IdPath(id): IdPath,
) -> AppResult<Json<Book>> {
    POLICY.check(user.claims(), Action::Retrieve)?;
    let book = state.services.catalog.get_book(id, user.user_id()).await?;
    Ok(Json(book))
}

/// Create a new book (admin)
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = BookPayload,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    user: OptionalUser,
    body: JsonBody,
) -> AppResult<(StatusCode, Json<Book>)> {
    POLICY.check(user.claims(), Action::Create)?;
    let data: BookPayload = body.parse()?;
    let book = state.services.catalog.create_book(&data, user.user_id()).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Replace a book (admin)
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    request_body = BookPayload,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    user: OptionalUser,
    IdPath(id): IdPath,
    body: JsonBody,
) -> AppResult<Json<Book>> {
    POLICY.check(user.claims(), Action::Update)?;
    let data: BookPayload = body.parse()?;
    let book = state.services.catalog.update_book(id, &data, user.user_id()).await?;
    Ok(Json(book))
}

/// Partially update a book (admin)
#[utoipa::path(
    patch,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    request_body = BookPatch,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn patch_book(
    State(state): State<AppState>,
    user: OptionalUser,
    IdPath(id): IdPath,
    body: JsonBody,
) -> AppResult<Json<Book>> {
    POLICY.check(user.claims(), Action::PartialUpdate)?;
    let data: BookPatch = body.parse()?;
    let book = state.services.catalog.patch_book(id, &data, user.user_id()).await?;
    Ok(Json(book))
}

/// Delete a book (admin) with its reviews and ratings
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    user: OptionalUser,
    IdPath(id): IdPath,
) -> AppResult<StatusCode> {
    POLICY.check(user.claims(), Action::Destroy)?;
    state.services.catalog.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add or remove copies of a book
#[utoipa::path(
    patch,
    path = "/books/{id}/change-count",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    request_body = ChangeCountRequest,
    responses(
        (status = 200, description = "Inventory count changed", body = CountChange),
        (status = 400, description = "Not an integer, or the count would become negative"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn change_count(
    State(state): State<AppState>,
    user: OptionalUser,
    IdPath(id): IdPath,
    body: JsonBody,
) -> AppResult<Json<CountChange>> {
    CHANGE_COUNT_POLICY.check(user.claims(), Action::PartialUpdate)?;
    // Unknown book wins over a bad body
    let current = state.services.catalog.inventory_count(id).await?;
    let delta = body.parse::<ChangeCountRequest>()?.delta()?;
    let change = state.services.catalog.change_count(id, current, delta).await?;
    Ok(Json(change))
}
