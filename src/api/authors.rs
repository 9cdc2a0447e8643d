//! Author endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::author::{Author, AuthorPatch, AuthorPayload},
    permissions::{Action, Policy},
    AppState,
};

use super::{IdPath, JsonBody, OptionalUser};

const POLICY: Policy = Policy::ADMIN_OR_READ_ONLY;

/// List all authors
#[utoipa::path(
    get,
    path = "/authors",
    tag = "authors",
    responses(
        (status = 200, description = "List of authors", body = Vec<Author>)
    )
)]
pub async fn list_authors(
    State(state): State<AppState>,
    user: OptionalUser,
) -> AppResult<Json<Vec<Author>>> {
    POLICY.check(user.claims(), Action::List)?;
    let authors = state.services.catalog.list_authors().await?;
    Ok(Json(authors))
}

/// Get author by ID
#[utoipa::path(
    get,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author details", body = Author),
        (status = 404, description = "Author not found")
    )
)]
pub async fn get_author(
    State(state): State<AppState>,
    user: OptionalUser,
    IdPath(id): IdPath,
) -> AppResult<Json<Author>> {
    POLICY.check(user.claims(), Action::Retrieve)?;
    let author = state.services.catalog.get_author(id).await?;
    Ok(Json(author))
}

/// Create an author (admin)
#[utoipa::path(
    post,
    path = "/authors",
    tag = "authors",
    security(("bearer_auth" = [])),
    request_body = AuthorPayload,
    responses(
        (status = 201, description = "Author created", body = Author),
        (status = 400, description = "Empty or duplicate name"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn create_author(
    State(state): State<AppState>,
    user: OptionalUser,
    body: JsonBody,
) -> AppResult<(StatusCode, Json<Author>)> {
    POLICY.check(user.claims(), Action::Create)?;
    let data: AuthorPayload = body.parse()?;
    let author = state.services.catalog.create_author(&data).await?;
    Ok((StatusCode::CREATED, Json(author)))
}

/// Replace an author (admin)
#[utoipa::path(
    put,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Author ID")),
    request_body = AuthorPayload,
    responses(
        (status = 200, description = "Author updated", body = Author),
        (status = 404, description = "Author not found")
    )
)]
pub async fn update_author(
    State(state): State<AppState>,
    user: OptionalUser,
    IdPath(id): IdPath,
    body: JsonBody,
) -> AppResult<Json<Author>> {
    POLICY.check(user.claims(), Action::Update)?;
    let data: AuthorPayload = body.parse()?;
    let author = state.services.catalog.update_author(id, &data).await?;
    Ok(Json(author))
}

/// Partially update an author (admin)
#[utoipa::path(
    patch,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Author ID")),
    request_body = AuthorPatch,
    responses(
        (status = 200, description = "Author updated", body = Author),
        (status = 404, description = "Author not found")
    )
)]
pub async fn patch_author(
    State(state): State<AppState>,
    user: OptionalUser,
    IdPath(id): IdPath,
    body: JsonBody,
) -> AppResult<Json<Author>> {
    POLICY.check(user.claims(), Action::PartialUpdate)?;
    let data: AuthorPatch = body.parse()?;
    let author = state.services.catalog.patch_author(id, &data).await?;
    Ok(Json(author))
}

/// Delete an author (admin); refused while books refer to it
#[utoipa::path(
    delete,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 204, description = "Author deleted"),
        (status = 404, description = "Author not found"),
        (status = 409, description = "Author is referenced by books")
    )
)]
pub async fn delete_author(
    State(state): State<AppState>,
    user: OptionalUser,
    IdPath(id): IdPath,
) -> AppResult<StatusCode> {
    POLICY.check(user.claims(), Action::Destroy)?;
    state.services.catalog.delete_author(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
