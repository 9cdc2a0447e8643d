//! Genre endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::genre::{Genre, GenrePatch, GenrePayload},
    permissions::{Action, Policy},
    AppState,
};

use super::{IdPath, JsonBody, OptionalUser};

const POLICY: Policy = Policy::ADMIN_OR_READ_ONLY;

/// List all genres
#[utoipa::path(
    get,
    path = "/genres",
    tag = "genres",
    responses(
        (status = 200, description = "List of genres", body = Vec<Genre>)
    )
)]
pub async fn list_genres(
    State(state): State<AppState>,
    user: OptionalUser,
) -> AppResult<Json<Vec<Genre>>> {
    POLICY.check(user.claims(), Action::List)?;
    let genres = state.services.catalog.list_genres().await?;
    Ok(Json(genres))
}

/// Get genre by ID
#[utoipa::path(
    get,
    path = "/genres/{id}",
    tag = "genres",
    params(("id" = i32, Path, description = "Genre ID")),
    responses(
        (status = 200, description = "Genre details", body = Genre),
        (status = 404, description = "Genre not found")
    )
)]
pub async fn get_genre(
    State(state): State<AppState>,
    user: OptionalUser,
    IdPath(id): IdPath,
) -> AppResult<Json<Genre>> {
    POLICY.check(user.claims(), Action::Retrieve)?;
    let genre = state.services.catalog.get_genre(id).await?;
    Ok(Json(genre))
}

/// Create a genre (admin)
#[utoipa::path(
    post,
    path = "/genres",
    tag = "genres",
    security(("bearer_auth" = [])),
    request_body = GenrePayload,
    responses(
        (status = 201, description = "Genre created", body = Genre),
        (status = 400, description = "Empty or duplicate title"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn create_genre(
    State(state): State<AppState>,
    user: OptionalUser,
    body: JsonBody,
) -> AppResult<(StatusCode, Json<Genre>)> {
    POLICY.check(user.claims(), Action::Create)?;
    let data: GenrePayload = body.parse()?;
    let genre = state.services.catalog.create_genre(&data).await?;
    Ok((StatusCode::CREATED, Json(genre)))
}

/// Replace a genre (admin)
#[utoipa::path(
    put,
    path = "/genres/{id}",
    tag = "genres",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Genre ID")),
    request_body = GenrePayload,
    responses(
        (status = 200, description = "Genre updated", body = Genre),
        (status = 404, description = "Genre not found")
    )
)]
pub async fn update_genre(
    State(state): State<AppState>,
    user: OptionalUser,
    IdPath(id): IdPath,
    body: JsonBody,
) -> AppResult<Json<Genre>> {
    POLICY.check(user.claims(), Action::Update)?;
    let data: GenrePayload = body.parse()?;
    let genre = state.services.catalog.update_genre(id, &data).await?;
    Ok(Json(genre))
}

/// Partially update a genre (admin)
#[utoipa::path(
    patch,
    path = "/genres/{id}",
    tag = "genres",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Genre ID")),
    request_body = GenrePatch,
    responses(
        (status = 200, description = "Genre updated", body = Genre),
        (status = 404, description = "Genre not found")
    )
)]
pub async fn patch_genre(
    State(state): State<AppState>,
    user: OptionalUser,
    IdPath(id): IdPath,
    body: JsonBody,
) -> AppResult<Json<Genre>> {
    POLICY.check(user.claims(), Action::PartialUpdate)?;
    let data: GenrePatch = body.parse()?;
    let genre = state.services.catalog.patch_genre(id, &data).await?;
    Ok(Json(genre))
}

/// Delete a genre (admin); refused while books refer to it
#[utoipa::path(
    delete,
    path = "/genres/{id}",
    tag = "genres",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Genre ID")),
    responses(
        (status = 204, description = "Genre deleted"),
        (status = 404, description = "Genre not found"),
        (status = 409, description = "Genre is referenced by books")
    )
)]
pub async fn delete_genre(
    State(state): State<AppState>,
    user: OptionalUser,
    IdPath(id): IdPath,
) -> AppResult<StatusCode> {
    POLICY.check(user.claims(), Action::Destroy)?;
    state.services.catalog.delete_genre(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
