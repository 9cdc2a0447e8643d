//! Rating endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::{AppError, AppResult},
    models::rating::{Rating, RatingPatch, RatingPayload},
    permissions::{Action, Policy},
    AppState,
};

use super::{IdPath, JsonBody, OptionalUser};

const POLICY: Policy = Policy::ADMIN_OR_OWNER_OR_READ_ONLY;

/// List all ratings
#[utoipa::path(
    get,
    path = "/ratings",
    tag = "ratings",
    responses(
        (status = 200, description = "List of ratings", body = Vec<Rating>)
    )
)]
pub async fn list_ratings(
    State(state): State<AppState>,
    user: OptionalUser,
) -> AppResult<Json<Vec<Rating>>> {
    POLICY.check(user.claims(), Action::List)?;
    let ratings = state.services.ratings.list().await?;
    Ok(Json(ratings))
}

/// Get rating by ID
#[utoipa::path(
    get,
    path = "/ratings/{id}",
    tag = "ratings",
    params(("id" = i32, Path, description = "Rating ID")),
    responses(
        (status = 200, description = "Rating details", body = Rating),
        (status = 404, description = "Rating not found")
    )
)]
pub async fn get_rating(
    State(state): State<AppState>,
    user: OptionalUser,
    IdPath(id): IdPath,
) -> AppResult<Json<Rating>> {
    POLICY.check(user.claims(), Action::Retrieve)?;
    let rating = state.services.ratings.get_by_id(id).await?;
    POLICY.check_object(user.claims(), Action::Retrieve, &rating)?;
    Ok(Json(rating))
}

/// Rate a book as the calling user.
///
/// Rating a book the caller already rated replaces the value in place and the
/// rating keeps its id.
#[utoipa::path(
    post,
    path = "/ratings",
    tag = "ratings",
    security(("bearer_auth" = [])),
    request_body = RatingPayload,
    responses(
        (status = 201, description = "Rating stored", body = Rating),
        (status = 400, description = "Rating out of range or unknown book"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn submit_rating(
    State(state): State<AppState>,
    user: OptionalUser,
    body: JsonBody,
) -> AppResult<(StatusCode, Json<Rating>)> {
    POLICY.check(user.claims(), Action::Create)?;
    let user_id = user
        .user_id()
        .ok_or_else(|| AppError::Authentication("Authentication credentials were not provided".to_string()))?;
    let data: RatingPayload = body.parse()?;
    let rating = state.services.ratings.submit(user_id, &data).await?;
    Ok((StatusCode::CREATED, Json(rating)))
}

/// Replace a rating (owner or admin)
#[utoipa::path(
    put,
    path = "/ratings/{id}",
    tag = "ratings",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Rating ID")),
    request_body = RatingPayload,
    responses(
        (status = 200, description = "Rating updated", body = Rating),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Rating not found")
    )
)]
pub async fn update_rating(
    State(state): State<AppState>,
    user: OptionalUser,
    IdPath(id): IdPath,
    body: JsonBody,
) -> AppResult<Json<Rating>> {
    POLICY.check(user.claims(), Action::Update)?;
    let rating = state.services.ratings.get_by_id(id).await?;
    POLICY.check_object(user.claims(), Action::Update, &rating)?;

    let data: RatingPayload = body.parse()?;
    let rating = state.services.ratings.update(id, &data).await?;
    Ok(Json(rating))
}

/// Partially update a rating (owner or admin)
#[utoipa::path(
    patch,
    path = "/ratings/{id}",
    tag = "ratings",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Rating ID")),
    request_body = RatingPatch,
    responses(
        (status = 200, description = "Rating updated", body = Rating),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Rating not found")
    )
)]
pub async fn patch_rating(
    State(state): State<AppState>,
    user: OptionalUser,
    IdPath(id): IdPath,
    body: JsonBody,
) -> AppResult<Json<Rating>> {
    POLICY.check(user.claims(), Action::PartialUpdate)?;
    let rating = state.services.ratings.get_by_id(id).await?;
    POLICY.check_object(user.claims(), Action::PartialUpdate, &rating)?;

    let data: RatingPatch = body.parse()?;
    let rating = state.services.ratings.patch(id, &data).await?;
    Ok(Json(rating))
}

/// Delete a rating (owner or admin)
#[utoipa::path(
    delete,
    path = "/ratings/{id}",
    tag = "ratings",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Rating ID")),
    responses(
        (status = 204, description = "Rating deleted"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Rating not found")
    )
)]
pub async fn delete_rating(
    State(state): State<AppState>,
    user: OptionalUser,
    IdPath(id): IdPath,
) -> AppResult<StatusCode> {
    POLICY.check(user.claims(), Action::Destroy)?;
    let rating = state.services.ratings.get_by_id(id).await?;
    POLICY.check_object(user.claims(), Action::Destroy, &rating)?;

    state.services.ratings.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
