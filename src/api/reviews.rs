//! Review endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::{AppError, AppResult},
    models::review::{Review, ReviewPatch, ReviewPayload},
    permissions::{Action, Policy},
    AppState,
};

use super::{IdPath, JsonBody, OptionalUser};

const POLICY: Policy = Policy::ADMIN_OR_OWNER_OR_READ_ONLY;

/// List all reviews
#[utoipa::path(
    get,
    path = "/reviews",
    tag = "reviews",
    responses(
        (status = 200, description = "List of reviews", body = Vec<Review>)
    )
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    user: OptionalUser,
) -> AppResult<Json<Vec<Review>>> {
    POLICY.check(user.claims(), Action::List)?;
    let reviews = state.services.reviews.list().await?;
    Ok(Json(reviews))
}

/// Get review by ID
#[utoipa::path(
    get,
    path = "/reviews/{id}",
    tag = "reviews",
    params(("id" = i32, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Review details", body = Review),
        (status = 404, description = "Review not found")
    )
)]
pub async fn get_review(
    State(state): State<AppState>,
    user: OptionalUser,
    IdPath(id): IdPath,
) -> AppResult<Json<Review>> {
    POLICY.check(user.claims(), Action::Retrieve)?;
    let review = state.services.reviews.get_by_id(id).await?;
    POLICY.check_object(user.claims(), Action::Retrieve, &review)?;
    Ok(Json(review))
}

/// Review a book as the calling user
#[utoipa::path(
    post,
    path = "/reviews",
    tag = "reviews",
    security(("bearer_auth" = [])),
    request_body = ReviewPayload,
    responses(
        (status = 201, description = "Review created", body = Review),
        (status = 400, description = "Empty review or unknown book"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_review(
    State(state): State<AppState>,
    user: OptionalUser,
    body: JsonBody,
) -> AppResult<(StatusCode, Json<Review>)> {
    POLICY.check(user.claims(), Action::Create)?;
    let user_id = user
        .user_id()
        .ok_or_else(|| AppError::Authentication("Authentication credentials were not provided".to_string()))?;
    let data: ReviewPayload = body.parse()?;
    let review = state.services.reviews.create(user_id, &data).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// Replace a review (owner or admin)
#[utoipa::path(
    put,
    path = "/reviews/{id}",
    tag = "reviews",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Review ID")),
    request_body = ReviewPayload,
    responses(
        (status = 200, description = "Review updated", body = Review),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Review not found")
    )
)]
pub async fn update_review(
    State(state): State<AppState>,
    user: OptionalUser,
    IdPath(id): IdPath,
    body: JsonBody,
) -> AppResult<Json<Review>> {
    POLICY.check(user.claims(), Action::Update)?;
    let review = state.services.reviews.get_by_id(id).await?;
    POLICY.check_object(user.claims(), Action::Update, &review)?;

    let data: ReviewPayload = body.parse()?;
    let review = state.services.reviews.update(id, &data).await?;
    Ok(Json(review))
}

/// Partially update a review (owner or admin)
#[utoipa::path(
    patch,
    path = "/reviews/{id}",
    tag = "reviews",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Review ID")),
    request_body = ReviewPatch,
    responses(
        (status = 200, description = "Review updated", body = Review),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Review not found")
    )
)]
pub async fn patch_review(
    State(state): State<AppState>,
    user: OptionalUser,
    IdPath(id): IdPath,
    body: JsonBody,
) -> AppResult<Json<Review>> {
    POLICY.check(user.claims(), Action::PartialUpdate)?;
    let review = state.services.reviews.get_by_id(id).await?;
    POLICY.check_object(user.claims(), Action::PartialUpdate, &review)?;

    let data: ReviewPatch = body.parse()?;
    let review = state.services.reviews.patch(id, &data).await?;
    Ok(Json(review))
}

/// Delete a review (owner or admin)
#[utoipa::path(
    delete,
    path = "/reviews/{id}",
    tag = "reviews",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Review ID")),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Review not found")
    )
)]
pub async fn delete_review(
    State(state): State<AppState>,
    user: OptionalUser,
    IdPath(id): IdPath,
) -> AppResult<StatusCode> {
    POLICY.check(user.claims(), Action::Destroy)?;
    let review = state.services.reviews.get_by_id(id).await?;
    POLICY.check_object(user.claims(), Action::Destroy, &review)?;

    state.services.reviews.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
