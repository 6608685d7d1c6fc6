//! Tour review endpoints

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    middleware,
    routing::{delete, get, post},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{Review, ReviewCreate, ReviewSummary, TourReviews};
use shared::response::{PageParams, PaginatedResponse};
use validator::Validate;

use super::{ApiResult, LangQuery, request_language};
use crate::auth::CurrentUser;
use crate::auth::user_auth::{require_admin, require_user};
use crate::db;
use crate::db::reviews::TOUR_USER_CONSTRAINT;
use crate::error::ServiceError;
use crate::state::AppState;

pub fn router(state: &AppState) -> Router<AppState> {
    let public = Router::new().route("/api/tours/{id}/reviews", get(list_tour_reviews));

    let customer = Router::new()
        .route("/api/tours/{id}/reviews", post(create_review))
        .route("/api/reviews/{id}", delete(delete_review))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_user));

    let admin = Router::new()
        .route("/api/admin/reviews", get(admin_list_reviews))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    public.merge(customer).merge(admin)
}

/// GET /api/tours/{id}/reviews?lang=
pub async fn list_tour_reviews(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(tour_id): Path<i64>,
    Query(query): Query<LangQuery>,
) -> ApiResult<TourReviews> {
    let lang = request_language(query.lang.as_deref(), &headers);
    if !db::tours::exists(&state.pool, tour_id).await? {
        return Err(AppError::new(ErrorCode::TourNotFound).into());
    }
    let reviews = db::reviews::list_for_tour(&state.pool, tour_id).await?;
    Ok(Json(TourReviews {
        summary: ReviewSummary::from_ratings(reviews.iter().map(|r| r.rating)),
        reviews: reviews.iter().map(|r| r.localize(lang)).collect(),
    }))
}

/// POST /api/tours/{id}/reviews
pub async fn create_review(
    State(state): State<AppState>,
    Extension(identity): Extension<CurrentUser>,
    Path(tour_id): Path<i64>,
    Json(data): Json<ReviewCreate>,
) -> Result<(StatusCode, Json<Review>), ServiceError> {
    if !(1..=5).contains(&data.rating) {
        return Err(AppError::new(ErrorCode::ReviewInvalidRating)
            .with_detail("rating", data.rating)
            .into());
    }
    data.validate()?;
    if !db::tours::exists(&state.pool, tour_id).await? {
        return Err(AppError::new(ErrorCode::TourNotFound).into());
    }

    let now = shared::util::now_millis();
    match db::reviews::create(&state.pool, tour_id, identity.user_id, &data, now)
        .await
        .map_err(ServiceError::from)
    {
        Ok(review) => {
            tracing::info!(review_id = review.id, tour_id, user_id = identity.user_id, "Review created");
            Ok((StatusCode::CREATED, Json(review)))
        }
        Err(e) if e.is_unique_violation(TOUR_USER_CONSTRAINT) => {
            Err(AppError::new(ErrorCode::ReviewAlreadyExists).into())
        }
        Err(e) => Err(e),
    }
}

/// DELETE /api/reviews/{id}
pub async fn delete_review(
    State(state): State<AppState>,
    Extension(identity): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError> {
    let review = db::reviews::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ReviewNotFound))?;
    if review.user_id != identity.user_id && !identity.is_admin() {
        return Err(AppError::permission_denied("Only the author or an admin may delete a review").into());
    }
    if !db::reviews::delete(&state.pool, id).await? {
        return Err(AppError::new(ErrorCode::ReviewNotFound).into());
    }
    tracing::info!(review_id = id, user_id = identity.user_id, "Review deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/admin/reviews?page=&per_page=
pub async fn admin_list_reviews(
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
) -> ApiResult<PaginatedResponse<Review>> {
    let (rows, total) = db::reviews::list_all(&state.pool, page).await?;
    Ok(Json(PaginatedResponse::new(rows, total, page)))
}
