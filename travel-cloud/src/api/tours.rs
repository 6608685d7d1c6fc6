//! Tour endpoints: public localized listing and admin CRUD

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    middleware,
    routing::{get, put},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{Tour, TourCreate, TourFilter, TourUpdate, TourView};
use validator::Validate;

use super::{ApiResult, LangQuery, request_language};
use crate::auth::user_auth::require_admin;
use crate::db;
use crate::error::{ServiceError, ServiceResult};
use crate::pricing;
use crate::state::AppState;

pub fn router(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/api/tours", get(list_tours))
        .route("/api/tours/{id}", get(get_tour));

    let admin = Router::new()
        .route("/api/admin/tours", get(admin_list_tours).post(create_tour))
        .route("/api/admin/tours/{id}", put(update_tour).delete(delete_tour))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    public.merge(admin)
}

fn view(tour: &Tour, lang: shared::Language) -> TourView {
    tour.localize(lang, pricing::adult_price(tour))
}

/// GET /api/tours?lang=&category=&q=
pub async fn list_tours(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(filter): Query<TourFilter>,
) -> ApiResult<Vec<TourView>> {
    let lang = request_language(filter.lang.as_deref(), &headers);
    let tours = db::tours::list_active(
        &state.pool,
        filter.category.as_deref().filter(|c| !c.is_empty()),
        filter.q.as_deref(),
    )
    .await?;
    Ok(Json(tours.iter().map(|t| view(t, lang)).collect()))
}

/// GET /api/tours/{id}?lang=
pub async fn get_tour(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Query(query): Query<LangQuery>,
) -> ApiResult<TourView> {
    let lang = request_language(query.lang.as_deref(), &headers);
    let tour = db::tours::find_by_id(&state.pool, id)
        .await?
        .filter(|t| t.is_active)
        .ok_or_else(|| AppError::new(ErrorCode::TourNotFound))?;
    Ok(Json(view(&tour, lang)))
}

/// GET /api/admin/tours
pub async fn admin_list_tours(State(state): State<AppState>) -> ApiResult<Vec<Tour>> {
    Ok(Json(db::tours::list_all(&state.pool).await?))
}

async fn ensure_categories_exist(state: &AppState, ids: &[i64]) -> ServiceResult<()> {
    let found = db::categories::existing_ids(&state.pool, ids).await?;
    if let Some(missing) = ids.iter().find(|id| !found.contains(id)) {
        return Err(AppError::new(ErrorCode::CategoryNotFound)
            .with_detail("category_id", *missing)
            .into());
    }
    Ok(())
}

/// POST /api/admin/tours
pub async fn create_tour(
    State(state): State<AppState>,
    Json(data): Json<TourCreate>,
) -> Result<(StatusCode, Json<Tour>), ServiceError> {
    data.validate()?;
    ensure_categories_exist(&state, &data.category_ids).await?;

    let tour = db::tours::create(&state.pool, &data, shared::util::now_millis()).await?;
    tracing::info!(tour_id = tour.id, "Tour created");
    Ok((StatusCode::CREATED, Json(tour)))
}

/// PUT /api/admin/tours/{id}
pub async fn update_tour(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(data): Json<TourUpdate>,
) -> ApiResult<Tour> {
    data.validate()?;
    if let Some(ids) = &data.category_ids {
        ensure_categories_exist(&state, ids).await?;
    }

    // Dates may be updated one at a time; check the merged range
    if data.start_date.is_some() != data.end_date.is_some() {
        let current = db::tours::find_by_id(&state.pool, id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::TourNotFound))?;
        let start = data.start_date.or(current.start_date);
        let end = data.end_date.or(current.end_date);
        if let (Some(s), Some(e)) = (start, end)
            && e < s
        {
            return Err(AppError::new(ErrorCode::TourInvalidDates).into());
        }
    }

    let tour = db::tours::update(&state.pool, id, &data, shared::util::now_millis())
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::TourNotFound))?;
    tracing::info!(tour_id = id, "Tour updated");
    Ok(Json(tour))
}

fn has_bookings_error() -> AppError {
    AppError::with_message(
        ErrorCode::TourHasBookings,
        "Tour has bookings; deactivate it instead",
    )
}

/// DELETE /api/admin/tours/{id}
pub async fn delete_tour(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError> {
    if db::tours::has_bookings(&state.pool, id).await? {
        return Err(has_bookings_error().into());
    }
    // A booking can still land between the check and the delete
    match db::tours::delete(&state.pool, id)
        .await
        .map_err(ServiceError::from)
    {
        Ok(true) => {}
        Ok(false) => return Err(AppError::new(ErrorCode::TourNotFound).into()),
        Err(e) if e.is_foreign_key_violation(db::tours::BOOKINGS_TOUR_CONSTRAINT) => {
            return Err(has_bookings_error().into());
        }
        Err(e) => return Err(e),
    }
    tracing::info!(tour_id = id, "Tour deleted");
    Ok(StatusCode::NO_CONTENT)
}
