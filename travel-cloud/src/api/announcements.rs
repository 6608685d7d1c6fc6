//! Announcement endpoints (banners and popups)

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    middleware,
    routing::{get, put},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    Announcement, AnnouncementCreate, AnnouncementType, AnnouncementUpdate, AnnouncementView,
    announcement::check_consistency,
};
use validator::{Validate, ValidationError};

use super::{ApiResult, LangQuery, request_language};
use crate::auth::user_auth::require_admin;
use crate::db;
use crate::error::{ServiceError, ServiceResult};
use crate::state::AppState;

pub fn router(state: &AppState) -> Router<AppState> {
    let public = Router::new().route("/api/announcements/active", get(list_active));

    let admin = Router::new()
        .route(
            "/api/announcements",
            get(list_announcements).post(create_announcement),
        )
        .route(
            "/api/announcements/{id}",
            put(update_announcement).delete(delete_announcement),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    public.merge(admin)
}

fn consistency_error(err: ValidationError) -> AppError {
    let code = match err.code.as_ref() {
        "popup_type_required" => ErrorCode::AnnouncementMissingPopupType,
        _ => ErrorCode::AnnouncementInvalidDiscount,
    };
    AppError::new(code)
}

async fn ensure_tour_exists(state: &AppState, tour_id: Option<i64>) -> ServiceResult<()> {
    if let Some(id) = tour_id
        && !db::tours::exists(&state.pool, id).await?
    {
        return Err(AppError::new(ErrorCode::TourNotFound)
            .with_detail("tour_id", id)
            .into());
    }
    Ok(())
}

/// GET /api/announcements/active?lang=
pub async fn list_active(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<LangQuery>,
) -> ApiResult<Vec<AnnouncementView>> {
    let lang = request_language(query.lang.as_deref(), &headers);
    let rows = db::announcements::list_active(&state.pool).await?;
    Ok(Json(rows.iter().map(|a| a.localize(lang)).collect()))
}

/// GET /api/announcements
pub async fn list_announcements(State(state): State<AppState>) -> ApiResult<Vec<Announcement>> {
    Ok(Json(db::announcements::list_all(&state.pool).await?))
}

/// POST /api/announcements
pub async fn create_announcement(
    State(state): State<AppState>,
    Json(mut data): Json<AnnouncementCreate>,
) -> Result<(StatusCode, Json<Announcement>), ServiceError> {
    data.validate()?;
    if data.kind == AnnouncementType::Banner {
        data.popup_type = None;
    }
    data.check_consistency().map_err(consistency_error)?;
    ensure_tour_exists(&state, data.tour_id).await?;

    let created =
        db::announcements::create(&state.pool, &data, shared::util::now_millis()).await?;
    tracing::info!(announcement_id = created.id, kind = ?created.kind, "Announcement created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/announcements/{id}
pub async fn update_announcement(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(data): Json<AnnouncementUpdate>,
) -> ApiResult<Announcement> {
    data.validate()?;
    let current = db::announcements::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::AnnouncementNotFound))?;

    let merged = data.apply_to(&current);
    check_consistency(
        merged.kind,
        merged.popup_type,
        merged.tour_id,
        merged.discount_percentage,
    )
    .map_err(consistency_error)?;
    if data.tour_id.is_some() {
        ensure_tour_exists(&state, merged.tour_id).await?;
    }

    let updated = db::announcements::update(&state.pool, &merged, shared::util::now_millis())
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::AnnouncementNotFound))?;
    tracing::info!(announcement_id = id, is_active = updated.is_active, "Announcement updated");
    Ok(Json(updated))
}

/// DELETE /api/announcements/{id}
pub async fn delete_announcement(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError> {
    if !db::announcements::delete(&state.pool, id, shared::util::now_millis()).await? {
        return Err(AppError::new(ErrorCode::AnnouncementNotFound).into());
    }
    tracing::info!(announcement_id = id, "Announcement deleted");
    Ok(StatusCode::NO_CONTENT)
}
