//! Category endpoints

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    middleware,
    routing::{get, put},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{Category, CategoryCreate, CategoryUpdate, CategoryView};
use validator::Validate;

use super::{ApiResult, LangQuery, request_language};
use crate::auth::user_auth::require_admin;
use crate::db;
use crate::error::ServiceError;
use crate::state::AppState;

const SLUG_CONSTRAINT: &str = "categories_slug_key";

pub fn router(state: &AppState) -> Router<AppState> {
    let public = Router::new().route("/api/categories", get(list_categories));

    let admin = Router::new()
        .route(
            "/api/admin/categories",
            get(admin_list_categories).post(create_category),
        )
        .route(
            "/api/admin/categories/{id}",
            put(update_category).delete(delete_category),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    public.merge(admin)
}

fn slug_taken(slug: &str) -> ServiceError {
    AppError::new(ErrorCode::CategorySlugExists)
        .with_detail("slug", slug)
        .into()
}

/// GET /api/categories?lang=
pub async fn list_categories(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<LangQuery>,
) -> ApiResult<Vec<CategoryView>> {
    let lang = request_language(query.lang.as_deref(), &headers);
    let categories = db::categories::list(&state.pool).await?;
    Ok(Json(categories.iter().map(|c| c.localize(lang)).collect()))
}

/// GET /api/admin/categories
pub async fn admin_list_categories(State(state): State<AppState>) -> ApiResult<Vec<Category>> {
    Ok(Json(db::categories::list(&state.pool).await?))
}

/// POST /api/admin/categories
pub async fn create_category(
    State(state): State<AppState>,
    Json(data): Json<CategoryCreate>,
) -> Result<(StatusCode, Json<Category>), ServiceError> {
    data.validate()?;
    let now = shared::util::now_millis();
    match db::categories::create(&state.pool, &data, now)
        .await
        .map_err(ServiceError::from)
    {
        Ok(category) => {
            tracing::info!(category_id = category.id, slug = %category.slug, "Category created");
            Ok((StatusCode::CREATED, Json(category)))
        }
        Err(e) if e.is_unique_violation(SLUG_CONSTRAINT) => Err(slug_taken(&data.slug)),
        Err(e) => Err(e),
    }
}

/// PUT /api/admin/categories/{id}
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(data): Json<CategoryUpdate>,
) -> ApiResult<Category> {
    data.validate()?;
    match db::categories::update(&state.pool, id, &data)
        .await
        .map_err(ServiceError::from)
    {
        Ok(Some(category)) => Ok(Json(category)),
        Ok(None) => Err(AppError::new(ErrorCode::CategoryNotFound).into()),
        Err(e) if e.is_unique_violation(SLUG_CONSTRAINT) => {
            Err(slug_taken(data.slug.as_deref().unwrap_or_default()))
        }
        Err(e) => Err(e),
    }
}

/// DELETE /api/admin/categories/{id}
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError> {
    if !db::categories::delete(&state.pool, id).await? {
        return Err(AppError::new(ErrorCode::CategoryNotFound).into());
    }
    tracing::info!(category_id = id, "Category deleted");
    Ok(StatusCode::NO_CONTENT)
}
