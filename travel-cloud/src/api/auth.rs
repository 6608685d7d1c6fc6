//! Account endpoints: register, login, profile

use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{AuthResponse, LoginRequest, RegisterRequest, User, UserProfile, UserRole};
use validator::Validate;

use super::ApiResult;
use crate::auth::CurrentUser;
use crate::auth::rate_limit::{login_rate_limit, register_rate_limit};
use crate::auth::user_auth::{create_token, require_user};
use crate::db;
use crate::error::ServiceError;
use crate::state::AppState;
use crate::util::{hash_password, normalize_email, verify_password};

pub fn router(state: &AppState) -> Router<AppState> {
    let register_routes = Router::new()
        .route("/api/auth/register", post(register))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            register_rate_limit,
        ));
    let login_routes = Router::new()
        .route("/api/auth/login", post(login))
        .route_layer(middleware::from_fn_with_state(state.clone(), login_rate_limit));
    let me_routes = Router::new()
        .route("/api/auth/me", get(me))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_user));

    Router::new()
        .merge(register_routes)
        .merge(login_routes)
        .merge(me_routes)
}

fn issue_token(state: &AppState, user: &User) -> Result<AuthResponse, AppError> {
    let token = create_token(user.id, &user.email, user.role, &state.jwt_secret).map_err(|e| {
        tracing::error!("JWT creation failed: {e}");
        AppError::new(ErrorCode::InternalError)
    })?;
    Ok(AuthResponse {
        token,
        user: UserProfile::from(user),
    })
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ServiceError> {
    req.validate()?;
    let email = normalize_email(&req.email);

    if db::users::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::new(ErrorCode::EmailAlreadyRegistered).into());
    }

    let hashed = hash_password(&req.password).map_err(|e| {
        tracing::error!("Password hashing failed: {e}");
        AppError::new(ErrorCode::InternalError)
    })?;

    let now = shared::util::now_millis();
    let user = match db::users::create(
        &state.pool,
        &email,
        &hashed,
        req.name.trim(),
        UserRole::Customer,
        now,
    )
    .await
    .map_err(ServiceError::from)
    {
        Ok(user) => user,
        Err(e) if e.is_unique_violation(db::users::EMAIL_CONSTRAINT) => {
            return Err(AppError::new(ErrorCode::EmailAlreadyRegistered).into());
        }
        Err(e) => return Err(e),
    };

    tracing::info!(user_id = user.id, "Customer registered");
    Ok((StatusCode::CREATED, Json(issue_token(&state, &user)?)))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<AuthResponse> {
    let email = normalize_email(&req.email);
    let user = db::users::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::InvalidCredentials))?;

    if !verify_password(&req.password, &user.hashed_password) {
        tracing::info!(user_id = user.id, "Login rejected: wrong password");
        return Err(AppError::new(ErrorCode::InvalidCredentials).into());
    }
    if !user.is_active {
        return Err(AppError::new(ErrorCode::AccountDisabled).into());
    }

    Ok(Json(issue_token(&state, &user)?))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    Extension(identity): Extension<CurrentUser>,
) -> ApiResult<UserProfile> {
    let user = db::users::find_by_id(&state.pool, identity.user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(AppError::not_authenticated)?;
    Ok(Json(UserProfile::from(&user)))
}
