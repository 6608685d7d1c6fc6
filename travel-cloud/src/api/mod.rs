//! API routes for travel-cloud

pub mod announcements;
pub mod auth;
pub mod bookings;
pub mod categories;
pub mod currency;
pub mod health;
pub mod reviews;
pub mod tours;

use axum::Router;
use axum::http::HeaderMap;
use http::{HeaderName, HeaderValue};
use serde::Deserialize;
use shared::locale::Language;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::error::ServiceError;
use crate::state::AppState;

pub type ApiResult<T> = Result<axum::Json<T>, ServiceError>;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// `?lang=` query shared by localized endpoints
#[derive(Debug, Default, Deserialize)]
pub struct LangQuery {
    pub lang: Option<String>,
}

/// Request language: `?lang=`, then `Accept-Language`, then English
pub fn request_language(lang: Option<&str>, headers: &HeaderMap) -> Language {
    let accept = headers
        .get(http::header::ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok());
    Language::resolve(lang, accept)
}

#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// All routes, no middleware
pub fn build_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router(state))
        .merge(tours::router(state))
        .merge(categories::router(state))
        .merge(bookings::router(state))
        .merge(announcements::router(state))
        .merge(reviews::router(state))
        .merge(currency::router())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Fully configured application (routes, middleware, state)
pub fn build_app(state: AppState, cors_origins: &[String]) -> Router {
    build_router(&state)
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
        .with_state(state)
}
