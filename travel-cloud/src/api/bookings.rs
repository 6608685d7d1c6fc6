//! Booking endpoints
//!
//! Public creation and quoting, customer lookup, and the admin list/update.
//! Prices are always computed from the stored tour row.

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    middleware,
    routing::{get, post},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    Booking, BookingCreate, BookingFilter, BookingLookup, BookingStatus, BookingUpdate,
    PriceQuote, QuoteRequest,
};
use shared::response::PaginatedResponse;
use validator::Validate;

use super::ApiResult;
use crate::auth::CurrentUser;
use crate::auth::rate_limit::booking_rate_limit;
use crate::auth::user_auth::{optional_user, require_admin, require_user};
use crate::db;
use crate::db::bookings::{NewBooking, REFERENCE_CODE_CONSTRAINT};
use crate::error::ServiceError;
use crate::pricing;
use crate::state::AppState;
use crate::util::generate_reference_code;

/// Reference code generation attempts before giving up
const MAX_REFERENCE_ATTEMPTS: usize = 3;

pub fn router(state: &AppState) -> Router<AppState> {
    let create_routes = Router::new()
        .route("/api/bookings", post(create_booking))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            booking_rate_limit,
        ));

    let public = Router::new()
        .route("/api/bookings/quote", post(quote_booking))
        .route("/api/bookings/lookup", get(lookup_booking));

    let customer = Router::new()
        .route("/api/bookings/mine", get(my_bookings))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_user));

    let admin = Router::new()
        .route("/api/bookings", get(list_bookings).put(update_booking))
        .route("/api/admin/bookings/{id}", get(get_booking))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .merge(create_routes)
        .merge(public)
        .merge(customer)
        .merge(admin)
}

fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// POST /api/bookings
pub async fn create_booking(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(data): Json<BookingCreate>,
) -> Result<(StatusCode, Json<Booking>), ServiceError> {
    data.validate()?;

    let user_id = optional_user(&headers, &state.jwt_secret).map(|u| u.user_id);

    let tour = db::tours::find_by_id(&state.pool, data.tour_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::TourNotFound).with_detail("tour_id", data.tour_id))?;
    let quote = pricing::quote(&tour, data.guests, data.children)?;

    let email = data.email.trim().to_string();
    let now = shared::util::now_millis();

    let mut attempt = 0;
    let mut booking = loop {
        attempt += 1;
        let reference_code = generate_reference_code();
        let row = NewBooking {
            tour_id: tour.id,
            user_id,
            reference_code: &reference_code,
            name: data.name.trim(),
            email: &email,
            phone: trimmed(data.phone.as_deref()),
            contact_method: data.contact_method,
            guests: quote.guests,
            children: quote.children,
            travel_date: data.travel_date,
            special_requests: trimmed(data.special_requests.as_deref()),
            total_price: quote.total_price,
            currency: &quote.currency,
        };
        match db::bookings::insert(&state.pool, &row, now)
            .await
            .map_err(ServiceError::from)
        {
            Ok(booking) => break booking,
            Err(e) if e.is_unique_violation(REFERENCE_CODE_CONSTRAINT) => {
                tracing::warn!(attempt, reference = %reference_code, "Reference code collision");
                if attempt >= MAX_REFERENCE_ATTEMPTS {
                    return Err(AppError::internal("Could not allocate a booking reference").into());
                }
            }
            Err(e) => return Err(e),
        }
    };
    booking.tour_title = Some(tour.title_en.clone());

    tracing::info!(
        booking_id = booking.id,
        reference = %booking.reference_code,
        tour_id = tour.id,
        total = booking.total_price,
        "Booking created"
    );

    state.email.send_booking_emails(&booking, &tour.title_en).await;

    Ok((StatusCode::CREATED, Json(booking)))
}

/// POST /api/bookings/quote
pub async fn quote_booking(
    State(state): State<AppState>,
    Json(req): Json<QuoteRequest>,
) -> ApiResult<PriceQuote> {
    req.validate()?;
    let tour = db::tours::find_by_id(&state.pool, req.tour_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::TourNotFound).with_detail("tour_id", req.tour_id))?;
    Ok(Json(pricing::quote(&tour, req.guests, req.children)?))
}

/// GET /api/bookings/lookup?reference=&email=
pub async fn lookup_booking(
    State(state): State<AppState>,
    Query(lookup): Query<BookingLookup>,
) -> ApiResult<Booking> {
    let booking = db::bookings::find_by_reference(&state.pool, &lookup.reference, &lookup.email)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::BookingNotFound))?;
    Ok(Json(booking))
}

/// GET /api/bookings/mine
pub async fn my_bookings(
    State(state): State<AppState>,
    Extension(identity): Extension<CurrentUser>,
) -> ApiResult<Vec<Booking>> {
    Ok(Json(
        db::bookings::list_for_user(&state.pool, identity.user_id).await?,
    ))
}

/// GET /api/bookings?status=&tour_id=&q=&page=&per_page=
pub async fn list_bookings(
    State(state): State<AppState>,
    Query(filter): Query<BookingFilter>,
) -> ApiResult<PaginatedResponse<Booking>> {
    let (rows, total) = db::bookings::list(&state.pool, &filter).await?;
    Ok(Json(PaginatedResponse::new(rows, total, filter.page_params())))
}

/// GET /api/admin/bookings/{id}
pub async fn get_booking(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Booking> {
    let booking = db::bookings::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::BookingNotFound))?;
    Ok(Json(booking))
}

/// Reject status changes the booking lifecycle does not allow
fn check_transition(from: BookingStatus, to: BookingStatus) -> Result<(), AppError> {
    if from.can_transition_to(to) {
        return Ok(());
    }
    let code = if from == BookingStatus::Cancelled {
        ErrorCode::BookingCancelled
    } else {
        ErrorCode::BookingInvalidTransition
    };
    Err(AppError::new(code)
        .with_detail("from", from.as_str())
        .with_detail("to", to.as_str()))
}

/// Error for an update whose status check ran against `seen` while the row
/// now holds `latest`
fn stale_update_error(
    seen: BookingStatus,
    latest: BookingStatus,
    requested: Option<BookingStatus>,
) -> AppError {
    let to = requested.unwrap_or(latest);
    check_transition(latest, to).err().unwrap_or_else(|| {
        AppError::with_message(
            ErrorCode::BookingInvalidTransition,
            "Booking status changed while updating; reload and retry",
        )
        .with_detail("from", seen.as_str())
        .with_detail("to", to.as_str())
    })
}

/// PUT /api/bookings
pub async fn update_booking(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentUser>,
    Json(data): Json<BookingUpdate>,
) -> ApiResult<Booking> {
    data.validate()?;

    let current = db::bookings::find_by_id(&state.pool, data.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::BookingNotFound))?;
    if let Some(next) = data.status {
        check_transition(current.status, next)?;
    }

    let updated = db::bookings::update_admin(
        &state.pool,
        data.id,
        current.status,
        data.status,
        data.admin_note.as_deref(),
        shared::util::now_millis(),
    )
    .await?;
    let Some(updated) = updated else {
        // Row vanished or another admin changed the status first
        let latest = db::bookings::find_by_id(&state.pool, data.id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::BookingNotFound))?;
        tracing::warn!(
            booking_id = data.id,
            admin_id = admin.user_id,
            expected = current.status.as_str(),
            actual = latest.status.as_str(),
            "Booking status changed during update"
        );
        return Err(stale_update_error(current.status, latest.status, data.status).into());
    };

    tracing::info!(
        booking_id = updated.id,
        admin_id = admin.user_id,
        admin_email = %admin.email,
        from = current.status.as_str(),
        to = updated.status.as_str(),
        "Booking updated"
    );

    if updated.status != current.status {
        let title = updated.tour_title.as_deref().unwrap_or_default();
        if let Err(e) = state.email.send_status_update(&updated, title).await {
            tracing::warn!(reference = %updated.reference_code, error = %e, "Failed to send status email");
        }
    }

    Ok(Json(updated))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_transition() {
        use BookingStatus::*;
        assert!(check_transition(Pending, Confirmed).is_ok());
        assert!(check_transition(Confirmed, Confirmed).is_ok());

        let err = check_transition(Confirmed, Pending).unwrap_err();
        assert_eq!(err.code, ErrorCode::BookingInvalidTransition);
        assert_eq!(err.details.as_ref().unwrap()["from"], "confirmed");

        let err = check_transition(Cancelled, Confirmed).unwrap_err();
        assert_eq!(err.code, ErrorCode::BookingCancelled);
    }

    #[test]
    fn test_stale_update_after_concurrent_cancel() {
        use BookingStatus::*;
        // Checked from pending, but another admin cancelled first
        let err = stale_update_error(Pending, Cancelled, Some(Confirmed));
        assert_eq!(err.code, ErrorCode::BookingCancelled);
        assert_eq!(err.details.as_ref().unwrap()["from"], "cancelled");

        // The new status would still allow the move: ask for a retry
        let err = stale_update_error(Pending, Confirmed, Some(Cancelled));
        assert_eq!(err.code, ErrorCode::BookingInvalidTransition);
        assert_eq!(err.details.as_ref().unwrap()["from"], "pending");
        assert_eq!(err.http_status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_trimmed() {
        assert_eq!(trimmed(Some("  +66 81  ")), Some("+66 81"));
        assert_eq!(trimmed(Some("   ")), None);
        assert_eq!(trimmed(None), None);
    }
}
