//! Booking database operations

use chrono::NaiveDate;
use shared::models::{Booking, BookingFilter, BookingStatus, ContactMethod};
use sqlx::PgPool;

use super::contains_pattern;

/// Unique index backing reference codes
pub const REFERENCE_CODE_CONSTRAINT: &str = "bookings_reference_code_key";

/// Row to insert; prices are already computed server-side
pub struct NewBooking<'a> {
    pub tour_id: i64,
    pub user_id: Option<i64>,
    pub reference_code: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub contact_method: ContactMethod,
    pub guests: i32,
    pub children: i32,
    pub travel_date: Option<NaiveDate>,
    pub special_requests: Option<&'a str>,
    pub total_price: f64,
    pub currency: &'a str,
}

pub async fn insert(pool: &PgPool, b: &NewBooking<'_>, now: i64) -> Result<Booking, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO bookings (
            tour_id, user_id, reference_code, name, email, phone, contact_method,
            guests, children, travel_date, special_requests, total_price, currency,
            status, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, 'pending', $14, $14)
        RETURNING *
        "#,
    )
    .bind(b.tour_id)
    .bind(b.user_id)
    .bind(b.reference_code)
    .bind(b.name)
    .bind(b.email)
    .bind(b.phone)
    .bind(b.contact_method)
    .bind(b.guests)
    .bind(b.children)
    .bind(b.travel_date)
    .bind(b.special_requests)
    .bind(b.total_price)
    .bind(b.currency)
    .bind(now)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Booking>, sqlx::Error> {
    sqlx::query_as(
        "SELECT b.*, t.title_en AS tour_title
         FROM bookings b JOIN tours t ON t.id = b.tour_id
         WHERE b.id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Customer lookup: reference and email must both match (email case-insensitive)
pub async fn find_by_reference(
    pool: &PgPool,
    reference: &str,
    email: &str,
) -> Result<Option<Booking>, sqlx::Error> {
    sqlx::query_as(
        "SELECT b.*, t.title_en AS tour_title
         FROM bookings b JOIN tours t ON t.id = b.tour_id
         WHERE b.reference_code = $1 AND lower(b.email) = lower($2)",
    )
    .bind(reference.trim().to_ascii_uppercase())
    .bind(email.trim())
    .fetch_optional(pool)
    .await
}

pub async fn list_for_user(pool: &PgPool, user_id: i64) -> Result<Vec<Booking>, sqlx::Error> {
    sqlx::query_as(
        "SELECT b.*, t.title_en AS tour_title
         FROM bookings b JOIN tours t ON t.id = b.tour_id
         WHERE b.user_id = $1
         ORDER BY b.created_at DESC, b.id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Admin list with filters; returns the page and the total match count
pub async fn list(
    pool: &PgPool,
    filter: &BookingFilter,
) -> Result<(Vec<Booking>, u64), sqlx::Error> {
    let page = filter.page_params();
    let pattern = contains_pattern(filter.q.as_deref());

    const WHERE: &str = "WHERE ($1::text IS NULL OR b.status = $1)
          AND ($2::bigint IS NULL OR b.tour_id = $2)
          AND ($3::text IS NULL
               OR b.reference_code ILIKE $3 OR b.name ILIKE $3 OR b.email ILIKE $3)";

    let (total,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM bookings b {WHERE}"))
        .bind(filter.status)
        .bind(filter.tour_id)
        .bind(&pattern)
        .fetch_one(pool)
        .await?;

    let rows: Vec<Booking> = sqlx::query_as(&format!(
        "SELECT b.*, t.title_en AS tour_title
         FROM bookings b JOIN tours t ON t.id = b.tour_id
         {WHERE}
         ORDER BY b.created_at DESC, b.id DESC
         LIMIT $4 OFFSET $5"
    ))
    .bind(filter.status)
    .bind(filter.tour_id)
    .bind(&pattern)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    Ok((rows, total.max(0) as u64))
}

/// Admin update of status and note; `None` fields keep their value.
///
/// A status change only applies while the row still has status `expected`;
/// `Ok(None)` when the booking is gone or its status moved in the meantime.
pub async fn update_admin(
    pool: &PgPool,
    id: i64,
    expected: BookingStatus,
    status: Option<BookingStatus>,
    admin_note: Option<&str>,
    now: i64,
) -> Result<Option<Booking>, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as(
        "UPDATE bookings SET
            status = COALESCE($2, status),
            admin_note = COALESCE($3, admin_note),
            updated_at = $4
         WHERE id = $1 AND ($2::text IS NULL OR status = $5)
         RETURNING id",
    )
    .bind(id)
    .bind(status)
    .bind(admin_note)
    .bind(now)
    .bind(expected)
    .fetch_optional(pool)
    .await?;

    match row {
        Some((id,)) => find_by_id(pool, id).await,
        None => Ok(None),
    }
}
