//! Tour database operations

use std::collections::HashMap;

use shared::models::{DEFAULT_CURRENCY, Tour, TourCreate, TourUpdate};
use sqlx::{PgConnection, PgPool};

use super::{categories, contains_pattern};

/// Public listing: active tours, optionally narrowed by category slug and
/// a case-insensitive search over titles and locations.
pub async fn list_active(
    pool: &PgPool,
    category_slug: Option<&str>,
    search: Option<&str>,
) -> Result<Vec<Tour>, sqlx::Error> {
    let pattern = contains_pattern(search);

    let mut tours: Vec<Tour> = sqlx::query_as(
        r#"
        SELECT t.* FROM tours t
        WHERE t.is_active
          AND ($1::text IS NULL OR EXISTS (
                SELECT 1 FROM tour_categories tc
                JOIN categories c ON c.id = tc.category_id
                WHERE tc.tour_id = t.id AND c.slug = $1))
          AND ($2::text IS NULL
               OR t.title_en ILIKE $2 OR t.title_th ILIKE $2 OR t.title_zh ILIKE $2
               OR t.location_en ILIKE $2 OR t.location_th ILIKE $2 OR t.location_zh ILIKE $2)
        ORDER BY t.created_at DESC, t.id DESC
        "#,
    )
    .bind(category_slug)
    .bind(pattern)
    .fetch_all(pool)
    .await?;

    attach_categories(pool, &mut tours).await?;
    Ok(tours)
}

/// Admin listing: every tour, newest first
pub async fn list_all(pool: &PgPool) -> Result<Vec<Tour>, sqlx::Error> {
    let mut tours: Vec<Tour> =
        sqlx::query_as("SELECT * FROM tours ORDER BY created_at DESC, id DESC")
            .fetch_all(pool)
            .await?;
    attach_categories(pool, &mut tours).await?;
    Ok(tours)
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Tour>, sqlx::Error> {
    let tour: Option<Tour> = sqlx::query_as("SELECT * FROM tours WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    let Some(tour) = tour else {
        return Ok(None);
    };
    let mut tours = vec![tour];
    attach_categories(pool, &mut tours).await?;
    Ok(tours.pop())
}

pub async fn create(pool: &PgPool, data: &TourCreate, now: i64) -> Result<Tour, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let tour: Tour = sqlx::query_as(
        r#"
        INSERT INTO tours (
            title_en, title_th, title_zh,
            description_en, description_th, description_zh,
            location_en, location_th, location_zh,
            price, currency, is_discounted, discount_percentage,
            image_url, gallery, video_url, start_date, end_date,
            duration, max_guests, is_active, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                $14, $15, $16, $17, $18, $19, $20, $21, $22, $22)
        RETURNING *
        "#,
    )
    .bind(&data.title_en)
    .bind(&data.title_th)
    .bind(&data.title_zh)
    .bind(&data.description_en)
    .bind(&data.description_th)
    .bind(&data.description_zh)
    .bind(&data.location_en)
    .bind(&data.location_th)
    .bind(&data.location_zh)
    .bind(data.price)
    .bind(data.currency.as_deref().unwrap_or(DEFAULT_CURRENCY))
    .bind(data.is_discounted.unwrap_or(false))
    .bind(data.discount_percentage)
    .bind(&data.image_url)
    .bind(&data.gallery)
    .bind(&data.video_url)
    .bind(data.start_date)
    .bind(data.end_date)
    .bind(&data.duration)
    .bind(data.max_guests)
    .bind(data.is_active.unwrap_or(true))
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    replace_categories(&mut tx, tour.id, &data.category_ids).await?;
    tx.commit().await?;

    find_by_id(pool, tour.id).await?.ok_or(sqlx::Error::RowNotFound)
}

/// Partial update; absent fields keep their stored value
pub async fn update(
    pool: &PgPool,
    id: i64,
    data: &TourUpdate,
    now: i64,
) -> Result<Option<Tour>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let row: Option<(i64,)> = sqlx::query_as(
        r#"
        UPDATE tours SET
            title_en = COALESCE($2, title_en),
            title_th = COALESCE($3, title_th),
            title_zh = COALESCE($4, title_zh),
            description_en = COALESCE($5, description_en),
            description_th = COALESCE($6, description_th),
            description_zh = COALESCE($7, description_zh),
            location_en = COALESCE($8, location_en),
            location_th = COALESCE($9, location_th),
            location_zh = COALESCE($10, location_zh),
            price = COALESCE($11, price),
            currency = COALESCE($12, currency),
            is_discounted = COALESCE($13, is_discounted),
            discount_percentage = COALESCE($14, discount_percentage),
            image_url = COALESCE($15, image_url),
            gallery = COALESCE($16, gallery),
            video_url = COALESCE($17, video_url),
            start_date = COALESCE($18, start_date),
            end_date = COALESCE($19, end_date),
            duration = COALESCE($20, duration),
            max_guests = COALESCE($21, max_guests),
            is_active = COALESCE($22, is_active),
            updated_at = $23
        WHERE id = $1
        RETURNING id
        "#,
    )
    .bind(id)
    .bind(&data.title_en)
    .bind(&data.title_th)
    .bind(&data.title_zh)
    .bind(&data.description_en)
    .bind(&data.description_th)
    .bind(&data.description_zh)
    .bind(&data.location_en)
    .bind(&data.location_th)
    .bind(&data.location_zh)
    .bind(data.price)
    .bind(&data.currency)
    .bind(data.is_discounted)
    .bind(data.discount_percentage)
    .bind(&data.image_url)
    .bind(&data.gallery)
    .bind(&data.video_url)
    .bind(data.start_date)
    .bind(data.end_date)
    .bind(&data.duration)
    .bind(data.max_guests)
    .bind(data.is_active)
    .bind(now)
    .fetch_optional(&mut *tx)
    .await?;

    if row.is_none() {
        return Ok(None);
    }
    if let Some(ids) = &data.category_ids {
        replace_categories(&mut tx, id, ids).await?;
    }
    tx.commit().await?;

    find_by_id(pool, id).await
}

/// Foreign key from bookings; `ON DELETE RESTRICT`
pub const BOOKINGS_TOUR_CONSTRAINT: &str = "bookings_tour_id_fkey";

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM tours WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn has_bookings(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let (exists,): (bool,) =
        sqlx::query_as("SELECT EXISTS (SELECT 1 FROM bookings WHERE tour_id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await?;
    Ok(exists)
}

pub async fn exists(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM tours WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(exists)
}

/// Set (`Some`) or clear (`None`) a tour's discount inside a transaction
pub async fn set_discount(
    conn: &mut PgConnection,
    tour_id: i64,
    percentage: Option<f64>,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE tours SET is_discounted = $2, discount_percentage = $3, updated_at = $4
         WHERE id = $1",
    )
    .bind(tour_id)
    .bind(percentage.is_some())
    .bind(percentage)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(())
}

async fn replace_categories(
    conn: &mut PgConnection,
    tour_id: i64,
    category_ids: &[i64],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM tour_categories WHERE tour_id = $1")
        .bind(tour_id)
        .execute(&mut *conn)
        .await?;

    if !category_ids.is_empty() {
        sqlx::query(
            "INSERT INTO tour_categories (tour_id, category_id)
             SELECT $1, c FROM UNNEST($2::bigint[]) AS c
             ON CONFLICT DO NOTHING",
        )
        .bind(tour_id)
        .bind(category_ids)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

async fn attach_categories(pool: &PgPool, tours: &mut [Tour]) -> Result<(), sqlx::Error> {
    let ids: Vec<i64> = tours.iter().map(|t| t.id).collect();
    let mut by_tour: HashMap<i64, Vec<_>> = HashMap::new();
    for row in categories::for_tours(pool, &ids).await? {
        by_tour.entry(row.tour_id).or_default().push(row.category);
    }
    for tour in tours.iter_mut() {
        tour.categories = by_tour.remove(&tour.id).unwrap_or_default();
    }
    Ok(())
}
