//! Category database operations

use shared::models::{Category, CategoryCreate, CategoryUpdate};
use sqlx::PgPool;

/// Category joined to one of its tours
#[derive(sqlx::FromRow)]
pub struct TourCategoryRow {
    pub tour_id: i64,
    #[sqlx(flatten)]
    pub category: Category,
}

pub async fn list(pool: &PgPool) -> Result<Vec<Category>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM categories ORDER BY sort_order, id")
        .fetch_all(pool)
        .await
}

pub async fn create(
    pool: &PgPool,
    data: &CategoryCreate,
    now: i64,
) -> Result<Category, sqlx::Error> {
    sqlx::query_as(
        "INSERT INTO categories (slug, name_en, name_th, name_zh, sort_order, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING *",
    )
    .bind(&data.slug)
    .bind(&data.name_en)
    .bind(&data.name_th)
    .bind(&data.name_zh)
    .bind(data.sort_order.unwrap_or(0))
    .bind(now)
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    data: &CategoryUpdate,
) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE categories SET
            slug = COALESCE($2, slug),
            name_en = COALESCE($3, name_en),
            name_th = COALESCE($4, name_th),
            name_zh = COALESCE($5, name_zh),
            sort_order = COALESCE($6, sort_order)
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(&data.slug)
    .bind(&data.name_en)
    .bind(&data.name_th)
    .bind(&data.name_zh)
    .bind(data.sort_order)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Categories of the given tours, ordered for display
pub async fn for_tours(
    pool: &PgPool,
    tour_ids: &[i64],
) -> Result<Vec<TourCategoryRow>, sqlx::Error> {
    if tour_ids.is_empty() {
        return Ok(Vec::new());
    }
    sqlx::query_as(
        "SELECT tc.tour_id, c.*
         FROM tour_categories tc
         JOIN categories c ON c.id = tc.category_id
         WHERE tc.tour_id = ANY($1)
         ORDER BY c.sort_order, c.id",
    )
    .bind(tour_ids)
    .fetch_all(pool)
    .await
}

/// IDs from `ids` that exist
pub async fn existing_ids(pool: &PgPool, ids: &[i64]) -> Result<Vec<i64>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let rows: Vec<(i64,)> = sqlx::query_as("SELECT id FROM categories WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}
