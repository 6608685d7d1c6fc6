//! Review database operations

use shared::models::{Review, ReviewCreate};
use shared::response::PageParams;
use sqlx::PgPool;

/// One review per user and tour
pub const TOUR_USER_CONSTRAINT: &str = "reviews_tour_user_key";

pub async fn list_for_tour(pool: &PgPool, tour_id: i64) -> Result<Vec<Review>, sqlx::Error> {
    sqlx::query_as(
        "SELECT r.*, u.name AS user_name
         FROM reviews r JOIN users u ON u.id = r.user_id
         WHERE r.tour_id = $1
         ORDER BY r.created_at DESC, r.id DESC",
    )
    .bind(tour_id)
    .fetch_all(pool)
    .await
}

pub async fn list_all(pool: &PgPool, page: PageParams) -> Result<(Vec<Review>, u64), sqlx::Error> {
    let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM reviews")
        .fetch_one(pool)
        .await?;
    let rows = sqlx::query_as(
        "SELECT r.*, u.name AS user_name
         FROM reviews r JOIN users u ON u.id = r.user_id
         ORDER BY r.created_at DESC, r.id DESC
         LIMIT $1 OFFSET $2",
    )
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;
    Ok((rows, total.max(0) as u64))
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Review>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM reviews WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(
    pool: &PgPool,
    tour_id: i64,
    user_id: i64,
    data: &ReviewCreate,
    now: i64,
) -> Result<Review, sqlx::Error> {
    sqlx::query_as(
        "WITH inserted AS (
            INSERT INTO reviews (tour_id, user_id, rating, comment, comment_th, comment_zh, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
         )
         SELECT i.*, u.name AS user_name FROM inserted i JOIN users u ON u.id = i.user_id",
    )
    .bind(tour_id)
    .bind(user_id)
    .bind(data.rating)
    .bind(&data.comment)
    .bind(&data.comment_th)
    .bind(&data.comment_zh)
    .bind(now)
    .fetch_one(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
