//! User database operations

use shared::models::{User, UserRole};
use sqlx::PgPool;

pub const EMAIL_CONSTRAINT: &str = "users_email_key";

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// `email` must already be normalized
pub async fn create(
    pool: &PgPool,
    email: &str,
    hashed_password: &str,
    name: &str,
    role: UserRole,
    now: i64,
) -> Result<User, sqlx::Error> {
    sqlx::query_as(
        "INSERT INTO users (email, hashed_password, name, role, is_active, created_at)
         VALUES ($1, $2, $3, $4, TRUE, $5)
         RETURNING *",
    )
    .bind(email)
    .bind(hashed_password)
    .bind(name)
    .bind(role)
    .bind(now)
    .fetch_one(pool)
    .await
}

/// Create the bootstrap admin unless an account with that email exists.
/// Returns true when a new admin was inserted.
pub async fn ensure_admin(
    pool: &PgPool,
    email: &str,
    hashed_password: &str,
    now: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO users (email, hashed_password, name, role, is_active, created_at)
         VALUES ($1, $2, 'Administrator', 'admin', TRUE, $3)
         ON CONFLICT (email) DO NOTHING",
    )
    .bind(email)
    .bind(hashed_password)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}
