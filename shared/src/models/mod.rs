//! Data models
//!
//! Shared between travel-cloud and API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (PostgreSQL BIGSERIAL).

pub mod announcement;
pub mod booking;
pub mod category;
pub mod review;
pub mod tour;
pub mod user;

// Re-exports
pub use announcement::*;
pub use booking::*;
pub use category::*;
pub use review::*;
pub use tour::*;
pub use user::*;
