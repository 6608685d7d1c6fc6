//! Shared types for the travel platform
//!
//! Error codes and responses, domain models, locale resolution and
//! pagination used by the server and by API clients.

pub mod error;
pub mod locale;
pub mod models;
pub mod response;
pub mod util;

// Re-exports
pub use error::{AppError, ErrorBody, ErrorCode};
pub use locale::Language;
pub use response::{PageParams, PaginatedResponse};
