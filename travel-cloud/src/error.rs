//! Service-layer error type
//!
//! `ServiceError` sits between DB-layer errors (`sqlx::Error`, `BoxError`)
//! and the API-layer `AppError`, so handlers can use `?` on queries and
//! business checks alike.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// - `Db`: database/infrastructure errors (logged, mapped to InternalError)
/// - `App`: business-rule errors (passed to the client as-is)
#[derive(Debug)]
pub enum ServiceError {
    Db(BoxError),
    App(AppError),
}

impl ServiceError {
    /// Whether this is a PostgreSQL unique-constraint violation on `constraint`
    pub fn is_unique_violation(&self, constraint: &str) -> bool {
        let ServiceError::Db(err) = self else {
            return false;
        };
        err.downcast_ref::<sqlx::Error>()
            .and_then(|e| e.as_database_error())
            .is_some_and(|db| db.is_unique_violation() && db.constraint() == Some(constraint))
    }

    /// Whether this is a PostgreSQL foreign-key violation on `constraint`
    pub fn is_foreign_key_violation(&self, constraint: &str) -> bool {
        let ServiceError::Db(err) = self else {
            return false;
        };
        err.downcast_ref::<sqlx::Error>()
            .and_then(|e| e.as_database_error())
            .is_some_and(|db| {
                db.is_foreign_key_violation() && db.constraint() == Some(constraint)
            })
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Db(e.into())
    }
}

impl From<BoxError> for ServiceError {
    fn from(e: BoxError) -> Self {
        ServiceError::Db(e)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(e: validator::ValidationErrors) -> Self {
        ServiceError::App(e.into())
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Service database error");
                AppError::new(ErrorCode::DatabaseError)
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
