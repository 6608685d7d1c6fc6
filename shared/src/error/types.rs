//! `AppError` and the JSON error body

use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Error returned by every API handler: a stable code, a message and
/// optional structured details (field errors, offending ids).
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Error with the code's default message
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Attach a detail entry
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    pub fn not_authenticated() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::PermissionDenied, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::TokenInvalid, msg)
    }

    pub fn token_expired() -> Self {
        Self::new(ErrorCode::TokenExpired)
    }

    pub fn too_many_requests() -> Self {
        Self::new(ErrorCode::TooManyRequests)
    }
}

/// Field errors become `details[field] = [reason, ...]`; a reason is the
/// rule's message when it has one, else its code (`length`, `email`, ...).
impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut err = AppError::new(ErrorCode::ValidationFailed);
        for (field, field_errors) in errors.field_errors() {
            let reasons: Vec<String> = field_errors
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            err = err.with_detail(field.to_string(), reasons);
        }
        err
    }
}

/// Body of every error response: `{ "code", "message", "details"? }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl From<&AppError> for ErrorBody {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code.code(),
            message: err.message.clone(),
            details: err.details.clone(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        if matches!(self.code.category(), super::category::ErrorCategory::System) {
            tracing::error!(code = %self.code, message = %self.message, "System error occurred");
        }
        (self.http_status(), axum::Json(ErrorBody::from(&self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_default_message() {
        let err = AppError::new(ErrorCode::TourNotFound);
        assert_eq!(err.message, "Tour not found");
        assert!(err.details.is_none());
        assert_eq!(err.http_status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_details_accumulate() {
        let err = AppError::new(ErrorCode::BookingCapacityExceeded)
            .with_detail("max_guests", 10)
            .with_detail("requested", 12);
        let details = err.details.unwrap();
        assert_eq!(details["max_guests"], 10);
        assert_eq!(details["requested"], 12);
    }

    #[derive(Validate)]
    struct Contact {
        #[validate(email(message = "must be a valid email"))]
        email: String,
        #[validate(length(min = 1))]
        name: String,
    }

    #[test]
    fn test_from_validation_errors() {
        let contact = Contact {
            email: "nope".to_string(),
            name: String::new(),
        };
        let err: AppError = contact.validate().unwrap_err().into();

        assert_eq!(err.code, ErrorCode::ValidationFailed);
        let details = err.details.unwrap();
        assert_eq!(details["email"], serde_json::json!(["must be a valid email"]));
        assert_eq!(details["name"], serde_json::json!(["length"]));
    }

    #[test]
    fn test_error_body_shape() {
        let err = AppError::with_message(ErrorCode::BookingNotFound, "No such booking")
            .with_detail("reference", "BK-250101-ABCDE");
        let json = serde_json::to_value(ErrorBody::from(&err)).unwrap();
        assert_eq!(json["code"], 4001);
        assert_eq!(json["message"], "No such booking");
        assert_eq!(json["details"]["reference"], "BK-250101-ABCDE");

        let json = serde_json::to_value(ErrorBody::from(&AppError::not_authenticated())).unwrap();
        assert!(json.get("details").is_none());
    }
}
