//! HTTP status for each error code

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Status the API responds with for this code. Business-rule and
    /// validation failures fall through to 400.
    pub fn http_status(&self) -> StatusCode {
        use ErrorCode::*;
        match self {
            Success => StatusCode::OK,

            NotFound | TourNotFound | CategoryNotFound | BookingNotFound
            | AnnouncementNotFound | ReviewNotFound => StatusCode::NOT_FOUND,

            EmailAlreadyRegistered | CategorySlugExists | TourHasBookings
            | ReviewAlreadyExists => StatusCode::CONFLICT,

            NotAuthenticated | InvalidCredentials | TokenExpired | TokenInvalid
            | AccountDisabled => StatusCode::UNAUTHORIZED,

            PermissionDenied | AdminRequired => StatusCode::FORBIDDEN,

            TooManyRequests => StatusCode::TOO_MANY_REQUESTS,

            // Upstream rate source; the client may retry
            ExchangeRateUnavailable => StatusCode::SERVICE_UNAVAILABLE,

            Unknown | InternalError | DatabaseError | ConfigError | EmailDeliveryFailed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_failures_are_404() {
        for code in [
            ErrorCode::TourNotFound,
            ErrorCode::BookingNotFound,
            ErrorCode::AnnouncementNotFound,
        ] {
            assert_eq!(code.http_status(), StatusCode::NOT_FOUND, "{code}");
        }
    }

    #[test]
    fn test_duplicates_are_409() {
        assert_eq!(ErrorCode::ReviewAlreadyExists.http_status(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::EmailAlreadyRegistered.http_status(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::TourHasBookings.http_status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_auth_statuses() {
        assert_eq!(ErrorCode::TokenExpired.http_status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::AdminRequired.http_status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ErrorCode::TooManyRequests.http_status(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn test_rate_source_outage_is_503() {
        assert_eq!(
            ErrorCode::ExchangeRateUnavailable.http_status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ErrorCode::DatabaseError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_booking_rules_are_400() {
        for code in [
            ErrorCode::ValidationFailed,
            ErrorCode::BookingInvalidGuests,
            ErrorCode::BookingCapacityExceeded,
            ErrorCode::BookingInvalidTransition,
            ErrorCode::TourInactive,
            ErrorCode::CurrencyUnsupported,
        ] {
            assert_eq!(code.http_status(), StatusCode::BAD_REQUEST, "{code}");
        }
    }
}
