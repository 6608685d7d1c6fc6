//! Unified error codes for travel-cloud
//!
//! Every error the API returns carries one of these codes. The numeric value
//! is stable and shared with the frontend. Codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Tour / category errors
//! - 4xxx: Booking errors
//! - 5xxx: Announcement errors
//! - 6xxx: Review errors
//! - 7xxx: Currency errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Invalid request
    InvalidRequest = 5,
    /// Too many requests from this client
    TooManyRequests = 9,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled
    AccountDisabled = 1005,
    /// Email is already registered
    EmailAlreadyRegistered = 1006,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2002,

    // ==================== 3xxx: Tour ====================
    /// Tour not found
    TourNotFound = 3001,
    /// Tour is not available for booking
    TourInactive = 3002,
    /// Tour has invalid price
    TourInvalidPrice = 3003,
    /// Discount percentage out of range
    TourInvalidDiscount = 3004,
    /// Tour date range is invalid
    TourInvalidDates = 3005,
    /// Tour still has bookings
    TourHasBookings = 3006,
    /// Category not found
    CategoryNotFound = 3101,
    /// Category slug already exists
    CategorySlugExists = 3102,

    // ==================== 4xxx: Booking ====================
    /// Booking not found
    BookingNotFound = 4001,
    /// Guest or children count out of range
    BookingInvalidGuests = 4002,
    /// Booking exceeds the tour's guest capacity
    BookingCapacityExceeded = 4003,
    /// Status transition not allowed
    BookingInvalidTransition = 4004,
    /// Booking is cancelled and cannot be changed
    BookingCancelled = 4005,

    // ==================== 5xxx: Announcement ====================
    /// Announcement not found
    AnnouncementNotFound = 5001,
    /// Discount announcement is missing its tour or percentage
    AnnouncementInvalidDiscount = 5002,
    /// Popup announcement is missing its popup type
    AnnouncementMissingPopupType = 5003,

    // ==================== 6xxx: Review ====================
    /// Review not found
    ReviewNotFound = 6001,
    /// User already reviewed this tour
    ReviewAlreadyExists = 6002,
    /// Rating out of range
    ReviewInvalidRating = 6003,

    // ==================== 7xxx: Currency ====================
    /// Currency is not supported
    CurrencyUnsupported = 7001,
    /// Exchange rates could not be obtained
    ExchangeRateUnavailable = 7002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9005,
    /// Email could not be delivered
    EmailDeliveryFailed = 9006,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::TooManyRequests => "Too many requests, try again later",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::AccountDisabled => "Account is disabled",
            ErrorCode::EmailAlreadyRegistered => "Email is already registered",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Administrator role is required",

            // Tour
            ErrorCode::TourNotFound => "Tour not found",
            ErrorCode::TourInactive => "Tour is not available for booking",
            ErrorCode::TourInvalidPrice => "Tour has invalid price",
            ErrorCode::TourInvalidDiscount => "Discount percentage must be between 0 and 100",
            ErrorCode::TourInvalidDates => "Tour end date is before its start date",
            ErrorCode::TourHasBookings => "Tour has bookings and cannot be deleted",
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::CategorySlugExists => "Category slug already exists",

            // Booking
            ErrorCode::BookingNotFound => "Booking not found",
            ErrorCode::BookingInvalidGuests => "Guest count is out of range",
            ErrorCode::BookingCapacityExceeded => "Booking exceeds the tour's capacity",
            ErrorCode::BookingInvalidTransition => "Booking status change is not allowed",
            ErrorCode::BookingCancelled => "Booking is cancelled",

            // Announcement
            ErrorCode::AnnouncementNotFound => "Announcement not found",
            ErrorCode::AnnouncementInvalidDiscount => {
                "Discount announcement requires a tour and a discount percentage"
            }
            ErrorCode::AnnouncementMissingPopupType => "Popup announcement requires a popup type",

            // Review
            ErrorCode::ReviewNotFound => "Review not found",
            ErrorCode::ReviewAlreadyExists => "You have already reviewed this tour",
            ErrorCode::ReviewInvalidRating => "Rating must be between 1 and 5",

            // Currency
            ErrorCode::CurrencyUnsupported => "Currency is not supported",
            ErrorCode::ExchangeRateUnavailable => "Exchange rates are unavailable",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::EmailDeliveryFailed => "Email could not be delivered",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            5 => Ok(ErrorCode::InvalidRequest),
            9 => Ok(ErrorCode::TooManyRequests),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1005 => Ok(ErrorCode::AccountDisabled),
            1006 => Ok(ErrorCode::EmailAlreadyRegistered),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::AdminRequired),

            // Tour
            3001 => Ok(ErrorCode::TourNotFound),
            3002 => Ok(ErrorCode::TourInactive),
            3003 => Ok(ErrorCode::TourInvalidPrice),
            3004 => Ok(ErrorCode::TourInvalidDiscount),
            3005 => Ok(ErrorCode::TourInvalidDates),
            3006 => Ok(ErrorCode::TourHasBookings),
            3101 => Ok(ErrorCode::CategoryNotFound),
            3102 => Ok(ErrorCode::CategorySlugExists),

            // Booking
            4001 => Ok(ErrorCode::BookingNotFound),
            4002 => Ok(ErrorCode::BookingInvalidGuests),
            4003 => Ok(ErrorCode::BookingCapacityExceeded),
            4004 => Ok(ErrorCode::BookingInvalidTransition),
            4005 => Ok(ErrorCode::BookingCancelled),

            // Announcement
            5001 => Ok(ErrorCode::AnnouncementNotFound),
            5002 => Ok(ErrorCode::AnnouncementInvalidDiscount),
            5003 => Ok(ErrorCode::AnnouncementMissingPopupType),

            // Review
            6001 => Ok(ErrorCode::ReviewNotFound),
            6002 => Ok(ErrorCode::ReviewAlreadyExists),
            6003 => Ok(ErrorCode::ReviewInvalidRating),

            // Currency
            7001 => Ok(ErrorCode::CurrencyUnsupported),
            7002 => Ok(ErrorCode::ExchangeRateUnavailable),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9005 => Ok(ErrorCode::ConfigError),
            9006 => Ok(ErrorCode::EmailDeliveryFailed),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
