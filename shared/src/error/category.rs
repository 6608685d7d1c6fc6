//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Authentication errors
/// - 2xxx: Permission errors
/// - 3xxx: Tour errors
/// - 4xxx: Booking errors
/// - 5xxx: Announcement errors
/// - 6xxx: Review errors
/// - 7xxx: Currency errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Permission errors (2xxx)
    Permission,
    /// Tour and category errors (3xxx)
    Tour,
    /// Booking errors (4xxx)
    Booking,
    /// Announcement errors (5xxx)
    Announcement,
    /// Review errors (6xxx)
    Review,
    /// Currency errors (7xxx)
    Currency,
    /// System errors (8xxx and up)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Permission,
            3000..4000 => Self::Tour,
            4000..5000 => Self::Booking,
            5000..6000 => Self::Announcement,
            6000..7000 => Self::Review,
            7000..8000 => Self::Currency,
            _ => Self::System,
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}
