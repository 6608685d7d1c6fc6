//! Booking Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Most adults or children accepted on a single booking
pub const MAX_PARTY_SIZE: i32 = 50;

/// How the customer wants to be contacted
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "text", rename_all = "lowercase"))]
pub enum ContactMethod {
    #[default]
    Email,
    Phone,
    Whatsapp,
    Line,
    Wechat,
}

/// Booking lifecycle status
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "text", rename_all = "lowercase"))]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether an admin may move a booking from `self` to `next`.
    ///
    /// `pending -> confirmed | cancelled`, `confirmed -> cancelled`.
    /// Setting the current status again is a no-op and always allowed.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Pending)
                | (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Confirmed)
                | (Confirmed, Cancelled)
                | (Cancelled, Cancelled)
        )
    }
}

/// Booking entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Booking {
    pub id: i64,
    pub tour_id: i64,
    pub user_id: Option<i64>,
    /// Human-readable reference, e.g. `BK-250314-7KQ2M`
    pub reference_code: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub contact_method: ContactMethod,
    /// Adult guests
    pub guests: i32,
    pub children: i32,
    pub travel_date: Option<NaiveDate>,
    pub special_requests: Option<String>,
    /// Computed by the server from the tour row at creation time
    pub total_price: f64,
    pub currency: String,
    pub status: BookingStatus,
    pub admin_note: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,

    /// English tour title (joined in list queries)
    #[cfg_attr(feature = "db", sqlx(default))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tour_title: Option<String>,
}

/// Create booking payload
///
/// Deliberately has no price field: any price the client sends is dropped
/// during deserialization and the total is derived from the tour row.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BookingCreate {
    pub tour_id: i64,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    #[serde(default)]
    pub contact_method: ContactMethod,
    #[validate(range(min = 1, max = 50))]
    pub guests: i32,
    #[serde(default)]
    #[validate(range(min = 0, max = 50))]
    pub children: i32,
    pub travel_date: Option<NaiveDate>,
    #[validate(length(max = 2000))]
    pub special_requests: Option<String>,
}

/// Price preview request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QuoteRequest {
    pub tour_id: i64,
    #[validate(range(min = 1, max = 50))]
    pub guests: i32,
    #[serde(default)]
    #[validate(range(min = 0, max = 50))]
    pub children: i32,
}

/// Server-computed price breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub tour_id: i64,
    pub currency: String,
    /// Undiscounted adult price
    pub base_price: f64,
    pub discount_percentage: Option<f64>,
    pub adult_price: f64,
    pub child_price: f64,
    pub guests: i32,
    pub children: i32,
    pub total_price: f64,
}

/// Admin update payload (`PUT /api/bookings`)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BookingUpdate {
    pub id: i64,
    pub status: Option<BookingStatus>,
    #[validate(length(max = 2000))]
    pub admin_note: Option<String>,
}

/// Admin list filter
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingFilter {
    pub status: Option<BookingStatus>,
    pub tour_id: Option<i64>,
    /// Matches reference code, name or email
    pub q: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl BookingFilter {
    pub fn page_params(&self) -> crate::response::PageParams {
        crate::response::PageParams {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

/// Customer self-service lookup
#[derive(Debug, Clone, Deserialize)]
pub struct BookingLookup {
    pub reference: String,
    pub email: String,
}
