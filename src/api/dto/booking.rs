//! Booking API DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::domain::Booking;

fn default_players_count() -> u32 {
    1
}

/// Customer fields required by the online payment gateway
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CustomerDto {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub phone: String,
}

/// Reservation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBookingRequest {
    /// Venue ID
    #[validate(length(min = 1))]
    pub venue_id: String,
    /// Slot ID
    #[validate(length(min = 1))]
    pub slot_id: String,
    /// Slot date (YYYY-MM-DD)
    pub date: NaiveDate,
    /// Requesting user ID, resolved by the external auth collaborator
    #[validate(length(min = 1))]
    pub user_id: String,
    /// Number of players (defaults to 1)
    #[serde(default = "default_players_count")]
    #[validate(range(min = 1))]
    pub players_count: u32,
    /// Payment method: `online`, `cash` or `code`
    pub payment_method: String,
    /// Voucher code, required when `payment_method` is `code`
    pub voucher_code: Option<String>,
    /// Customer details for the gateway (online and partial-voucher
    /// settlements)
    #[validate(nested)]
    pub customer: Option<CustomerDto>,
}

/// Reservation outcome
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateBookingResponse {
    pub booking_id: Uuid,
    /// Booking status after settlement dispatch
    pub status: String,
    /// True when an online payment is still owed
    pub requires_payment: bool,
    /// Gateway URL for the owed amount
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_url: Option<String>,
    /// Amount still owed in minor units
    pub amount_due: i64,
    /// Booking price in minor units
    pub price: i64,
}

/// Booking details
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookingDto {
    pub id: Uuid,
    pub slot_id: String,
    pub venue_id: String,
    pub user_id: String,
    /// Lifecycle status: `pending`, `confirmed`, `completed`,
    /// `cancelled` or `expired`
    pub status: String,
    pub price: i64,
    pub deposit_paid: i64,
    pub total_paid: i64,
    pub payment_method: String,
    /// Settlement status: `pending`, `paid`, `failed` or `refunded`
    pub payment_status: String,
    pub players_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voucher_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Booking> for BookingDto {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            slot_id: b.slot_id,
            venue_id: b.venue_id,
            user_id: b.user_id,
            status: b.status.as_str().to_string(),
            price: b.price,
            deposit_paid: b.deposit_paid,
            total_paid: b.total_paid,
            payment_method: b.payment_method.as_str().to_string(),
            payment_status: b.payment_status.as_str().to_string(),
            players_count: b.players_count,
            voucher_code: b.voucher_code,
            cancellation_reason: b.cancellation_reason,
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

/// Cancellation request; actor identity and role resolved upstream
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CancelBookingRequest {
    #[validate(length(min = 1))]
    pub reason: String,
    #[validate(length(min = 1))]
    pub actor_id: String,
    /// `player`, `staff`, `owner` or `admin`
    pub actor_role: String,
}

/// Cancellation outcome; `refund` is present when the booking was paid
/// and the cancellation was routed through refund processing
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CancelBookingResponse {
    pub booking: BookingDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund: Option<super::refund::RefundResponse>,
}
