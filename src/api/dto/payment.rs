//! Payment gateway callback DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Out-of-band settlement notification from the payment gateway
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GatewayCallbackRequest {
    /// Gateway order reference issued at settlement
    #[validate(length(min = 1))]
    pub transaction_id: String,
    pub booking_id: Uuid,
    /// `success` or `failed`
    pub status: String,
}

/// Callback processing outcome
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GatewayCallbackResponse {
    pub booking_id: Uuid,
    /// Booking status after processing
    pub status: String,
    /// Payment status after processing
    pub payment_status: String,
}
