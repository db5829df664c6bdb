//! Refund API DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::services::RefundResult;

/// Refund request; initiating actor resolved by the external auth
/// collaborator and passed as data
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RefundRequest {
    #[validate(length(min = 1))]
    pub reason: String,
    /// `full`, `partial` or `deposit-only`
    pub refund_type: String,
    /// Required for `partial`; minor currency units
    pub partial_amount: Option<i64>,
    #[validate(length(min = 1))]
    pub initiated_by: String,
    /// `player`, `staff`, `owner` or `admin`
    pub initiated_by_role: String,
}

/// Structured refund outcome; rejections come back with
/// `success: false` rather than an error status
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefundResponse {
    pub success: bool,
    /// Approved amount in minor units (0 when rejected)
    pub amount: i64,
    pub message: String,
}

impl From<RefundResult> for RefundResponse {
    fn from(r: RefundResult) -> Self {
        Self {
            success: r.success,
            amount: r.amount,
            message: r.message,
        }
    }
}
