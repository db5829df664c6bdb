//! Voucher API DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::Voucher;

/// Voucher validation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ValidateVoucherRequest {
    #[validate(length(min = 1))]
    pub code: String,
    /// Amount the voucher would be applied to, in minor units
    #[validate(range(min = 1))]
    pub amount: i64,
    /// Optional user for per-user limits
    pub user_id: Option<String>,
}

/// Voucher snapshot returned alongside a successful validation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VoucherSummaryDto {
    pub code: String,
    /// `fixed` or `percentage`
    pub kind: String,
    pub value: i64,
}

impl From<Voucher> for VoucherSummaryDto {
    fn from(v: Voucher) -> Self {
        Self {
            code: v.code,
            kind: v.kind.as_str().to_string(),
            value: v.value,
        }
    }
}

/// Voucher validation outcome
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ValidateVoucherResponse {
    pub valid: bool,
    /// Discount in minor units, capped at the checked amount
    pub discount_amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voucher: Option<VoucherSummaryDto>,
    pub message: String,
}
