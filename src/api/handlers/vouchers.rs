//! Voucher API handlers

use axum::{extract::State, Json};

use super::{error_response, validate_request, ApiError, AppState};
use crate::api::dto::{
    ApiResponse, ValidateVoucherRequest, ValidateVoucherResponse, VoucherSummaryDto,
};

/// Validate a voucher code
///
/// Read-only check of a code against an amount and optional user;
/// never consumes a redemption.
#[utoipa::path(
    post,
    path = "/api/v1/vouchers/validate",
    tag = "Vouchers",
    request_body = ValidateVoucherRequest,
    responses(
        (status = 200, description = "Validation outcome", body = ApiResponse<ValidateVoucherResponse>),
        (status = 400, description = "Invalid request")
    )
)]
pub async fn validate_voucher(
    State(state): State<AppState>,
    Json(req): Json<ValidateVoucherRequest>,
) -> Result<Json<ApiResponse<ValidateVoucherResponse>>, ApiError> {
    validate_request(&req)?;
    let check = state
        .vouchers
        .validate(&req.code, req.amount, req.user_id.as_deref())
        .await
        .map_err(error_response)?;

    let message = if check.eligible {
        format!("voucher grants a discount of {}", check.discount)
    } else {
        check.reason.clone().unwrap_or_else(|| "voucher rejected".to_string())
    };
    Ok(Json(ApiResponse::success(ValidateVoucherResponse {
        valid: check.eligible,
        discount_amount: check.discount,
        voucher: check.voucher.map(VoucherSummaryDto::from),
        message,
    })))
}
