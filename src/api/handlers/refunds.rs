//! Refund API handlers

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use super::{error_response, validate_request, ApiError, AppState};
use crate::api::dto::{ApiResponse, RefundRequest, RefundResponse};
use crate::application::services::ProcessRefundCommand;
use crate::domain::{ActorRole, DomainError, RefundType};

/// Request a refund
///
/// Computes time-tier eligibility (48h: 100%, 24–48h: 50%, under 24h:
/// nothing for players) and processes the refund. Admin, owner and
/// staff roles may force a refund past the tier, capped at the amount
/// actually paid. Rejections return `success: false` with a message,
/// not an error status.
#[utoipa::path(
    post,
    path = "/api/v1/bookings/{booking_id}/refund",
    tag = "Refunds",
    params(("booking_id" = Uuid, Path, description = "Booking ID")),
    request_body = RefundRequest,
    responses(
        (status = 200, description = "Refund outcome", body = ApiResponse<RefundResponse>),
        (status = 400, description = "Invalid request"),
        (status = 403, description = "Actor may not refund this booking"),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn process_refund(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Json(req): Json<RefundRequest>,
) -> Result<Json<ApiResponse<RefundResponse>>, ApiError> {
    validate_request(&req)?;
    let refund_type = RefundType::from_str(&req.refund_type).ok_or_else(|| {
        error_response(DomainError::InvalidInput(format!(
            "unknown refund type: {}",
            req.refund_type
        )))
    })?;
    let role = ActorRole::from_str(&req.initiated_by_role).ok_or_else(|| {
        error_response(DomainError::InvalidInput(format!(
            "unknown actor role: {}",
            req.initiated_by_role
        )))
    })?;

    let result = state
        .refunds
        .process(ProcessRefundCommand {
            booking_id,
            reason: req.reason,
            refund_type,
            partial_amount: req.partial_amount,
            initiated_by: req.initiated_by,
            initiated_by_role: role,
        })
        .await
        .map_err(error_response)?;
    Ok(Json(ApiResponse::success(result.into())))
}
