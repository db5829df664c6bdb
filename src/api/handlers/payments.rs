//! Payment gateway callback handler

use axum::{extract::State, Json};

use super::{error_response, validate_request, ApiError, AppState};
use crate::api::dto::{ApiResponse, GatewayCallbackRequest, GatewayCallbackResponse};
use crate::application::services::{CallbackStatus, GatewayCallback};
use crate::domain::DomainError;

/// Gateway settlement callback
///
/// Idempotent confirm-or-reject: re-delivery of a confirmation is a
/// no-op, and a confirmation arriving after the booking expired is
/// rejected so the gateway can reverse the charge.
#[utoipa::path(
    post,
    path = "/api/v1/payments/callback",
    tag = "Payments",
    request_body = GatewayCallbackRequest,
    responses(
        (status = 200, description = "Callback processed", body = ApiResponse<GatewayCallbackResponse>),
        (status = 404, description = "Booking not found"),
        (status = 502, description = "Confirmation rejected; reverse at the gateway")
    )
)]
pub async fn gateway_callback(
    State(state): State<AppState>,
    Json(req): Json<GatewayCallbackRequest>,
) -> Result<Json<ApiResponse<GatewayCallbackResponse>>, ApiError> {
    validate_request(&req)?;
    let status = CallbackStatus::from_str(&req.status).ok_or_else(|| {
        error_response(DomainError::InvalidInput(format!(
            "unknown callback status: {}",
            req.status
        )))
    })?;

    let booking = state
        .payments
        .handle_gateway_callback(GatewayCallback {
            transaction_id: req.transaction_id,
            booking_id: req.booking_id,
            status,
        })
        .await
        .map_err(error_response)?;
    Ok(Json(ApiResponse::success(GatewayCallbackResponse {
        booking_id: booking.id,
        status: booking.status.as_str().to_string(),
        payment_status: booking.payment_status.as_str().to_string(),
    })))
}
