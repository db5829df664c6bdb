//! Booking API handlers

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use super::{error_response, validate_request, ApiError, AppState};
use crate::api::dto::{
    ApiResponse, BookingDto, CancelBookingRequest, CancelBookingResponse, CreateBookingRequest,
    CreateBookingResponse, RefundResponse,
};
use crate::application::services::{CreateBookingCommand, ProcessRefundCommand};
use crate::domain::{ActorRole, DomainError, PaymentMethod, PaymentStatus, RefundType};
use crate::infrastructure::CustomerDetails;

/// Reserve a slot
///
/// Creates a booking with an atomic slot claim and dispatches
/// settlement by payment method. Cash and fully-covering vouchers
/// confirm immediately; online (and voucher remainders) return a
/// payment URL and stay pending until the gateway callback.
#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    tag = "Bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 200, description = "Booking created", body = ApiResponse<CreateBookingResponse>),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Venue or slot not found"),
        (status = 409, description = "Slot already claimed"),
        (status = 422, description = "Voucher rejected")
    )
)]
pub async fn create_booking(
    State(state): State<AppState>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<Json<ApiResponse<CreateBookingResponse>>, ApiError> {
    validate_request(&req)?;
    let payment_method = PaymentMethod::from_str(&req.payment_method).ok_or_else(|| {
        error_response(DomainError::InvalidInput(format!(
            "unknown payment method: {}",
            req.payment_method
        )))
    })?;
    let customer = req.customer.as_ref().map(|c| CustomerDetails {
        name: c.name.clone(),
        phone: c.phone.clone(),
    });

    let booking = state
        .bookings
        .create(CreateBookingCommand {
            venue_id: req.venue_id,
            slot_id: req.slot_id,
            date: req.date,
            user_id: req.user_id,
            players_count: req.players_count,
            payment_method,
            voucher_code: req.voucher_code,
        })
        .await
        .map_err(error_response)?;

    match state.payments.settle(&booking, customer.as_ref()).await {
        Ok(outcome) => Ok(Json(ApiResponse::success(CreateBookingResponse {
            booking_id: outcome.booking.id,
            status: outcome.booking.status.as_str().to_string(),
            requires_payment: outcome.requires_payment,
            payment_url: outcome.payment_url,
            amount_due: outcome.amount_due,
            price: outcome.booking.price,
        }))),
        Err(e @ (DomainError::VoucherInvalid(_) | DomainError::InvalidInput(_))) => {
            // Settlement rejected before any money moved: give the
            // slot back instead of holding it until the expiry sweep.
            let _ = state
                .bookings
                .cancel(booking.id, "settlement validation failed")
                .await;
            Err(error_response(e))
        }
        // Gateway failures leave the booking pending for a retry or
        // the expiry sweep.
        Err(e) => Err(error_response(e)),
    }
}

/// Booking details
#[utoipa::path(
    get,
    path = "/api/v1/bookings/{booking_id}",
    tag = "Bookings",
    params(("booking_id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking details", body = ApiResponse<BookingDto>),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn get_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<ApiResponse<BookingDto>>, ApiError> {
    let booking = state
        .bookings
        .get(booking_id)
        .await
        .map_err(error_response)?
        .ok_or_else(|| {
            error_response(DomainError::not_found("Booking", "id", booking_id.to_string()))
        })?;
    Ok(Json(ApiResponse::success(booking.into())))
}

/// Cancel a booking
///
/// Releases the slot and records the reason. Paid bookings are routed
/// through refund processing with the actor's role, so the refund
/// tiers and overrides apply.
#[utoipa::path(
    post,
    path = "/api/v1/bookings/{booking_id}/cancel",
    tag = "Bookings",
    params(("booking_id" = Uuid, Path, description = "Booking ID")),
    request_body = CancelBookingRequest,
    responses(
        (status = 200, description = "Cancellation outcome", body = ApiResponse<CancelBookingResponse>),
        (status = 403, description = "Actor may not cancel this booking"),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Booking already terminal")
    )
)]
pub async fn cancel_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Json(req): Json<CancelBookingRequest>,
) -> Result<Json<ApiResponse<CancelBookingResponse>>, ApiError> {
    validate_request(&req)?;
    let role = ActorRole::from_str(&req.actor_role).ok_or_else(|| {
        error_response(DomainError::InvalidInput(format!(
            "unknown actor role: {}",
            req.actor_role
        )))
    })?;

    let booking = state
        .bookings
        .get(booking_id)
        .await
        .map_err(error_response)?
        .ok_or_else(|| {
            error_response(DomainError::not_found("Booking", "id", booking_id.to_string()))
        })?;

    if req.actor_id != booking.user_id && !role.can_force_refund() {
        return Err(error_response(DomainError::Forbidden(format!(
            "{} may not cancel booking {}",
            req.actor_id, booking_id
        ))));
    }

    // A paid booking goes through the refund calculator; the refund
    // service cancels the booking and releases the slot on approval.
    if booking.payment_status == PaymentStatus::Paid {
        let result = state
            .refunds
            .process(ProcessRefundCommand {
                booking_id,
                reason: req.reason,
                refund_type: RefundType::Full,
                partial_amount: None,
                initiated_by: req.actor_id,
                initiated_by_role: role,
            })
            .await
            .map_err(error_response)?;
        let booking = state
            .bookings
            .get(booking_id)
            .await
            .map_err(error_response)?
            .ok_or_else(|| {
                error_response(DomainError::not_found("Booking", "id", booking_id.to_string()))
            })?;
        return Ok(Json(ApiResponse::success(CancelBookingResponse {
            booking: booking.into(),
            refund: Some(RefundResponse::from(result)),
        })));
    }

    let cancelled = state
        .bookings
        .cancel(booking_id, &req.reason)
        .await
        .map_err(error_response)?;
    Ok(Json(ApiResponse::success(CancelBookingResponse {
        booking: cancelled.into(),
        refund: None,
    })))
}
