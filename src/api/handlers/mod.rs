//! API Handlers

pub mod bookings;
pub mod health;
pub mod monitoring;
pub mod payments;
pub mod refunds;
pub mod slots;
pub mod vouchers;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::Json;
use validator::Validate;

use crate::api::dto::ApiResponse;
use crate::application::services::{
    BookingService, PaymentOrchestrator, RefundService, SlotAvailabilityResolver,
    VoucherValidator,
};
use crate::domain::DomainError;

/// Unified state for all reservation-engine routes.
#[derive(Clone)]
pub struct AppState {
    pub availability: Arc<SlotAvailabilityResolver>,
    pub bookings: Arc<BookingService>,
    pub payments: Arc<PaymentOrchestrator>,
    pub refunds: Arc<RefundService>,
    pub vouchers: Arc<VoucherValidator>,
}

/// Error tuple every handler returns on failure.
pub type ApiError = (StatusCode, Json<ApiResponse<()>>);

/// Map a domain error onto an HTTP status inside the response envelope.
pub fn error_response(err: DomainError) -> ApiError {
    let status = match &err {
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
        DomainError::VoucherInvalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::PaymentFailed(_) => StatusCode::BAD_GATEWAY,
        DomainError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ApiResponse::error(err.to_string())))
}

/// Run derive-based request validation, mapping failures to 400.
pub fn validate_request<T: Validate>(payload: &T) -> Result<(), ApiError> {
    payload.validate().map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(format!("Validation: {}", e))),
        )
    })
}
