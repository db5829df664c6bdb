//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::dto::*;
use crate::api::handlers::{
    bookings, health, monitoring, payments, refunds, slots, vouchers, AppState,
};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health_check,
        // Slots
        slots::list_free_slots,
        // Bookings
        bookings::create_booking,
        bookings::get_booking,
        bookings::cancel_booking,
        // Refunds
        refunds::process_refund,
        // Vouchers
        vouchers::validate_voucher,
        // Payments
        payments::gateway_callback,
    ),
    components(
        schemas(
            // Common
            ApiResponse<String>,
            // Slots
            SlotDto,
            // Bookings
            CustomerDto,
            CreateBookingRequest,
            CreateBookingResponse,
            BookingDto,
            CancelBookingRequest,
            CancelBookingResponse,
            // Refunds
            RefundRequest,
            RefundResponse,
            // Vouchers
            ValidateVoucherRequest,
            VoucherSummaryDto,
            ValidateVoucherResponse,
            // Payments
            GatewayCallbackRequest,
            GatewayCallbackResponse,
        )
    ),
    tags(
        (name = "Slots", description = "Slot availability for a venue on a given date. A slot is free when its schedule status is available and no active booking holds it."),
        (name = "Bookings", description = "Booking lifecycle: create (claims the slot atomically), fetch, cancel. Statuses: `pending`, `confirmed`, `cancelled`, `completed`, `expired`. Pending bookings expire automatically when the payment window closes."),
        (name = "Refunds", description = "Refund processing with time-based tiers (100% at 48h+, 50% at 24-48h, 0% under 24h). Staff, owner and admin roles bypass the tiers, capped at the amount actually paid."),
        (name = "Vouchers", description = "Voucher validation: fixed or percentage discounts with activity window, minimum amount, total and per-user redemption limits."),
        (name = "Payments", description = "Payment gateway integration. Online bookings stay pending until the gateway callback confirms them. Amounts are in minor currency units."),
        (name = "Health", description = "Service liveness for uptime monitoring."),
    ),
    info(
        title = "Courtbook Reservation API",
        version = "1.0.0",
        description = "REST API for sports-venue slot reservation and settlement.

## Response format

Every REST response is wrapped in a standard envelope:
```json
{\"success\": true, \"data\": {...}, \"error\": null}
```

On failure:
```json
{\"success\": false, \"data\": null, \"error\": \"description\"}
```

## Money

All monetary amounts are integers in the minor currency unit.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
pub fn create_api_router(state: AppState, metrics_handle: PrometheusHandle) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/venues/{venue_id}/slots", get(slots::list_free_slots))
        .route("/bookings", post(bookings::create_booking))
        .route("/bookings/{booking_id}", get(bookings::get_booking))
        .route("/bookings/{booking_id}/cancel", post(bookings::cancel_booking))
        .route("/bookings/{booking_id}/refund", post(refunds::process_refund))
        .route("/vouchers/validate", post(vouchers::validate_voucher))
        .route("/payments/callback", post(payments::gateway_callback))
        .with_state(state);

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(health::HealthState {
            started_at: Arc::new(Instant::now()),
        });

    let metrics_routes = Router::new()
        .route("/metrics", get(monitoring::prometheus_metrics))
        .with_state(monitoring::MetricsState {
            handle: metrics_handle,
        });

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    Router::new()
        .merge(swagger_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .nest("/api/v1", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
