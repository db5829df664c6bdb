//! Payment orchestration
//!
//! Dispatches settlement across the three payment paths (online
//! gateway, cash on arrival, voucher code) and reconciles booking
//! payment state, including the idempotent gateway callback.

use std::sync::Arc;

use log::{info, warn};
use metrics::counter;
use uuid::Uuid;

use crate::application::services::{BookingService, VoucherValidator};
use crate::domain::{
    Booking, BookingStatus, DomainError, DomainResult, PaymentMethod,
};
use crate::infrastructure::{CustomerDetails, PaymentGateway, Storage};

/// What the caller must do next after `settle`.
#[derive(Debug, Clone)]
pub struct SettlementOutcome {
    pub booking: Booking,
    /// True when an online payment is still owed.
    pub requires_payment: bool,
    /// Gateway URL for the owed amount, when `requires_payment`.
    pub payment_url: Option<String>,
    /// Amount still owed (minor units); zero once fully settled.
    pub amount_due: i64,
}

/// Terminal status reported by the gateway for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackStatus {
    Success,
    Failed,
}

impl CallbackStatus {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "success" | "paid" => Some(Self::Success),
            "failed" | "cancelled" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Out-of-band confirmation from the gateway.
#[derive(Debug, Clone)]
pub struct GatewayCallback {
    pub transaction_id: String,
    pub booking_id: Uuid,
    pub status: CallbackStatus,
}

/// Selects and executes one settlement path per booking.
pub struct PaymentOrchestrator {
    storage: Arc<dyn Storage>,
    bookings: Arc<BookingService>,
    vouchers: Arc<VoucherValidator>,
    gateway: Arc<dyn PaymentGateway>,
}

impl PaymentOrchestrator {
    pub fn new(
        storage: Arc<dyn Storage>,
        bookings: Arc<BookingService>,
        vouchers: Arc<VoucherValidator>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            storage,
            bookings,
            vouchers,
            gateway,
        }
    }

    /// Settle a freshly created booking by its payment method.
    ///
    /// Online settlement never confirms here; confirmation arrives via
    /// the gateway callback. Gateway failures surface before any
    /// booking mutation, leaving it `pending` for the expiry sweep or
    /// a retry.
    pub async fn settle(
        &self,
        booking: &Booking,
        customer: Option<&CustomerDetails>,
    ) -> DomainResult<SettlementOutcome> {
        match booking.payment_method {
            PaymentMethod::Online => self.settle_online(booking, customer).await,
            PaymentMethod::Cash => self.settle_cash(booking).await,
            PaymentMethod::Code => self.settle_voucher(booking, customer).await,
        }
    }

    async fn settle_online(
        &self,
        booking: &Booking,
        customer: Option<&CustomerDetails>,
    ) -> DomainResult<SettlementOutcome> {
        let customer = required_customer(customer)?;
        let order = self
            .gateway
            .create_order(booking.id, booking.price, customer)
            .await?;
        let booking = self
            .bookings
            .record_gateway_order(booking.id, &order.order_ref)
            .await?;

        info!(
            "Booking {} awaiting online payment of {} (order {})",
            booking.id, booking.price, order.order_ref
        );
        Ok(SettlementOutcome {
            amount_due: booking.price,
            requires_payment: true,
            payment_url: Some(order.payment_url),
            booking,
        })
    }

    async fn settle_cash(&self, booking: &Booking) -> DomainResult<SettlementOutcome> {
        // Cash on arrival is treated as pre-authorized for the full price.
        let deposit = self.deposit_for(booking).await?;
        self.bookings
            .record_payment(booking.id, deposit, booking.price)
            .await?;
        let booking = self.bookings.confirm(booking.id).await?;

        info!("Booking {} settled in cash, confirmed", booking.id);
        Ok(SettlementOutcome {
            booking,
            requires_payment: false,
            payment_url: None,
            amount_due: 0,
        })
    }

    async fn settle_voucher(
        &self,
        booking: &Booking,
        customer: Option<&CustomerDetails>,
    ) -> DomainResult<SettlementOutcome> {
        let code = booking.voucher_code.as_deref().ok_or_else(|| {
            DomainError::InvalidInput("voucher code is required for code payment".to_string())
        })?;

        let check = self
            .vouchers
            .validate(code, booking.price, Some(&booking.user_id))
            .await?;
        if !check.eligible {
            return Err(DomainError::VoucherInvalid(
                check.reason.unwrap_or_else(|| "voucher rejected".to_string()),
            ));
        }

        let residual = booking.price - check.discount;

        if residual == 0 {
            let deposit = self.deposit_for(booking).await?;
            self.bookings
                .record_payment(booking.id, deposit, booking.price)
                .await?;
            let booking = self.bookings.confirm(booking.id).await?;
            self.storage
                .record_voucher_redemption(code, &booking.user_id)
                .await?;

            info!("Booking {} fully covered by voucher {}", booking.id, code);
            return Ok(SettlementOutcome {
                booking,
                requires_payment: false,
                payment_url: None,
                amount_due: 0,
            });
        }

        // Partial cover: the remainder goes through the gateway. The
        // redemption is recorded only once the order exists, so a
        // gateway failure does not consume the voucher before a retry.
        let customer = required_customer(customer)?;
        let order = self
            .gateway
            .create_order(booking.id, residual, customer)
            .await?;
        self.storage
            .record_voucher_redemption(code, &booking.user_id)
            .await?;
        self.bookings
            .record_gateway_order(booking.id, &order.order_ref)
            .await?;
        let booking = self
            .bookings
            .record_payment(booking.id, 0, check.discount)
            .await?;

        info!(
            "Booking {} voucher {} covered {}, awaiting residual {} (order {})",
            booking.id, code, check.discount, residual, order.order_ref
        );
        Ok(SettlementOutcome {
            booking,
            requires_payment: true,
            payment_url: Some(order.payment_url),
            amount_due: residual,
        })
    }

    /// Idempotent confirm-or-reject for an out-of-band gateway
    /// confirmation.
    ///
    /// Re-delivery for an already-confirmed booking is an Ok no-op; a
    /// confirmation arriving after expiry or cancellation is rejected
    /// with `PaymentFailed` so the caller can reverse it at the
    /// gateway.
    pub async fn handle_gateway_callback(&self, cb: GatewayCallback) -> DomainResult<Booking> {
        counter!("gateway_callbacks_total").increment(1);

        let booking = self
            .storage
            .get_booking(cb.booking_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Booking", "id", cb.booking_id.to_string()))?;

        match booking.gateway_order_id.as_deref() {
            Some(order_ref) if order_ref == cb.transaction_id => {}
            Some(_) | None => {
                return Err(DomainError::PaymentFailed(format!(
                    "transaction {} does not match booking {}",
                    cb.transaction_id, cb.booking_id
                )));
            }
        }

        match cb.status {
            CallbackStatus::Failed => {
                if booking.status == BookingStatus::Pending {
                    return self.bookings.mark_payment_failed(booking.id).await;
                }
                Ok(booking)
            }
            CallbackStatus::Success => {
                // Double delivery must not double-confirm or double-credit.
                if booking.status == BookingStatus::Confirmed {
                    return Ok(booking);
                }
                if booking.status.is_terminal() {
                    warn!(
                        "Gateway confirmation for booking {} arrived after {}; rejecting",
                        booking.id, booking.status
                    );
                    return Err(DomainError::PaymentFailed(format!(
                        "booking {} is already {}; payment must be reversed",
                        booking.id, booking.status
                    )));
                }

                let deposit = self.deposit_for(&booking).await?;
                self.bookings
                    .record_payment(booking.id, deposit, booking.price)
                    .await?;
                self.bookings.confirm(booking.id).await
            }
        }
    }

    async fn deposit_for(&self, booking: &Booking) -> DomainResult<i64> {
        let venue = self
            .storage
            .get_venue(&booking.venue_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Venue", "id", booking.venue_id.clone()))?;
        Ok(venue.deposit_policy.deposit_for(booking.price))
    }
}

fn required_customer<'a>(
    customer: Option<&'a CustomerDetails>,
) -> DomainResult<&'a CustomerDetails> {
    let customer = customer.ok_or_else(|| {
        DomainError::InvalidInput("customer details are required for online payment".to_string())
    })?;
    if customer.name.trim().is_empty() || customer.phone.trim().is_empty() {
        return Err(DomainError::InvalidInput(
            "customer name and phone are required for online payment".to_string(),
        ));
    }
    Ok(customer)
}

// ── Tests ──────────────────────────────────────────────────────
