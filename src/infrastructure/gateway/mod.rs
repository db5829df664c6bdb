//! Payment gateway port
//!
//! [`PaymentGateway`] is the contract that decouples settlement
//! orchestration from the concrete gateway integration. The gateway's
//! own settlement protocol is out of scope; confirmation arrives
//! out-of-band through the payments callback endpoint.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::DomainResult;

/// Customer fields the gateway requires to open an order.
#[derive(Debug, Clone)]
pub struct CustomerDetails {
    pub name: String,
    pub phone: String,
}

/// Order opened at the gateway; the player completes payment at
/// `payment_url`, and the gateway calls back with `order_ref`.
#[derive(Debug, Clone)]
pub struct GatewayOrder {
    pub order_ref: String,
    pub payment_url: String,
}

/// Outbound port toward the online payment gateway.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a payment order for `amount` (minor units).
    ///
    /// Errors (rejections, timeouts) surface as `PaymentFailed` and
    /// must leave the booking untouched; the caller only mutates
    /// state after a successful order.
    async fn create_order(
        &self,
        booking_id: Uuid,
        amount: i64,
        customer: &CustomerDetails,
    ) -> DomainResult<GatewayOrder>;
}

/// Gateway stand-in for development and testing: fabricates order
/// references and payment URLs without talking to a real gateway.
pub struct SandboxGateway {
    base_url: String,
}

impl SandboxGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl PaymentGateway for SandboxGateway {
    async fn create_order(
        &self,
        booking_id: Uuid,
        _amount: i64,
        _customer: &CustomerDetails,
    ) -> DomainResult<GatewayOrder> {
        let order_ref = format!("SBX-{}", Uuid::new_v4());
        Ok(GatewayOrder {
            payment_url: format!("{}/pay/{}?booking={}", self.base_url, order_ref, booking_id),
            order_ref,
        })
    }
}
