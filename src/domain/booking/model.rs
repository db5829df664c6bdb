//! Booking domain entity and lifecycle state machine

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::error::{DomainError, DomainResult};

/// Booking lifecycle status
///
/// Legal transitions:
/// `pending → confirmed → completed`, `pending → cancelled`,
/// `pending → expired`, `confirmed → cancelled`.
/// `completed`, `cancelled` and `expired` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    Expired,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            "expired" => Some(Self::Expired),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Expired)
    }

    /// Pending and confirmed bookings hold a claim on their slot.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    /// Online payment gateway
    Online,
    /// Cash on arrival (treated as pre-authorized)
    Cash,
    /// Voucher code, with an online remainder when it covers partially
    Code,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Cash => "cash",
            Self::Code => "code",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "online" => Some(Self::Online),
            "cash" => Some(Self::Cash),
            "code" => Some(Self::Code),
            _ => None,
        }
    }
}

/// Payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "paid" => Some(Self::Paid),
            "failed" => Some(Self::Failed),
            "refunded" => Some(Self::Refunded),
            _ => None,
        }
    }
}

/// A user's claim on a slot, carrying payment and lifecycle state.
#[derive(Debug, Clone)]
pub struct Booking {
    /// Unique booking ID
    pub id: Uuid,
    /// Claimed slot ID
    pub slot_id: String,
    /// Venue the slot belongs to
    pub venue_id: String,
    /// Requesting user ID
    pub user_id: String,
    /// Lifecycle status
    pub status: BookingStatus,
    /// Price in minor currency units
    pub price: i64,
    /// Deposit actually paid
    pub deposit_paid: i64,
    /// Total actually paid
    pub total_paid: i64,
    /// Selected payment method
    pub payment_method: PaymentMethod,
    /// Settlement status
    pub payment_status: PaymentStatus,
    /// Number of players
    pub players_count: u32,
    /// Applied voucher code, if any
    pub voucher_code: Option<String>,
    /// Reason recorded on cancellation
    pub cancellation_reason: Option<String>,
    /// Order reference at the payment gateway, once created
    pub gateway_order_id: Option<String>,
    /// When the booking was created
    pub created_at: DateTime<Utc>,
    /// Last mutation time
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn new(
        slot_id: impl Into<String>,
        venue_id: impl Into<String>,
        user_id: impl Into<String>,
        price: i64,
        players_count: u32,
        payment_method: PaymentMethod,
        voucher_code: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            slot_id: slot_id.into(),
            venue_id: venue_id.into(),
            user_id: user_id.into(),
            status: BookingStatus::Pending,
            price,
            deposit_paid: 0,
            total_paid: 0,
            payment_method,
            payment_status: PaymentStatus::Pending,
            players_count,
            voucher_code,
            cancellation_reason: None,
            gateway_order_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// `pending → confirmed`, payment `paid`.
    ///
    /// Returns `Ok(true)` when state changed, `Ok(false)` when already
    /// confirmed (idempotent re-delivery), `Conflict` from a terminal
    /// state: a confirmation racing an expiry must lose, not win.
    pub fn confirm(&mut self) -> DomainResult<bool> {
        match self.status {
            BookingStatus::Pending => {
                self.status = BookingStatus::Confirmed;
                self.payment_status = PaymentStatus::Paid;
                self.touch();
                Ok(true)
            }
            BookingStatus::Confirmed => Ok(false),
            other => Err(DomainError::Conflict(format!(
                "cannot confirm booking {} in state {}",
                self.id, other
            ))),
        }
    }

    /// `pending | confirmed → cancelled`, recording the reason.
    ///
    /// `Ok(false)` when already cancelled; `Conflict` from
    /// `completed`/`expired`.
    pub fn cancel(&mut self, reason: impl Into<String>) -> DomainResult<bool> {
        match self.status {
            BookingStatus::Pending | BookingStatus::Confirmed => {
                self.status = BookingStatus::Cancelled;
                self.cancellation_reason = Some(reason.into());
                self.touch();
                Ok(true)
            }
            BookingStatus::Cancelled => Ok(false),
            other => Err(DomainError::Conflict(format!(
                "cannot cancel booking {} in state {}",
                self.id, other
            ))),
        }
    }

    /// `pending → expired`. Silent no-op from any other state.
    pub fn expire(&mut self) -> bool {
        if self.status == BookingStatus::Pending {
            self.status = BookingStatus::Expired;
            self.touch();
            true
        } else {
            false
        }
    }

    /// `confirmed → completed`. `Ok(false)` when already completed.
    pub fn complete(&mut self) -> DomainResult<bool> {
        match self.status {
            BookingStatus::Confirmed => {
                self.status = BookingStatus::Completed;
                self.touch();
                Ok(true)
            }
            BookingStatus::Completed => Ok(false),
            other => Err(DomainError::Conflict(format!(
                "cannot complete booking {} in state {}",
                self.id, other
            ))),
        }
    }

    /// Record amounts captured by a settlement.
    pub fn record_payment(&mut self, deposit: i64, total: i64) {
        self.deposit_paid = deposit;
        self.total_paid = total;
        self.touch();
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

// ── Tests ──────────────────────────────────────────────────────
