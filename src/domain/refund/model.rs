//! Refund domain entity and actor roles

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Refund request kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefundType {
    /// Everything paid, subject to the eligibility ceiling
    Full,
    /// Explicit amount, must not exceed the ceiling
    Partial,
    /// Only the deposit share
    DepositOnly,
}

impl RefundType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Partial => "partial",
            Self::DepositOnly => "deposit-only",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "full" => Some(Self::Full),
            "partial" => Some(Self::Partial),
            "deposit-only" => Some(Self::DepositOnly),
            _ => None,
        }
    }
}

/// Role of the actor initiating a refund, resolved by the external
/// auth collaborator and passed in as data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorRole {
    Player,
    Staff,
    Owner,
    Admin,
}

impl ActorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Staff => "staff",
            Self::Owner => "owner",
            Self::Admin => "admin",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "player" => Some(Self::Player),
            "staff" => Some(Self::Staff),
            "owner" => Some(Self::Owner),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Whether this role may force a refund past the time-tier
    /// eligibility. Staff carry the owner's authority here.
    pub fn can_force_refund(&self) -> bool {
        matches!(self, Self::Staff | Self::Owner | Self::Admin)
    }
}

impl std::fmt::Display for ActorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of a refund attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefundOutcome {
    Approved,
    Rejected,
}

impl RefundOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// Append-only audit record of a refund attempt. Never mutated after
/// creation; one record per attempt, rejections included.
#[derive(Debug, Clone)]
pub struct Refund {
    /// Unique refund ID
    pub id: Uuid,
    /// Booking the refund is against
    pub booking_id: Uuid,
    /// Amount asked for
    pub requested_amount: i64,
    /// Amount actually approved (0 when rejected)
    pub approved_amount: i64,
    /// Human-readable reason given by the requester
    pub reason: String,
    /// Actor who initiated the attempt
    pub initiated_by: String,
    /// Role the actor carried
    pub initiated_by_role: ActorRole,
    /// Approved or rejected
    pub outcome: RefundOutcome,
    /// When the attempt was recorded
    pub created_at: DateTime<Utc>,
}

impl Refund {
    pub fn approved(
        booking_id: Uuid,
        requested_amount: i64,
        approved_amount: i64,
        reason: impl Into<String>,
        initiated_by: impl Into<String>,
        initiated_by_role: ActorRole,
    ) -> Self {
        Self::record(
            booking_id,
            requested_amount,
            approved_amount,
            reason,
            initiated_by,
            initiated_by_role,
            RefundOutcome::Approved,
        )
    }

    pub fn rejected(
        booking_id: Uuid,
        requested_amount: i64,
        reason: impl Into<String>,
        initiated_by: impl Into<String>,
        initiated_by_role: ActorRole,
    ) -> Self {
        Self::record(
            booking_id,
            requested_amount,
            0,
            reason,
            initiated_by,
            initiated_by_role,
            RefundOutcome::Rejected,
        )
    }

    fn record(
        booking_id: Uuid,
        requested_amount: i64,
        approved_amount: i64,
        reason: impl Into<String>,
        initiated_by: impl Into<String>,
        initiated_by_role: ActorRole,
        outcome: RefundOutcome,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            booking_id,
            requested_amount,
            approved_amount,
            reason: reason.into(),
            initiated_by: initiated_by.into(),
            initiated_by_role,
            outcome,
            created_at: Utc::now(),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
