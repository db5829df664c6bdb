//! Refund eligibility and processing
//!
//! Time-tiered eligibility measured against the slot's start time,
//! with role-based overrides: admin/owner/staff may force a refund
//! past the tier, but no refund ever exceeds what was actually paid.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use log::info;
use metrics::counter;
use uuid::Uuid;

use crate::application::services::BookingService;
use crate::domain::{
    ActorRole, Booking, BookingStatus, DomainError, DomainResult, PaymentStatus, Refund,
    RefundType, Slot,
};
use crate::infrastructure::Storage;

/// Full refund window before slot start.
const FULL_REFUND_HOURS: i64 = 48;
/// Half refund window before slot start.
const HALF_REFUND_HOURS: i64 = 24;

/// Player-facing eligibility verdict.
#[derive(Debug, Clone)]
pub struct Eligibility {
    pub eligible: bool,
    /// Ceiling a player-initiated refund may reach (minor units).
    pub refundable_amount: i64,
    pub reason: String,
}

/// Structured outcome of a refund attempt; rejections are outcomes,
/// not errors, so the caller can render them directly.
#[derive(Debug, Clone)]
pub struct RefundResult {
    pub success: bool,
    pub amount: i64,
    pub message: String,
}

/// Refund request with the actor resolved upstream by the auth
/// collaborator.
#[derive(Debug, Clone)]
pub struct ProcessRefundCommand {
    pub booking_id: Uuid,
    pub reason: String,
    pub refund_type: RefundType,
    pub partial_amount: Option<i64>,
    pub initiated_by: String,
    pub initiated_by_role: ActorRole,
}

/// Determines refund eligibility and amount, and drives approved
/// refunds through the booking lifecycle.
pub struct RefundService {
    storage: Arc<dyn Storage>,
    bookings: Arc<BookingService>,
}

impl RefundService {
    pub fn new(storage: Arc<dyn Storage>, bookings: Arc<BookingService>) -> Self {
        Self { storage, bookings }
    }

    /// Player-tier eligibility for a booking, measured from now to the
    /// slot's start.
    pub async fn calculate_eligibility(
        &self,
        booking_id: Uuid,
        refund_type: RefundType,
    ) -> DomainResult<Eligibility> {
        let booking = self.require_booking(booking_id).await?;
        let slot = self.require_slot(&booking.slot_id).await?;
        Ok(eligibility_at(&booking, &slot, refund_type, Utc::now()))
    }

    /// Process a refund attempt end to end.
    ///
    /// Exactly one append-only [`Refund`] record is written per
    /// attempt. Rejections leave booking and slot untouched; approvals
    /// cancel the booking (releasing the slot) when it is not already
    /// terminal and mark the payment `refunded`.
    pub async fn process(&self, cmd: ProcessRefundCommand) -> DomainResult<RefundResult> {
        let booking = self.require_booking(cmd.booking_id).await?;
        let slot = self.require_slot(&booking.slot_id).await?;

        self.authorize(&cmd, &booking).await?;

        if !matches!(
            booking.status,
            BookingStatus::Confirmed | BookingStatus::Cancelled
        ) {
            return Err(DomainError::InvalidInput(format!(
                "refund requires a confirmed or cancelled booking, not {}",
                booking.status
            )));
        }
        if booking.payment_status == PaymentStatus::Refunded {
            return self
                .reject(&cmd, &booking, "booking has already been refunded")
                .await;
        }
        if booking.total_paid == 0 {
            return self
                .reject(&cmd, &booking, "nothing was paid on this booking")
                .await;
        }

        let requested = match cmd.refund_type {
            RefundType::Full => booking.total_paid,
            RefundType::DepositOnly => booking.deposit_paid,
            RefundType::Partial => {
                let amount = cmd.partial_amount.ok_or_else(|| {
                    DomainError::InvalidInput(
                        "partial refund requires an explicit amount".to_string(),
                    )
                })?;
                if amount <= 0 {
                    return Err(DomainError::InvalidInput(
                        "partial refund amount must be positive".to_string(),
                    ));
                }
                amount
            }
        };

        let approved = if cmd.initiated_by_role.can_force_refund() {
            // Forced refunds bypass the time tier but never exceed
            // what was actually paid.
            requested.min(booking.total_paid)
        } else {
            let eligibility = eligibility_at(&booking, &slot, cmd.refund_type, Utc::now());
            if !eligibility.eligible {
                return self.reject(&cmd, &booking, &eligibility.reason).await;
            }
            // Only an explicit partial amount can overshoot the tier
            // ceiling; full and deposit-only requests settle at it.
            if cmd.refund_type == RefundType::Partial
                && requested > eligibility.refundable_amount
            {
                return self
                    .reject(
                        &cmd,
                        &booking,
                        &format!(
                            "requested amount exceeds the refundable ceiling of {}",
                            eligibility.refundable_amount
                        ),
                    )
                    .await;
            }
            requested.min(eligibility.refundable_amount)
        };

        if approved == 0 {
            return self.reject(&cmd, &booking, "no refundable amount").await;
        }

        // The refunded flip is the conditional write that decides
        // concurrent attempts: the loser fails here with `Conflict`
        // before any approved record is written.
        self.bookings.mark_refunded(booking.id).await?;

        self.storage
            .save_refund(Refund::approved(
                booking.id,
                requested,
                approved,
                cmd.reason.clone(),
                cmd.initiated_by.clone(),
                cmd.initiated_by_role,
            ))
            .await?;

        if !booking.status.is_terminal() {
            self.bookings.cancel(booking.id, &cmd.reason).await?;
        }

        counter!("refunds_processed_total").increment(1);
        info!(
            "Refund approved for booking {}: {} of {} paid ({} by {})",
            booking.id, approved, booking.total_paid, cmd.refund_type.as_str(), cmd.initiated_by_role
        );
        Ok(RefundResult {
            success: true,
            amount: approved,
            message: "refund approved".to_string(),
        })
    }

    async fn reject(
        &self,
        cmd: &ProcessRefundCommand,
        booking: &Booking,
        message: &str,
    ) -> DomainResult<RefundResult> {
        // Audit trail entry only; booking and slot stay untouched.
        self.storage
            .save_refund(Refund::rejected(
                booking.id,
                cmd.partial_amount.unwrap_or(booking.total_paid),
                cmd.reason.clone(),
                cmd.initiated_by.clone(),
                cmd.initiated_by_role,
            ))
            .await?;
        info!("Refund rejected for booking {}: {}", booking.id, message);
        Ok(RefundResult {
            success: false,
            amount: 0,
            message: message.to_string(),
        })
    }

    async fn authorize(&self, cmd: &ProcessRefundCommand, booking: &Booking) -> DomainResult<()> {
        if cmd.initiated_by == booking.user_id {
            return Ok(());
        }
        // Venue owner, staff and admins act on others' bookings; role
        // resolution happened upstream.
        if cmd.initiated_by_role.can_force_refund() {
            return Ok(());
        }
        Err(DomainError::Forbidden(format!(
            "{} may not refund booking {}",
            cmd.initiated_by, booking.id
        )))
    }

    async fn require_booking(&self, booking_id: Uuid) -> DomainResult<Booking> {
        self.storage
            .get_booking(booking_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Booking", "id", booking_id.to_string()))
    }

    async fn require_slot(&self, slot_id: &str) -> DomainResult<Slot> {
        self.storage
            .get_slot(slot_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Slot", "id", slot_id))
    }
}

/// Pure tier computation: ≥48h before start refunds 100% of the paid
/// amount, 24–48h refunds 50%, under 24h nothing (for players).
fn eligibility_at(
    booking: &Booking,
    slot: &Slot,
    refund_type: RefundType,
    now: DateTime<Utc>,
) -> Eligibility {
    let until_start = slot.start_at() - now;
    let (percent, window) = if until_start >= Duration::hours(FULL_REFUND_HOURS) {
        (100, "48 hours or more before start")
    } else if until_start >= Duration::hours(HALF_REFUND_HOURS) {
        (50, "between 24 and 48 hours before start")
    } else {
        (0, "less than 24 hours before start")
    };

    let tier_ceiling = booking.total_paid * percent / 100;
    let ceiling = match refund_type {
        RefundType::Full | RefundType::Partial => tier_ceiling,
        RefundType::DepositOnly => tier_ceiling.min(booking.deposit_paid),
    };

    if ceiling == 0 {
        Eligibility {
            eligible: false,
            refundable_amount: 0,
            reason: format!("not refundable: {}", window),
        }
    } else {
        Eligibility {
            eligible: true,
            refundable_amount: ceiling,
            reason: format!("{}% refundable: {}", percent, window),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::CreateBookingCommand;
    use crate::domain::{DepositPolicy, PaymentMethod, SlotStatus, Venue};
    use crate::infrastructure::InMemoryStorage;
    use chrono::NaiveDateTime;

    struct Fixture {
        store: Arc<InMemoryStorage>,
        bookings: Arc<BookingService>,
        refunds: RefundService,
    }

    /// Seed a confirmed, fully paid booking on a slot starting
    /// `hours_ahead` from now.
    async fn fixture(hours_ahead: i64) -> (Fixture, Booking) {
        let store = Arc::new(InMemoryStorage::new());
        store
            .save_venue(Venue::new(
                "V-1",
                "Center Court",
                "owner-1",
                20000,
                DepositPolicy::Percentage(30),
            ))
            .await
            .unwrap();

        let start: NaiveDateTime = (Utc::now() + Duration::hours(hours_ahead)).naive_utc();
        store
            .save_slot(Slot::new(
                "S-1",
                "V-1",
                start.date(),
                start.time(),
                (start + Duration::hours(1)).time(),
                20000,
                10,
            ))
            .await
            .unwrap();

        let bookings = Arc::new(BookingService::new(store.clone() as Arc<dyn Storage>));
        let booking = bookings
            .create(CreateBookingCommand {
                venue_id: "V-1".to_string(),
                slot_id: "S-1".to_string(),
                date: start.date(),
                user_id: "user-1".to_string(),
                players_count: 4,
                payment_method: PaymentMethod::Cash,
                voucher_code: None,
            })
            .await
            .unwrap();
        bookings.record_payment(booking.id, 6000, 20000).await.unwrap();
        let booking = bookings.confirm(booking.id).await.unwrap();

        let refunds = RefundService::new(store.clone() as Arc<dyn Storage>, bookings.clone());
        (
            Fixture {
                store,
                bookings,
                refunds,
            },
            booking,
        )
    }

    fn player_cmd(booking_id: Uuid, refund_type: RefundType) -> ProcessRefundCommand {
        ProcessRefundCommand {
            booking_id,
            reason: "cannot make it".to_string(),
            refund_type,
            partial_amount: None,
            initiated_by: "user-1".to_string(),
            initiated_by_role: ActorRole::Player,
        }
    }

    #[tokio::test]
    async fn full_tier_at_50_hours() {
        let (f, booking) = fixture(50).await;
        let e = f
            .refunds
            .calculate_eligibility(booking.id, RefundType::Full)
            .await
            .unwrap();
        assert!(e.eligible);
        assert_eq!(e.refundable_amount, 20000);
    }

    #[tokio::test]
    async fn half_tier_at_30_hours_processes_50_percent() {
        let (f, booking) = fixture(30).await;

        let result = f
            .refunds
            .process(player_cmd(booking.id, RefundType::Full))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.amount, 10000);

        let current = f.store.get_booking(booking.id).await.unwrap().unwrap();
        assert_eq!(current.status, BookingStatus::Cancelled);
        assert_eq!(current.payment_status, PaymentStatus::Refunded);
        let slot = f.store.get_slot("S-1").await.unwrap().unwrap();
        assert_eq!(slot.status, SlotStatus::Available);
    }

    #[tokio::test]
    async fn deposit_only_clamps_to_half_tier_ceiling() {
        let (f, booking) = fixture(30).await; // tier ceiling 10000
        f.bookings.record_payment(booking.id, 15000, 20000).await.unwrap();

        let result = f
            .refunds
            .process(player_cmd(booking.id, RefundType::DepositOnly))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.amount, 10000);
    }

    #[tokio::test]
    async fn concurrent_refunds_approve_exactly_once() {
        let (f, booking) = fixture(50).await;
        let refunds = Arc::new(RefundService::new(
            f.store.clone() as Arc<dyn Storage>,
            f.bookings.clone(),
        ));

        let a = {
            let refunds = Arc::clone(&refunds);
            let cmd = player_cmd(booking.id, RefundType::Full);
            tokio::spawn(async move { refunds.process(cmd).await })
        };
        let b = {
            let refunds = Arc::clone(&refunds);
            let cmd = player_cmd(booking.id, RefundType::Full);
            tokio::spawn(async move { refunds.process(cmd).await })
        };

        // the loser either gets a rejection outcome or a conflict, but
        // never a second approval
        let results = [a.await.unwrap(), b.await.unwrap()];
        let approvals = results
            .iter()
            .filter(|r| matches!(r, Ok(outcome) if outcome.success))
            .count();
        assert_eq!(approvals, 1);

        let approved_records = f
            .store
            .list_refunds_for_booking(booking.id)
            .await
            .unwrap()
            .iter()
            .filter(|r| r.approved_amount > 0)
            .count();
        assert_eq!(approved_records, 1);

        let current = f.store.get_booking(booking.id).await.unwrap().unwrap();
        assert_eq!(current.payment_status, PaymentStatus::Refunded);
    }

    #[tokio::test]
    async fn under_24_hours_player_is_rejected_without_mutation() {
        let (f, booking) = fixture(10).await;

        let result = f
            .refunds
            .process(player_cmd(booking.id, RefundType::Full))
            .await
            .unwrap();
        assert!(!result.success);
        assert_eq!(result.amount, 0);

        let current = f.store.get_booking(booking.id).await.unwrap().unwrap();
        assert_eq!(current.status, BookingStatus::Confirmed);
        assert_eq!(current.payment_status, PaymentStatus::Paid);

        // rejection is still audited
        let audit = f.store.list_refunds_for_booking(booking.id).await.unwrap();
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].approved_amount, 0);
    }

    #[tokio::test]
    async fn admin_forces_refund_under_24_hours_capped_at_paid() {
        let (f, booking) = fixture(10).await;

        let mut cmd = player_cmd(booking.id, RefundType::Full);
        cmd.initiated_by = "admin-1".to_string();
        cmd.initiated_by_role = ActorRole::Admin;
        let result = f.refunds.process(cmd).await.unwrap();
        assert!(result.success);
        assert_eq!(result.amount, 20000);

        let current = f.store.get_booking(booking.id).await.unwrap().unwrap();
        assert_eq!(current.status, BookingStatus::Cancelled);
    }

    #[tokio::test]
    async fn forced_partial_never_exceeds_total_paid() {
        let (f, booking) = fixture(10).await;

        let mut cmd = player_cmd(booking.id, RefundType::Partial);
        cmd.partial_amount = Some(1_000_000);
        cmd.initiated_by = "owner-1".to_string();
        cmd.initiated_by_role = ActorRole::Owner;
        let result = f.refunds.process(cmd).await.unwrap();
        assert!(result.success);
        assert_eq!(result.amount, 20000);
    }

    #[tokio::test]
    async fn player_partial_above_ceiling_is_rejected() {
        let (f, booking) = fixture(30).await; // ceiling 10000

        let mut cmd = player_cmd(booking.id, RefundType::Partial);
        cmd.partial_amount = Some(15000);
        let result = f.refunds.process(cmd).await.unwrap();
        assert!(!result.success);
        assert_eq!(result.amount, 0);
    }

    #[tokio::test]
    async fn player_partial_within_ceiling_is_approved() {
        let (f, booking) = fixture(30).await;

        let mut cmd = player_cmd(booking.id, RefundType::Partial);
        cmd.partial_amount = Some(5000);
        let result = f.refunds.process(cmd).await.unwrap();
        assert!(result.success);
        assert_eq!(result.amount, 5000);
    }

    #[tokio::test]
    async fn partial_without_amount_is_invalid_input() {
        let (f, booking) = fixture(50).await;
        let err = f
            .refunds
            .process(player_cmd(booking.id, RefundType::Partial))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn deposit_only_caps_at_deposit() {
        let (f, booking) = fixture(50).await;

        let result = f
            .refunds
            .process(player_cmd(booking.id, RefundType::DepositOnly))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.amount, 6000);
    }

    #[tokio::test]
    async fn stranger_player_is_forbidden() {
        let (f, booking) = fixture(50).await;

        let mut cmd = player_cmd(booking.id, RefundType::Full);
        cmd.initiated_by = "someone-else".to_string();
        let err = f.refunds.process(cmd).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn second_refund_attempt_is_rejected() {
        let (f, booking) = fixture(50).await;

        let first = f
            .refunds
            .process(player_cmd(booking.id, RefundType::Full))
            .await
            .unwrap();
        assert!(first.success);

        let second = f
            .refunds
            .process(player_cmd(booking.id, RefundType::Full))
            .await
            .unwrap();
        assert!(!second.success);
        assert_eq!(second.amount, 0);

        let audit = f.store.list_refunds_for_booking(booking.id).await.unwrap();
        assert_eq!(audit.len(), 2);
    }

    #[tokio::test]
    async fn pending_booking_cannot_be_refunded() {
        let (f, booking) = fixture(50).await;
        // wind the booking back to a fresh pending one on another slot
        let start = (Utc::now() + Duration::hours(50)).naive_utc();
        f.store
            .save_slot(Slot::new(
                "S-2",
                "V-1",
                start.date(),
                start.time(),
                (start + Duration::hours(1)).time(),
                20000,
                10,
            ))
            .await
            .unwrap();
        let pending = f
            .bookings
            .create(CreateBookingCommand {
                venue_id: "V-1".to_string(),
                slot_id: "S-2".to_string(),
                date: start.date(),
                user_id: "user-1".to_string(),
                players_count: 2,
                payment_method: PaymentMethod::Online,
                voucher_code: None,
            })
            .await
            .unwrap();
        let _ = booking;

        let err = f
            .refunds
            .process(player_cmd(pending.id, RefundType::Full))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn unknown_booking_is_not_found() {
        let (f, _) = fixture(50).await;
        let err = f
            .refunds
            .process(player_cmd(Uuid::new_v4(), RefundType::Full))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }
}
