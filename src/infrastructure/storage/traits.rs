//! Storage trait definitions

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::{Booking, DomainResult, Refund, Slot, SlotStatus, Venue, Voucher};

/// Storage trait for persistence operations.
///
/// The durable store is an external collaborator; the engine only
/// requires this contract. Two operations carry atomicity
/// requirements: `create_booking_claiming_slot` is the
/// compare-and-swap that keeps two concurrent bookings from claiming
/// the same slot, and `mark_booking_refunded_if_paid` is the one that
/// keeps a paid booking from being refunded twice.
#[async_trait]
pub trait Storage: Send + Sync {
    // Venue operations
    async fn save_venue(&self, venue: Venue) -> DomainResult<()>;
    async fn get_venue(&self, id: &str) -> DomainResult<Option<Venue>>;
    async fn list_venues(&self) -> DomainResult<Vec<Venue>>;

    // Slot operations
    async fn save_slot(&self, slot: Slot) -> DomainResult<()>;
    async fn get_slot(&self, id: &str) -> DomainResult<Option<Slot>>;
    async fn list_slots_for_date(&self, venue_id: &str, date: NaiveDate)
        -> DomainResult<Vec<Slot>>;
    async fn update_slot_status(&self, id: &str, status: SlotStatus) -> DomainResult<()>;
    /// Drop the active-booking claim on a slot and reopen it.
    async fn release_slot(&self, id: &str) -> DomainResult<()>;

    // Booking operations
    /// Atomically claim the booking's slot and insert the booking.
    ///
    /// Succeeds only if no booking in {pending, confirmed} references
    /// the slot and the slot itself is `available`. A lost race
    /// surfaces as `Conflict`; exactly one of two concurrent calls for
    /// the same slot wins.
    async fn create_booking_claiming_slot(&self, booking: Booking) -> DomainResult<Booking>;
    async fn get_booking(&self, id: Uuid) -> DomainResult<Option<Booking>>;
    async fn update_booking(&self, booking: Booking) -> DomainResult<()>;
    /// Flip the booking's payment to `refunded`, but only while it is
    /// still `paid`. A concurrent refund that already flipped it
    /// surfaces as `Conflict`; exactly one of two concurrent refund
    /// attempts gets past this write.
    async fn mark_booking_refunded_if_paid(&self, id: Uuid) -> DomainResult<Booking>;
    async fn find_active_booking_for_slot(&self, slot_id: &str) -> DomainResult<Option<Booking>>;
    /// Slot ids on `date` held by a booking in {pending, confirmed}.
    /// The availability join reads this instead of trusting slot status.
    async fn claimed_slot_ids(&self, venue_id: &str, date: NaiveDate) -> DomainResult<Vec<String>>;
    /// Pending bookings created before `deadline` (expiry sweep input).
    async fn find_pending_created_before(
        &self,
        deadline: DateTime<Utc>,
    ) -> DomainResult<Vec<Booking>>;

    // Voucher operations
    async fn get_voucher(&self, code: &str) -> DomainResult<Option<Voucher>>;
    async fn voucher_redemptions(&self, code: &str) -> DomainResult<u32>;
    async fn voucher_redemptions_for_user(&self, code: &str, user_id: &str) -> DomainResult<u32>;
    async fn record_voucher_redemption(&self, code: &str, user_id: &str) -> DomainResult<()>;

    // Refund operations (append-only)
    async fn save_refund(&self, refund: Refund) -> DomainResult<()>;
    async fn list_refunds_for_booking(&self, booking_id: Uuid) -> DomainResult<Vec<Refund>>;
}
