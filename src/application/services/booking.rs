//! Booking lifecycle management
//!
//! Owns the booking state machine and the atomic slot claim. All Slot
//! and Booking mutations in the engine go through this service.

use std::sync::Arc;

use chrono::NaiveDate;
use log::{info, warn};
use metrics::counter;
use uuid::Uuid;

use crate::domain::{
    Booking, DomainError, DomainResult, PaymentMethod, PaymentStatus,
};
use crate::infrastructure::Storage;

/// Reservation request entering the lifecycle manager.
#[derive(Debug, Clone)]
pub struct CreateBookingCommand {
    pub venue_id: String,
    pub slot_id: String,
    pub date: NaiveDate,
    pub user_id: String,
    pub players_count: u32,
    pub payment_method: PaymentMethod,
    pub voucher_code: Option<String>,
}

/// Service owning the booking state machine.
pub struct BookingService {
    storage: Arc<dyn Storage>,
}

impl BookingService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Create a booking with an atomic slot claim.
    ///
    /// Validation fails before any mutation; the claim itself is a
    /// single conditional write, so two concurrent creates for one
    /// slot resolve to exactly one success and one `Conflict`.
    pub async fn create(&self, cmd: CreateBookingCommand) -> DomainResult<Booking> {
        let venue = self
            .storage
            .get_venue(&cmd.venue_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Venue", "id", cmd.venue_id.clone()))?;
        let slot = self
            .storage
            .get_slot(&cmd.slot_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Slot", "id", cmd.slot_id.clone()))?;

        if slot.venue_id != cmd.venue_id {
            return Err(DomainError::InvalidInput(format!(
                "slot {} does not belong to venue {}",
                cmd.slot_id, cmd.venue_id
            )));
        }
        if slot.date != cmd.date {
            return Err(DomainError::InvalidInput(format!(
                "slot {} is scheduled on {}, not {}",
                cmd.slot_id, slot.date, cmd.date
            )));
        }
        if cmd.players_count == 0 {
            return Err(DomainError::InvalidInput(
                "players_count must be at least 1".to_string(),
            ));
        }
        if cmd.players_count > slot.capacity {
            return Err(DomainError::InvalidInput(format!(
                "players_count {} exceeds slot capacity {}",
                cmd.players_count, slot.capacity
            )));
        }

        // Advisory re-check to fail fast on an already-claimed slot;
        // the atomic claim below still decides the race.
        if self
            .storage
            .find_active_booking_for_slot(&cmd.slot_id)
            .await?
            .is_some()
        {
            counter!("booking_conflicts_total").increment(1);
            return Err(DomainError::Conflict(format!(
                "slot {} is already claimed by another booking",
                cmd.slot_id
            )));
        }

        let booking = Booking::new(
            cmd.slot_id,
            cmd.venue_id,
            cmd.user_id,
            slot.price,
            cmd.players_count,
            cmd.payment_method,
            cmd.voucher_code,
        );

        let booking = match self.storage.create_booking_claiming_slot(booking).await {
            Ok(b) => b,
            Err(e @ DomainError::Conflict(_)) => {
                counter!("booking_conflicts_total").increment(1);
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        counter!("bookings_created_total").increment(1);
        info!(
            "Booking {} created: slot {} at venue {} for {} ({} players, {})",
            booking.id,
            booking.slot_id,
            venue.id,
            booking.user_id,
            booking.players_count,
            booking.payment_method.as_str()
        );
        Ok(booking)
    }

    /// `pending → confirmed`, payment `paid`. Idempotent on an
    /// already-confirmed booking; `Conflict` from terminal states so a
    /// confirmation racing an expiry is rejected, not absorbed.
    pub async fn confirm(&self, booking_id: Uuid) -> DomainResult<Booking> {
        let mut booking = self.require(booking_id).await?;
        if booking.confirm()? {
            self.storage.update_booking(booking.clone()).await?;
            counter!("bookings_confirmed_total").increment(1);
            info!("Booking {} confirmed, payment captured", booking.id);
        }
        Ok(booking)
    }

    /// Expire a pending booking past its payment window, releasing the
    /// slot. Silent no-op when the booking is absent or already left
    /// `pending`.
    pub async fn expire(&self, booking_id: Uuid) -> DomainResult<bool> {
        let Some(mut booking) = self.storage.get_booking(booking_id).await? else {
            return Ok(false);
        };
        if !booking.expire() {
            return Ok(false);
        }
        self.storage.update_booking(booking.clone()).await?;
        self.storage.release_slot(&booking.slot_id).await?;
        counter!("bookings_expired_total").increment(1);
        info!(
            "Booking {} expired, slot {} released",
            booking.id, booking.slot_id
        );
        Ok(true)
    }

    /// `pending | confirmed → cancelled`, releasing the slot and
    /// recording the reason. Refund orchestration for paid bookings
    /// lives in the refund service, which calls this.
    pub async fn cancel(&self, booking_id: Uuid, reason: &str) -> DomainResult<Booking> {
        let mut booking = self.require(booking_id).await?;
        if booking.cancel(reason)? {
            self.storage.update_booking(booking.clone()).await?;
            self.storage.release_slot(&booking.slot_id).await?;
            info!("Booking {} cancelled: {}", booking.id, reason);
        }
        Ok(booking)
    }

    /// `confirmed → completed`, after the slot has been used.
    pub async fn complete(&self, booking_id: Uuid) -> DomainResult<Booking> {
        let mut booking = self.require(booking_id).await?;
        if booking.complete()? {
            self.storage.update_booking(booking.clone()).await?;
            info!("Booking {} completed", booking.id);
        }
        Ok(booking)
    }

    /// Attach the gateway order reference opened for this booking.
    pub async fn record_gateway_order(
        &self,
        booking_id: Uuid,
        order_ref: &str,
    ) -> DomainResult<Booking> {
        let mut booking = self.require(booking_id).await?;
        booking.gateway_order_id = Some(order_ref.to_string());
        self.storage.update_booking(booking.clone()).await?;
        Ok(booking)
    }

    /// Record amounts captured by a settlement.
    pub async fn record_payment(
        &self,
        booking_id: Uuid,
        deposit: i64,
        total: i64,
    ) -> DomainResult<Booking> {
        let mut booking = self.require(booking_id).await?;
        booking.record_payment(deposit, total);
        self.storage.update_booking(booking.clone()).await?;
        Ok(booking)
    }

    /// Gateway reported a failed payment; the booking stays `pending`
    /// for a retry or the expiry sweep.
    pub async fn mark_payment_failed(&self, booking_id: Uuid) -> DomainResult<Booking> {
        let mut booking = self.require(booking_id).await?;
        booking.payment_status = PaymentStatus::Failed;
        self.storage.update_booking(booking.clone()).await?;
        warn!("Booking {} payment failed", booking.id);
        Ok(booking)
    }

    /// Mark an approved refund on the booking's payment state.
    ///
    /// Conditional write: succeeds only while the payment is still
    /// `paid`, so of two racing refund attempts exactly one gets
    /// through and the other sees `Conflict`.
    pub async fn mark_refunded(&self, booking_id: Uuid) -> DomainResult<Booking> {
        self.storage.mark_booking_refunded_if_paid(booking_id).await
    }

    pub async fn get(&self, booking_id: Uuid) -> DomainResult<Option<Booking>> {
        self.storage.get_booking(booking_id).await
    }

    async fn require(&self, booking_id: Uuid) -> DomainResult<Booking> {
        self.storage
            .get_booking(booking_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Booking", "id", booking_id.to_string()))
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BookingStatus, DepositPolicy, Slot, SlotStatus, Venue};
    use crate::infrastructure::InMemoryStorage;
    use chrono::{NaiveDate, NaiveTime};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()
    }

    async fn seeded_store() -> Arc<InMemoryStorage> {
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
        store
            .save_slot(Slot::new(
                "S-1",
                "V-1",
                date(),
                NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
                20000,
                10,
            ))
            .await
            .unwrap();
        store
    }

    fn cmd() -> CreateBookingCommand {
        CreateBookingCommand {
            venue_id: "V-1".to_string(),
            slot_id: "S-1".to_string(),
            date: date(),
            user_id: "user-1".to_string(),
            players_count: 4,
            payment_method: PaymentMethod::Online,
            voucher_code: None,
        }
    }

    #[tokio::test]
    async fn create_claims_slot_with_slot_price() {
        let store = seeded_store().await;
        let service = BookingService::new(store.clone());

        let booking = service.create(cmd()).await.unwrap();
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.price, 20000);

        let slot = store.get_slot("S-1").await.unwrap().unwrap();
        assert_eq!(slot.status, SlotStatus::Booked);
    }

    #[tokio::test]
    async fn create_rejects_capacity_overflow_before_mutation() {
        let store = seeded_store().await;
        let service = BookingService::new(store.clone());

        let mut over = cmd();
        over.players_count = 11;
        let err = service.create(over).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));

        // fail fast: no partial state change
        let slot = store.get_slot("S-1").await.unwrap().unwrap();
        assert_eq!(slot.status, SlotStatus::Available);
    }

    #[tokio::test]
    async fn create_rejects_unknown_venue_and_slot() {
        let store = seeded_store().await;
        let service = BookingService::new(store);

        let mut bad_venue = cmd();
        bad_venue.venue_id = "V-404".to_string();
        assert!(matches!(
            service.create(bad_venue).await.unwrap_err(),
            DomainError::NotFound { .. }
        ));

        let mut bad_slot = cmd();
        bad_slot.slot_id = "S-404".to_string();
        assert!(matches!(
            service.create(bad_slot).await.unwrap_err(),
            DomainError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn create_rejects_date_mismatch() {
        let store = seeded_store().await;
        let service = BookingService::new(store);

        let mut wrong_date = cmd();
        wrong_date.date = NaiveDate::from_ymd_opt(2026, 9, 2).unwrap();
        assert!(matches!(
            service.create(wrong_date).await.unwrap_err(),
            DomainError::InvalidInput(_)
        ));
    }

    #[tokio::test]
    async fn second_create_for_same_slot_conflicts() {
        let store = seeded_store().await;
        let service = BookingService::new(store);

        service.create(cmd()).await.unwrap();
        assert!(matches!(
            service.create(cmd()).await.unwrap_err(),
            DomainError::Conflict(_)
        ));
    }

    #[tokio::test]
    async fn concurrent_creates_one_winner_one_conflict() {
        let store = seeded_store().await;
        let service = Arc::new(BookingService::new(store));

        let a = {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.create(cmd()).await })
        };
        let b = {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.create(cmd()).await })
        };

        let results = [a.await.unwrap(), b.await.unwrap()];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(
            results
                .iter()
                .filter(|r| matches!(r, Err(DomainError::Conflict(_))))
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn confirm_twice_changes_nothing_on_second_call() {
        let store = seeded_store().await;
        let service = BookingService::new(store);

        let booking = service.create(cmd()).await.unwrap();
        let first = service.confirm(booking.id).await.unwrap();
        let second = service.confirm(booking.id).await.unwrap();
        assert_eq!(first.status, BookingStatus::Confirmed);
        assert_eq!(second.status, BookingStatus::Confirmed);
        assert_eq!(first.updated_at, second.updated_at);
    }

    #[tokio::test]
    async fn expire_releases_slot_and_is_silent_after_confirm() {
        let store = seeded_store().await;
        let service = BookingService::new(store.clone());

        let booking = service.create(cmd()).await.unwrap();
        assert!(service.expire(booking.id).await.unwrap());
        let slot = store.get_slot("S-1").await.unwrap().unwrap();
        assert_eq!(slot.status, SlotStatus::Available);

        // second sweep pass: silent no-op
        assert!(!service.expire(booking.id).await.unwrap());
    }

    #[tokio::test]
    async fn late_confirmation_after_expiry_is_rejected() {
        let store = seeded_store().await;
        let service = BookingService::new(store);

        let booking = service.create(cmd()).await.unwrap();
        service.expire(booking.id).await.unwrap();
        assert!(matches!(
            service.confirm(booking.id).await.unwrap_err(),
            DomainError::Conflict(_)
        ));
    }

    #[tokio::test]
    async fn cancel_releases_slot_and_records_reason() {
        let store = seeded_store().await;
        let service = BookingService::new(store.clone());

        let booking = service.create(cmd()).await.unwrap();
        let cancelled = service.cancel(booking.id, "rained out").await.unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);
        assert_eq!(cancelled.cancellation_reason.as_deref(), Some("rained out"));

        let slot = store.get_slot("S-1").await.unwrap().unwrap();
        assert_eq!(slot.status, SlotStatus::Available);
    }

    #[tokio::test]
    async fn released_slot_can_be_rebooked() {
        let store = seeded_store().await;
        let service = BookingService::new(store);

        let booking = service.create(cmd()).await.unwrap();
        service.cancel(booking.id, "test").await.unwrap();
        assert!(service.create(cmd()).await.is_ok());
    }
}
