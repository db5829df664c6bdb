//! In-memory storage implementation

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use super::Storage;
use crate::domain::{
    Booking, DomainError, DomainResult, PaymentStatus, Refund, Slot, SlotStatus, Venue, Voucher,
};

/// In-memory storage for development and testing.
///
/// The slot claim uses the dashmap entry lock on `slot_claims` as the
/// conditional write: two concurrent claims on one slot serialize on
/// the same shard key, so exactly one wins.
pub struct InMemoryStorage {
    venues: DashMap<String, Venue>,
    slots: DashMap<String, Slot>,
    bookings: DashMap<Uuid, Booking>,
    /// slot id → booking currently holding the claim
    slot_claims: DashMap<String, Uuid>,
    vouchers: DashMap<String, Voucher>,
    /// voucher code → user ids that redeemed it
    voucher_redemptions: DashMap<String, Vec<String>>,
    refunds: DashMap<Uuid, Refund>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            venues: DashMap::new(),
            slots: DashMap::new(),
            bookings: DashMap::new(),
            slot_claims: DashMap::new(),
            vouchers: DashMap::new(),
            voucher_redemptions: DashMap::new(),
            refunds: DashMap::new(),
        }
    }

    /// Insert a voucher (dev/test seeding; vouchers are otherwise
    /// managed by the external store).
    pub fn add_voucher(&self, voucher: Voucher) {
        self.vouchers.insert(voucher.code.clone(), voucher);
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn save_venue(&self, venue: Venue) -> DomainResult<()> {
        self.venues.insert(venue.id.clone(), venue);
        Ok(())
    }

    async fn get_venue(&self, id: &str) -> DomainResult<Option<Venue>> {
        Ok(self.venues.get(id).map(|v| v.clone()))
    }

    async fn list_venues(&self) -> DomainResult<Vec<Venue>> {
        Ok(self.venues.iter().map(|v| v.value().clone()).collect())
    }

    async fn save_slot(&self, slot: Slot) -> DomainResult<()> {
        self.slots.insert(slot.id.clone(), slot);
        Ok(())
    }

    async fn get_slot(&self, id: &str) -> DomainResult<Option<Slot>> {
        Ok(self.slots.get(id).map(|s| s.clone()))
    }

    async fn list_slots_for_date(
        &self,
        venue_id: &str,
        date: NaiveDate,
    ) -> DomainResult<Vec<Slot>> {
        Ok(self
            .slots
            .iter()
            .filter(|s| s.venue_id == venue_id && s.date == date)
            .map(|s| s.clone())
            .collect())
    }

    async fn update_slot_status(&self, id: &str, status: SlotStatus) -> DomainResult<()> {
        let mut slot = self
            .slots
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found("Slot", "id", id))?;
        slot.status = status;
        Ok(())
    }

    async fn release_slot(&self, id: &str) -> DomainResult<()> {
        self.slot_claims.remove(id);
        if let Some(mut slot) = self.slots.get_mut(id) {
            // Only reopen slots closed by a claim; leave maintenance alone
            if slot.status == SlotStatus::Booked {
                slot.status = SlotStatus::Available;
            }
        }
        Ok(())
    }

    async fn create_booking_claiming_slot(&self, booking: Booking) -> DomainResult<Booking> {
        let slot_id = booking.slot_id.clone();

        // The entry lock is the compare-and-swap. An occupied entry
        // whose holder is unknown is treated as claimed: the winning
        // writer may not have inserted its booking row yet.
        match self.slot_claims.entry(slot_id.clone()) {
            Entry::Occupied(mut entry) => {
                let holder_released = self
                    .bookings
                    .get(entry.get())
                    .map(|b| !b.is_active())
                    .unwrap_or(false);
                if !holder_released {
                    return Err(DomainError::Conflict(format!(
                        "slot {} is already claimed by another booking",
                        slot_id
                    )));
                }
                entry.insert(booking.id);
            }
            Entry::Vacant(entry) => {
                entry.insert(booking.id);
            }
        }

        // Claim held; flip the slot and insert the booking. Roll the
        // claim back if the slot turns out to be unbookable.
        match self.slots.get_mut(&slot_id) {
            Some(mut slot) if slot.is_available() => {
                slot.status = SlotStatus::Booked;
            }
            Some(slot) => {
                let status = slot.status;
                drop(slot);
                self.slot_claims.remove(&slot_id);
                return Err(DomainError::Conflict(format!(
                    "slot {} is not bookable (status: {})",
                    slot_id, status
                )));
            }
            None => {
                self.slot_claims.remove(&slot_id);
                return Err(DomainError::not_found("Slot", "id", slot_id));
            }
        }

        self.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn get_booking(&self, id: Uuid) -> DomainResult<Option<Booking>> {
        Ok(self.bookings.get(&id).map(|b| b.clone()))
    }

    async fn update_booking(&self, booking: Booking) -> DomainResult<()> {
        if !self.bookings.contains_key(&booking.id) {
            return Err(DomainError::not_found("Booking", "id", booking.id.to_string()));
        }
        self.bookings.insert(booking.id, booking);
        Ok(())
    }

    async fn mark_booking_refunded_if_paid(&self, id: Uuid) -> DomainResult<Booking> {
        // The get_mut entry lock makes the check-and-flip atomic.
        let mut booking = self
            .bookings
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("Booking", "id", id.to_string()))?;
        if booking.payment_status != PaymentStatus::Paid {
            return Err(DomainError::Conflict(format!(
                "booking {} payment is {}, not paid",
                id,
                booking.payment_status.as_str()
            )));
        }
        booking.payment_status = PaymentStatus::Refunded;
        booking.updated_at = Utc::now();
        Ok(booking.clone())
    }

    async fn find_active_booking_for_slot(&self, slot_id: &str) -> DomainResult<Option<Booking>> {
        let Some(holder) = self.slot_claims.get(slot_id).map(|e| *e.value()) else {
            return Ok(None);
        };
        Ok(self
            .bookings
            .get(&holder)
            .filter(|b| b.is_active())
            .map(|b| b.clone()))
    }

    async fn claimed_slot_ids(
        &self,
        venue_id: &str,
        date: NaiveDate,
    ) -> DomainResult<Vec<String>> {
        let mut claimed = Vec::new();
        for slot in self
            .slots
            .iter()
            .filter(|s| s.venue_id == venue_id && s.date == date)
        {
            if let Some(holder) = self.slot_claims.get(slot.id.as_str()) {
                let active = self
                    .bookings
                    .get(holder.value())
                    .map(|b| b.is_active())
                    // unknown holder: claim insert in flight, count it
                    .unwrap_or(true);
                if active {
                    claimed.push(slot.id.clone());
                }
            }
        }
        Ok(claimed)
    }

    async fn find_pending_created_before(
        &self,
        deadline: DateTime<Utc>,
    ) -> DomainResult<Vec<Booking>> {
        Ok(self
            .bookings
            .iter()
            .filter(|b| b.status == crate::domain::BookingStatus::Pending && b.created_at < deadline)
            .map(|b| b.clone())
            .collect())
    }

    async fn get_voucher(&self, code: &str) -> DomainResult<Option<Voucher>> {
        Ok(self.vouchers.get(code).map(|v| v.clone()))
    }

    async fn voucher_redemptions(&self, code: &str) -> DomainResult<u32> {
        Ok(self
            .voucher_redemptions
            .get(code)
            .map(|users| users.len() as u32)
            .unwrap_or(0))
    }

    async fn voucher_redemptions_for_user(&self, code: &str, user_id: &str) -> DomainResult<u32> {
        Ok(self
            .voucher_redemptions
            .get(code)
            .map(|users| users.iter().filter(|u| u.as_str() == user_id).count() as u32)
            .unwrap_or(0))
    }

    async fn record_voucher_redemption(&self, code: &str, user_id: &str) -> DomainResult<()> {
        self.voucher_redemptions
            .entry(code.to_string())
            .or_default()
            .push(user_id.to_string());
        Ok(())
    }

    async fn save_refund(&self, refund: Refund) -> DomainResult<()> {
        self.refunds.insert(refund.id, refund);
        Ok(())
    }

    async fn list_refunds_for_booking(&self, booking_id: Uuid) -> DomainResult<Vec<Refund>> {
        let mut refunds: Vec<Refund> = self
            .refunds
            .iter()
            .filter(|r| r.booking_id == booking_id)
            .map(|r| r.clone())
            .collect();
        refunds.sort_by_key(|r| r.created_at);
        Ok(refunds)
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PaymentMethod;
    use chrono::{NaiveDate, NaiveTime};

    fn sample_slot(id: &str) -> Slot {
        Slot::new(
            id,
            "V-1",
            NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
            20000,
            10,
        )
    }

    fn sample_booking(slot_id: &str) -> Booking {
        Booking::new(slot_id, "V-1", "user-1", 20000, 4, PaymentMethod::Cash, None)
    }

    #[tokio::test]
    async fn claim_flips_slot_and_inserts_booking() {
        let store = InMemoryStorage::new();
        store.save_slot(sample_slot("S-1")).await.unwrap();

        let booking = store
            .create_booking_claiming_slot(sample_booking("S-1"))
            .await
            .unwrap();

        let slot = store.get_slot("S-1").await.unwrap().unwrap();
        assert_eq!(slot.status, SlotStatus::Booked);
        let active = store.find_active_booking_for_slot("S-1").await.unwrap();
        assert_eq!(active.unwrap().id, booking.id);
    }

    #[tokio::test]
    async fn second_claim_on_same_slot_conflicts() {
        let store = InMemoryStorage::new();
        store.save_slot(sample_slot("S-1")).await.unwrap();

        store
            .create_booking_claiming_slot(sample_booking("S-1"))
            .await
            .unwrap();
        let err = store
            .create_booking_claiming_slot(sample_booking("S-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn concurrent_claims_resolve_to_one_winner() {
        use std::sync::Arc;

        let store = Arc::new(InMemoryStorage::new());
        store.save_slot(sample_slot("S-1")).await.unwrap();

        let a = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store
                    .create_booking_claiming_slot(sample_booking("S-1"))
                    .await
            })
        };
        let b = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store
                    .create_booking_claiming_slot(sample_booking("S-1"))
                    .await
            })
        };

        let results = [a.await.unwrap(), b.await.unwrap()];
        let wins = results.iter().filter(|r| r.is_ok()).count();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(DomainError::Conflict(_))))
            .count();
        assert_eq!(wins, 1);
        assert_eq!(conflicts, 1);
    }

    #[tokio::test]
    async fn release_reopens_slot_for_claiming() {
        let store = InMemoryStorage::new();
        store.save_slot(sample_slot("S-1")).await.unwrap();

        let mut booking = store
            .create_booking_claiming_slot(sample_booking("S-1"))
            .await
            .unwrap();
        booking.cancel("test").unwrap();
        store.update_booking(booking).await.unwrap();
        store.release_slot("S-1").await.unwrap();

        let slot = store.get_slot("S-1").await.unwrap().unwrap();
        assert_eq!(slot.status, SlotStatus::Available);
        assert!(store
            .create_booking_claiming_slot(sample_booking("S-1"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn claim_on_maintenance_slot_conflicts() {
        let store = InMemoryStorage::new();
        let mut slot = sample_slot("S-1");
        slot.status = SlotStatus::Maintenance;
        store.save_slot(slot).await.unwrap();

        let err = store
            .create_booking_claiming_slot(sample_booking("S-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        // failed claim must not linger
        assert!(store
            .find_active_booking_for_slot("S-1")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn claimed_slot_ids_reflects_active_bookings() {
        let store = InMemoryStorage::new();
        let date = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        store.save_slot(sample_slot("S-1")).await.unwrap();
        store.save_slot(sample_slot("S-2")).await.unwrap();

        store
            .create_booking_claiming_slot(sample_booking("S-1"))
            .await
            .unwrap();

        let claimed = store.claimed_slot_ids("V-1", date).await.unwrap();
        assert_eq!(claimed, vec!["S-1".to_string()]);
    }

    #[tokio::test]
    async fn refunded_flip_succeeds_once_then_conflicts() {
        let store = InMemoryStorage::new();
        store.save_slot(sample_slot("S-1")).await.unwrap();
        let mut booking = store
            .create_booking_claiming_slot(sample_booking("S-1"))
            .await
            .unwrap();
        booking.record_payment(6000, 20000);
        booking.confirm().unwrap();
        store.update_booking(booking.clone()).await.unwrap();

        let flipped = store
            .mark_booking_refunded_if_paid(booking.id)
            .await
            .unwrap();
        assert_eq!(flipped.payment_status, PaymentStatus::Refunded);

        let err = store
            .mark_booking_refunded_if_paid(booking.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn voucher_redemption_counts() {
        let store = InMemoryStorage::new();
        store.record_voucher_redemption("CODE", "u1").await.unwrap();
        store.record_voucher_redemption("CODE", "u1").await.unwrap();
        store.record_voucher_redemption("CODE", "u2").await.unwrap();

        assert_eq!(store.voucher_redemptions("CODE").await.unwrap(), 3);
        assert_eq!(
            store.voucher_redemptions_for_user("CODE", "u1").await.unwrap(),
            2
        );
        assert_eq!(store.voucher_redemptions("OTHER").await.unwrap(), 0);
    }
}
