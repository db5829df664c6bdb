//! Slot availability resolution

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use log::debug;

use crate::domain::{DomainError, DomainResult, Slot};
use crate::infrastructure::Storage;

/// Computes the free-slot set for a venue and date.
///
/// Joins the slot table against active bookings instead of trusting
/// slot status alone: a pending (unpaid) booking is a provisional hold
/// even before the slot status flip is visible. The result is advisory
/// for display; correctness against races comes from the atomic claim
/// in booking creation.
pub struct SlotAvailabilityResolver {
    storage: Arc<dyn Storage>,
}

impl SlotAvailabilityResolver {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Slots on `date` that are `available` and unclaimed by any
    /// booking in {pending, confirmed}, ascending by start time.
    ///
    /// `NotFound` for an unknown venue; an empty vec (not an error)
    /// when no schedule was generated for the date.
    pub async fn free_slots(&self, venue_id: &str, date: NaiveDate) -> DomainResult<Vec<Slot>> {
        self.storage
            .get_venue(venue_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Venue", "id", venue_id))?;

        let slots = self.storage.list_slots_for_date(venue_id, date).await?;
        let claimed: HashSet<String> = self
            .storage
            .claimed_slot_ids(venue_id, date)
            .await?
            .into_iter()
            .collect();

        let mut free: Vec<Slot> = slots
            .into_iter()
            .filter(|s| s.is_available() && !claimed.contains(&s.id))
            .collect();
        free.sort_by_key(|s| s.start_time);

        debug!(
            "Resolved {} free slots for venue {} on {}",
            free.len(),
            venue_id,
            date
        );
        Ok(free)
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Booking, DepositPolicy, PaymentMethod, SlotStatus, Venue};
    use crate::infrastructure::InMemoryStorage;
    use chrono::NaiveTime;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()
    }

    fn slot(id: &str, hour: u32) -> Slot {
        Slot::new(
            id,
            "V-1",
            date(),
            NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(hour + 1, 0, 0).unwrap(),
            20000,
            10,
        )
    }

    async fn store_with_venue() -> Arc<InMemoryStorage> {
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
    }

    #[tokio::test]
    async fn unknown_venue_is_not_found() {
        let store = store_with_venue().await;
        let resolver = SlotAvailabilityResolver::new(store);
        let err = resolver.free_slots("V-404", date()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn empty_schedule_is_empty_vec() {
        let store = store_with_venue().await;
        let resolver = SlotAvailabilityResolver::new(store);
        assert!(resolver.free_slots("V-1", date()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn ordered_by_start_time() {
        let store = store_with_venue().await;
        store.save_slot(slot("S-20", 20)).await.unwrap();
        store.save_slot(slot("S-18", 18)).await.unwrap();
        store.save_slot(slot("S-19", 19)).await.unwrap();

        let resolver = SlotAvailabilityResolver::new(store);
        let free = resolver.free_slots("V-1", date()).await.unwrap();
        let ids: Vec<&str> = free.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["S-18", "S-19", "S-20"]);
    }

    #[tokio::test]
    async fn excludes_maintenance_and_reserved() {
        let store = store_with_venue().await;
        let mut maint = slot("S-18", 18);
        maint.status = SlotStatus::Maintenance;
        let mut held = slot("S-19", 19);
        held.status = SlotStatus::Reserved;
        store.save_slot(maint).await.unwrap();
        store.save_slot(held).await.unwrap();
        store.save_slot(slot("S-20", 20)).await.unwrap();

        let resolver = SlotAvailabilityResolver::new(store);
        let free = resolver.free_slots("V-1", date()).await.unwrap();
        assert_eq!(free.len(), 1);
        assert_eq!(free[0].id, "S-20");
    }

    #[tokio::test]
    async fn pending_booking_is_a_provisional_hold() {
        let store = store_with_venue().await;
        store.save_slot(slot("S-18", 18)).await.unwrap();

        // Pending claim; slot status flip notwithstanding, the join
        // must exclude it.
        store
            .create_booking_claiming_slot(Booking::new(
                "S-18",
                "V-1",
                "user-1",
                20000,
                4,
                PaymentMethod::Online,
                None,
            ))
            .await
            .unwrap();

        let resolver = SlotAvailabilityResolver::new(store);
        assert!(resolver.free_slots("V-1", date()).await.unwrap().is_empty());
    }
}
