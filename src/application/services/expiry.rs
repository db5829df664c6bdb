//! Background task that expires overdue pending bookings.
//!
//! Runs in a tokio::spawn loop, checking every `check_interval_secs`
//! for pending bookings whose payment window has elapsed and expiring
//! them, which releases their slots. A gateway confirmation racing the
//! sweep is safe: confirm rejects terminal bookings.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::time;
use tracing::{info, warn};

use crate::application::services::BookingService;
use crate::domain::DomainResult;
use crate::infrastructure::Storage;
use crate::shared::shutdown::ShutdownSignal;

/// Start the booking expiry background task.
pub fn start_booking_expiry_task(
    storage: Arc<dyn Storage>,
    bookings: Arc<BookingService>,
    shutdown: ShutdownSignal,
    check_interval_secs: u64,
    pending_expiry_minutes: i64,
) {
    tokio::spawn(async move {
        info!(
            check_interval = check_interval_secs,
            payment_window_min = pending_expiry_minutes,
            "Booking expiry task started"
        );

        let mut interval = time::interval(time::Duration::from_secs(check_interval_secs));

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = expire_overdue(&storage, &bookings, pending_expiry_minutes).await {
                        warn!(error = %e, "Booking expiry check error");
                    }
                }
                _ = shutdown.notified().wait() => {
                    info!("Booking expiry task shutting down");
                    break;
                }
            }
        }

        info!("Booking expiry task stopped");
    });
}

async fn expire_overdue(
    storage: &Arc<dyn Storage>,
    bookings: &Arc<BookingService>,
    pending_expiry_minutes: i64,
) -> DomainResult<()> {
    let deadline = Utc::now() - Duration::minutes(pending_expiry_minutes);
    let overdue = storage.find_pending_created_before(deadline).await?;

    if overdue.is_empty() {
        return Ok(());
    }

    info!(count = overdue.len(), "Expiring overdue pending bookings");

    for booking in overdue {
        // expire is a silent no-op when a confirmation slipped in
        if let Err(e) = bookings.expire(booking.id).await {
            warn!(booking_id = %booking.id, error = %e, "Failed to expire booking");
        }
    }

    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::CreateBookingCommand;
    use crate::domain::{
        BookingStatus, DepositPolicy, PaymentMethod, Slot, SlotStatus, Venue,
    };
    use crate::infrastructure::InMemoryStorage;
    use chrono::{NaiveDate, NaiveTime};

    #[tokio::test]
    async fn sweep_expires_only_overdue_pending_bookings() {
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
        let date = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        for (id, hour) in [("S-1", 18), ("S-2", 19)] {
            store
                .save_slot(Slot::new(
                    id,
                    "V-1",
                    date,
                    NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
                    NaiveTime::from_hms_opt(hour + 1, 0, 0).unwrap(),
                    20000,
                    10,
                ))
                .await
                .unwrap();
        }

        let bookings = Arc::new(BookingService::new(store.clone() as Arc<dyn Storage>));
        let cmd = |slot: &str| CreateBookingCommand {
            venue_id: "V-1".to_string(),
            slot_id: slot.to_string(),
            date,
            user_id: "user-1".to_string(),
            players_count: 2,
            payment_method: PaymentMethod::Online,
            voucher_code: None,
        };

        let overdue = bookings.create(cmd("S-1")).await.unwrap();
        let confirmed = bookings.create(cmd("S-2")).await.unwrap();
        bookings.confirm(confirmed.id).await.unwrap();

        // window of 0 minutes: every pending booking is overdue
        let storage: Arc<dyn Storage> = store.clone();
        expire_overdue(&storage, &bookings, 0).await.unwrap();

        let expired = store.get_booking(overdue.id).await.unwrap().unwrap();
        assert_eq!(expired.status, BookingStatus::Expired);
        let kept = store.get_booking(confirmed.id).await.unwrap().unwrap();
        assert_eq!(kept.status, BookingStatus::Confirmed);

        let slot = store.get_slot("S-1").await.unwrap().unwrap();
        assert_eq!(slot.status, SlotStatus::Available);
        let slot2 = store.get_slot("S-2").await.unwrap().unwrap();
        assert_eq!(slot2.status, SlotStatus::Booked);
    }
}
