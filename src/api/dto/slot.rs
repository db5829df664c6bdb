//! Slot API DTOs

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::Slot;

/// Query parameters for the availability listing
#[derive(Debug, Deserialize, IntoParams)]
pub struct SlotsQuery {
    /// Date to resolve availability for (YYYY-MM-DD)
    pub date: NaiveDate,
}

/// A bookable time slot
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SlotDto {
    /// Slot ID
    pub id: String,
    /// Owning venue ID
    pub venue_id: String,
    /// Calendar date
    pub date: NaiveDate,
    /// Interval start
    pub start_time: NaiveTime,
    /// Interval end
    pub end_time: NaiveTime,
    /// Status: `available`, `booked`, `reserved` or `maintenance`
    pub status: String,
    /// Price in minor currency units
    pub price: i64,
    /// Maximum players
    pub capacity: u32,
}

impl From<Slot> for SlotDto {
    fn from(slot: Slot) -> Self {
        Self {
            id: slot.id,
            venue_id: slot.venue_id,
            date: slot.date,
            start_time: slot.start_time,
            end_time: slot.end_time,
            status: slot.status.as_str().to_string(),
            price: slot.price,
            capacity: slot.capacity,
        }
    }
}
