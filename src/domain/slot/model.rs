//! Slot domain entity

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

/// Slot status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    /// Open for booking
    Available,
    /// Claimed by a booking
    Booked,
    /// Held back by the venue (e.g. for walk-ins)
    Reserved,
    /// Blocked for maintenance
    Maintenance,
}

impl SlotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Booked => "booked",
            Self::Reserved => "reserved",
            Self::Maintenance => "maintenance",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "available" => Some(Self::Available),
            "booked" => Some(Self::Booked),
            "reserved" => Some(Self::Reserved),
            "maintenance" => Some(Self::Maintenance),
            _ => None,
        }
    }
}

impl std::fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A bookable time interval at a venue on a specific date.
///
/// A slot flips to `booked` only through the store's atomic claim tied
/// to exactly one booking; at most one active booking may reference it.
#[derive(Debug, Clone)]
pub struct Slot {
    /// Unique slot ID
    pub id: String,
    /// Owning venue ID
    pub venue_id: String,
    /// Calendar date
    pub date: NaiveDate,
    /// Start of the interval
    pub start_time: NaiveTime,
    /// End of the interval
    pub end_time: NaiveTime,
    /// Current status
    pub status: SlotStatus,
    /// Price in minor currency units
    pub price: i64,
    /// Maximum players
    pub capacity: u32,
}

impl Slot {
    pub fn new(
        id: impl Into<String>,
        venue_id: impl Into<String>,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        price: i64,
        capacity: u32,
    ) -> Self {
        Self {
            id: id.into(),
            venue_id: venue_id.into(),
            date,
            start_time,
            end_time,
            status: SlotStatus::Available,
            price,
            capacity,
        }
    }

    /// UTC instant the slot begins. Refund tiers are measured against this.
    pub fn start_at(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.date.and_time(self.start_time))
    }

    pub fn is_available(&self) -> bool {
        self.status == SlotStatus::Available
    }
}

// ── Tests ──────────────────────────────────────────────────────
