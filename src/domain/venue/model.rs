//! Venue domain entity

/// Deposit policy attached to a venue.
///
/// Determines the upfront share of a booking's price. Immutable for the
/// lifetime of a booking so a refund can always be reconciled against
/// the policy that priced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepositPolicy {
    /// Percentage of the booking price (0–100)
    Percentage(u8),
    /// Fixed amount in minor currency units
    Fixed(i64),
}

impl DepositPolicy {
    /// Deposit owed for a booking priced at `amount` (minor units).
    pub fn deposit_for(&self, amount: i64) -> i64 {
        match self {
            Self::Percentage(pct) => amount * i64::from((*pct).min(100)) / 100,
            Self::Fixed(value) => (*value).min(amount),
        }
    }
}

/// Sports venue
#[derive(Debug, Clone)]
pub struct Venue {
    /// Unique venue ID
    pub id: String,
    /// Display name
    pub name: String,
    /// User ID of the venue owner
    pub owner_id: String,
    /// Hourly price in minor currency units
    pub hourly_price: i64,
    /// Upfront deposit policy
    pub deposit_policy: DepositPolicy,
    /// Opening hour (0–23)
    pub open_hour: u8,
    /// Closing hour (0–24)
    pub close_hour: u8,
}

impl Venue {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        owner_id: impl Into<String>,
        hourly_price: i64,
        deposit_policy: DepositPolicy,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            owner_id: owner_id.into(),
            hourly_price,
            deposit_policy,
            open_hour: 8,
            close_hour: 23,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_deposit() {
        let policy = DepositPolicy::Percentage(30);
        assert_eq!(policy.deposit_for(20000), 6000);
    }

    #[test]
    fn percentage_deposit_clamped_to_100() {
        let policy = DepositPolicy::Percentage(150);
        assert_eq!(policy.deposit_for(20000), 20000);
    }

    #[test]
    fn fixed_deposit() {
        let policy = DepositPolicy::Fixed(5000);
        assert_eq!(policy.deposit_for(20000), 5000);
    }

    #[test]
    fn fixed_deposit_never_exceeds_price() {
        let policy = DepositPolicy::Fixed(30000);
        assert_eq!(policy.deposit_for(20000), 20000);
    }
}
