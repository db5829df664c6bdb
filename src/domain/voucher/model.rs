//! Voucher domain entity

use chrono::{DateTime, Utc};

/// Discount kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoucherKind {
    /// Fixed amount in minor currency units
    Fixed,
    /// Percentage of the charged amount (0–100)
    Percentage,
}

impl VoucherKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Percentage => "percentage",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "fixed" => Some(Self::Fixed),
            "percentage" => Some(Self::Percentage),
            _ => None,
        }
    }
}

/// A code redeemable for a fixed or percentage discount.
///
/// Read-only from the engine's perspective; redemption counting is the
/// store's responsibility.
#[derive(Debug, Clone)]
pub struct Voucher {
    /// Redemption code
    pub code: String,
    /// Discount kind
    pub kind: VoucherKind,
    /// Fixed amount or percentage, per `kind`
    pub value: i64,
    /// Not redeemable before this instant
    pub valid_from: Option<DateTime<Utc>>,
    /// Not redeemable after this instant
    pub valid_until: Option<DateTime<Utc>>,
    /// Minimum charged amount to qualify
    pub min_amount: Option<i64>,
    /// Redemptions allowed per user
    pub per_user_limit: Option<u32>,
    /// Total redemptions allowed
    pub max_uses: Option<u32>,
}

impl Voucher {
    /// Discount granted against `amount`, always capped at `amount`.
    pub fn discount_for(&self, amount: i64) -> i64 {
        let raw = match self.kind {
            VoucherKind::Fixed => self.value,
            VoucherKind::Percentage => amount * self.value.clamp(0, 100) / 100,
        };
        raw.clamp(0, amount)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.valid_until.is_some_and(|until| now > until)
    }

    pub fn is_not_yet_active(&self, now: DateTime<Utc>) -> bool {
        self.valid_from.is_some_and(|from| now < from)
    }

    pub fn meets_min_amount(&self, amount: i64) -> bool {
        self.min_amount.is_none_or(|min| amount >= min)
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn fixed_voucher(value: i64) -> Voucher {
        Voucher {
            code: "WELCOME".to_string(),
            kind: VoucherKind::Fixed,
            value,
            valid_from: None,
            valid_until: None,
            min_amount: None,
            per_user_limit: None,
            max_uses: None,
        }
    }

    #[test]
    fn fixed_discount_capped_at_amount() {
        let v = fixed_voucher(30000);
        assert_eq!(v.discount_for(20000), 20000);
        assert_eq!(v.discount_for(50000), 30000);
    }

    #[test]
    fn percentage_discount() {
        let mut v = fixed_voucher(50);
        v.kind = VoucherKind::Percentage;
        assert_eq!(v.discount_for(20000), 10000);
    }

    #[test]
    fn expiry_window() {
        let mut v = fixed_voucher(1000);
        let now = Utc::now();
        v.valid_until = Some(now - Duration::hours(1));
        assert!(v.is_expired(now));

        v.valid_until = None;
        v.valid_from = Some(now + Duration::hours(1));
        assert!(v.is_not_yet_active(now));
    }

    #[test]
    fn min_amount_floor() {
        let mut v = fixed_voucher(1000);
        v.min_amount = Some(15000);
        assert!(!v.meets_min_amount(10000));
        assert!(v.meets_min_amount(15000));
    }
}
