//! Voucher validation
//!
//! Pure read-side checks; redemption counting side effects belong to
//! the store and happen during settlement, never here.

use std::sync::Arc;

use chrono::Utc;
use log::debug;

use crate::domain::{DomainResult, Voucher};
use crate::infrastructure::Storage;

/// Result of checking a voucher code against an amount.
#[derive(Debug, Clone)]
pub struct VoucherCheck {
    pub eligible: bool,
    /// Discount granted, capped at the checked amount. Zero when
    /// ineligible.
    pub discount: i64,
    /// Snapshot of the voucher, when the code resolved at all.
    pub voucher: Option<Voucher>,
    /// Ineligibility reason, for passing through to the caller.
    pub reason: Option<String>,
}

impl VoucherCheck {
    fn ineligible(voucher: Option<Voucher>, reason: impl Into<String>) -> Self {
        Self {
            eligible: false,
            discount: 0,
            voucher,
            reason: Some(reason.into()),
        }
    }
}

/// Checks a voucher code's validity and value against an amount and an
/// optional user.
pub struct VoucherValidator {
    storage: Arc<dyn Storage>,
}

impl VoucherValidator {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn validate(
        &self,
        code: &str,
        amount: i64,
        user_id: Option<&str>,
    ) -> DomainResult<VoucherCheck> {
        let Some(voucher) = self.storage.get_voucher(code).await? else {
            return Ok(VoucherCheck::ineligible(None, "unknown voucher code"));
        };

        let now = Utc::now();
        if voucher.is_not_yet_active(now) {
            return Ok(VoucherCheck::ineligible(
                Some(voucher),
                "voucher is not active yet",
            ));
        }
        if voucher.is_expired(now) {
            return Ok(VoucherCheck::ineligible(Some(voucher), "voucher has expired"));
        }
        if let Some(max_uses) = voucher.max_uses {
            if self.storage.voucher_redemptions(code).await? >= max_uses {
                return Ok(VoucherCheck::ineligible(
                    Some(voucher),
                    "voucher has been exhausted",
                ));
            }
        }
        if let (Some(limit), Some(user)) = (voucher.per_user_limit, user_id) {
            if self.storage.voucher_redemptions_for_user(code, user).await? >= limit {
                return Ok(VoucherCheck::ineligible(
                    Some(voucher),
                    "per-user redemption limit reached",
                ));
            }
        }
        if !voucher.meets_min_amount(amount) {
            let min = voucher.min_amount.unwrap_or(0);
            return Ok(VoucherCheck::ineligible(
                Some(voucher),
                format!("amount is below the voucher minimum of {min}"),
            ));
        }

        let discount = voucher.discount_for(amount);
        debug!("Voucher {} grants {} off {}", code, discount, amount);
        Ok(VoucherCheck {
            eligible: true,
            discount,
            voucher: Some(voucher),
            reason: None,
        })
    }
}

// ── Tests ──────────────────────────────────────────────────────
