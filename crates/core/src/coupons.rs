//! Coupons
//!
//! A coupon is a code-redeemable discount rule with eligibility
//! constraints. Codes are canonically upper-cased; eligibility checks run
//! in a fixed order and the first failing check wins, so callers can show
//! one specific message per failure.

use std::fmt;

use decimal_percentage::Percentage;
use jiff::Timestamp;
use thiserror::Error;
use uuid::Uuid;

use crate::money::{Amount, AmountError, percent_of};

/// A canonical coupon code: trimmed and upper-cased on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CouponCode(String);

impl CouponCode {
    /// Normalizes raw user input into canonical form.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_uppercase())
    }

    /// The canonical code string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether anything remains after normalization.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CouponCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The discount a coupon grants on the order subtotal.
#[derive(Debug, Clone, PartialEq)]
pub enum CouponDiscount {
    /// A fixed amount off.
    Fixed(Amount),

    /// A percentage of the subtotal, optionally capped.
    Percentage {
        /// Fraction of the subtotal to take off.
        percent: Percentage,

        /// Upper bound on the granted amount, if set.
        cap: Option<Amount>,
    },
}

/// Reasons a found coupon cannot be applied.
///
/// Variants are ordered the way the checks run; an expired, exhausted
/// coupon below its minimum reports [`CouponIneligible::Expired`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CouponIneligible {
    /// The expiry timestamp is strictly in the past.
    #[error("coupon has expired")]
    Expired,

    /// The usage limit has been reached.
    #[error("coupon has no uses remaining")]
    Exhausted,

    /// The subtotal has not reached the minimum purchase amount.
    #[error("order subtotal must reach {minimum} to use this coupon")]
    BelowMinimumPurchase {
        /// The required minimum, for display.
        minimum: Amount,
    },
}

/// A code-redeemable discount rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Coupon {
    /// Coupon identifier.
    pub id: Uuid,

    /// Canonical redemption code.
    pub code: CouponCode,

    /// The discount granted when eligible.
    pub discount: CouponDiscount,

    /// Eligibility floor on the order subtotal; zero means no floor.
    pub min_purchase: Amount,

    /// Maximum number of redemptions, if limited.
    pub usage_limit: Option<u32>,

    /// Redemptions recorded so far; never decremented.
    pub used_count: u32,

    /// Expiry timestamp; `None` never expires.
    pub expires_at: Option<Timestamp>,

    /// Whether redemption is currently enabled. Lookups only return active
    /// coupons; the flag is kept for the admin model.
    pub is_active: bool,

    /// Whether this coupon also waives the shipping fee. Independent of the
    /// amount discount.
    pub free_shipping: bool,

    /// Human description shown in the admin console.
    pub description: String,
}

impl Coupon {
    /// Checks whether this coupon may be applied to an order.
    ///
    /// Checks run in order — expiry, usage, minimum purchase — and the
    /// first failure is returned. Callers re-run this with a fresh subtotal
    /// on every application attempt, since the cart may have changed.
    ///
    /// # Errors
    ///
    /// Returns the first failing [`CouponIneligible`] check.
    pub fn eligible_for(&self, subtotal: Amount, now: Timestamp) -> Result<(), CouponIneligible> {
        if self.expires_at.is_some_and(|expires_at| expires_at < now) {
            return Err(CouponIneligible::Expired);
        }

        if self
            .usage_limit
            .is_some_and(|limit| self.used_count >= limit)
        {
            return Err(CouponIneligible::Exhausted);
        }

        if self.min_purchase > 0 && subtotal < self.min_purchase {
            return Err(CouponIneligible::BelowMinimumPurchase {
                minimum: self.min_purchase,
            });
        }

        Ok(())
    }

    /// Computes the discount this coupon grants on a subtotal.
    ///
    /// Percentage discounts round half away from zero, then apply the cap.
    ///
    /// # Errors
    ///
    /// Returns an [`AmountError`] if the percentage calculation overflows.
    pub fn discount_amount(&self, subtotal: Amount) -> Result<Amount, AmountError> {
        match &self.discount {
            CouponDiscount::Fixed(value) => Ok(*value),
            CouponDiscount::Percentage { percent, cap } => {
                let raw = percent_of(*percent, subtotal)?;

                Ok(cap.map_or(raw, |cap| raw.min(cap)))
            }
        }
    }
}
