//! Membership
//!
//! Membership tiers drive an automatic percentage discount whose rates are
//! configured by the admin console. Missing or malformed configuration
//! degrades to defaults rather than failing checkout.

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::{Amount, AmountError, percent_of};

/// Default VIP discount in percent points, used when configuration is
/// absent or malformed.
pub const DEFAULT_VIP_PERCENT: u32 = 10;

/// Default VVIP discount in percent points.
pub const DEFAULT_VVIP_PERCENT: u32 = 20;

/// Customer classification driving the automatic member discount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MembershipTier {
    /// Ordinary member; pays full price.
    #[default]
    Normal,

    /// VIP member.
    Vip,

    /// VVIP member.
    Vvip,
}

impl MembershipTier {
    /// Parses a raw membership level string from the platform.
    ///
    /// Only the exact platform values `"VIP"` and `"VVIP"` map to a
    /// discounted tier; anything else — absent, `"regular"`, unknown — is
    /// [`MembershipTier::Normal`].
    #[must_use]
    pub fn from_level(level: Option<&str>) -> Self {
        match level {
            Some("VIP") => Self::Vip,
            Some("VVIP") => Self::Vvip,
            _ => Self::Normal,
        }
    }

    /// Display name for the tier.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "Member",
            Self::Vip => "VIP",
            Self::Vvip => "VVIP",
        }
    }
}

/// A member profile loaded from the platform.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberProfile {
    /// Platform user id.
    pub user_id: Uuid,

    /// Membership tier.
    pub tier: MembershipTier,

    /// Full name, used to prefill the order form.
    pub full_name: Option<String>,

    /// Contact email.
    pub email: Option<String>,

    /// Contact phone.
    pub phone: Option<String>,

    /// Default shipping address.
    pub address: Option<String>,
}

/// Admin-configured member discount rates.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountSettings {
    vip: Percentage,
    vvip: Percentage,
}

impl Default for DiscountSettings {
    fn default() -> Self {
        Self {
            vip: points_to_rate(Decimal::from(DEFAULT_VIP_PERCENT)),
            vvip: points_to_rate(Decimal::from(DEFAULT_VVIP_PERCENT)),
        }
    }
}

impl DiscountSettings {
    /// Builds settings from raw percent-point strings, as stored in the
    /// platform's key-value settings table.
    ///
    /// Each field falls back to its default independently when unset,
    /// unparseable, or outside `[0, 100]`.
    #[must_use]
    pub fn from_raw(vip: Option<&str>, vvip: Option<&str>) -> Self {
        let defaults = Self::default();

        Self {
            vip: parse_points(vip).map_or(defaults.vip, points_to_rate),
            vvip: parse_points(vvip).map_or(defaults.vvip, points_to_rate),
        }
    }

    /// The discount rate for a tier; `None` for tiers without a discount.
    #[must_use]
    pub fn rate_for(&self, tier: MembershipTier) -> Option<Percentage> {
        match tier {
            MembershipTier::Normal => None,
            MembershipTier::Vip => Some(self.vip),
            MembershipTier::Vvip => Some(self.vvip),
        }
    }

    /// The price multiplier after the member discount (`1 − rate`).
    ///
    /// Display only; the monetary contract goes through
    /// [`member_discount`].
    #[must_use]
    pub fn multiplier_for(&self, tier: MembershipTier) -> Decimal {
        self.rate_for(tier)
            .map_or(Decimal::ONE, |rate| Decimal::ONE - rate * Decimal::ONE)
    }

    /// The Taiwanese price-scale label for a tier, e.g. `"9折"` for a 10%
    /// discount (pay nine tenths). Display only.
    #[must_use]
    pub fn scale_label_for(&self, tier: MembershipTier) -> Option<String> {
        self.rate_for(tier)?;

        let scale = (self.multiplier_for(tier) * Decimal::TEN)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

        Some(format!("{scale}折"))
    }
}

/// Computes the membership discount for a subtotal.
///
/// # Errors
///
/// Returns an [`AmountError`] if the percentage calculation overflows.
pub fn member_discount(
    tier: MembershipTier,
    subtotal: Amount,
    settings: &DiscountSettings,
) -> Result<Amount, AmountError> {
    match settings.rate_for(tier) {
        Some(rate) => percent_of(rate, subtotal),
        None => Ok(0),
    }
}

/// Parses a percent-point string, rejecting values outside `[0, 100]`.
fn parse_points(raw: Option<&str>) -> Option<Decimal> {
    let points: Decimal = raw?.trim().parse().ok()?;

    if points < Decimal::ZERO || points > Decimal::ONE_HUNDRED {
        return None;
    }

    Some(points)
}

/// Converts percent points to a fractional rate.
fn points_to_rate(points: Decimal) -> Percentage {
    Percentage::from(points / Decimal::ONE_HUNDRED)
}
