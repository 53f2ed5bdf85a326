//! Pricing
//!
//! Assembles the order total from a cart subtotal, an optionally applied
//! coupon, the member profile and the configured discount rates. The
//! assembly is a pure function of resolved inputs: all asynchrony lives in
//! acquiring them, and callers simply recompute whenever an input changes.

use crate::{
    coupons::Coupon,
    membership::{DiscountSettings, MemberProfile, member_discount},
    money::{Amount, AmountError},
};

/// Flat shipping fee charged per order, in whole dollars.
pub const FLAT_SHIPPING_FEE: Amount = 150;

/// The full set of computed order amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutBreakdown {
    /// Sum of line prices before shipping and discounts.
    pub subtotal: Amount,

    /// Shipping fee after any free-shipping override.
    pub shipping_fee: Amount,

    /// Amount granted by the applied coupon.
    pub coupon_discount: Amount,

    /// Amount granted by the membership tier.
    pub member_discount: Amount,

    /// Final amount payable, clamped at zero.
    pub grand_total: Amount,
}

/// The member profile fetch, as seen by the assembly.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ProfileState {
    /// The fetch has not resolved; amounts must not be computed yet.
    #[default]
    Loading,

    /// The fetch reached a terminal state. `None` covers guest checkout
    /// and failed lookups alike; both price without a member discount.
    Ready(Option<MemberProfile>),
}

/// Outcome of an assembly attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum BreakdownState {
    /// The profile is still resolving. Callers show a pending indicator
    /// rather than a transiently zero-discount total.
    Pending,

    /// All inputs resolved; the breakdown is final for these inputs.
    Ready(CheckoutBreakdown),
}

/// Assembles the order breakdown.
///
/// Every component is already integral — the subtotal is a sum of integer
/// line totals and each discount rounds at its own derivation step — so
/// the grand total is a plain clamped combination:
/// `max(0, subtotal + shipping − coupon − member)`.
///
/// The coupon's free-shipping flag zeroes the shipping fee independently
/// of its amount discount. The coupon and member discounts are computed
/// independently of each other's presence.
///
/// # Errors
///
/// Returns an [`AmountError`] if a percentage calculation overflows.
pub fn compute_breakdown(
    cart_total: Amount,
    coupon: Option<&Coupon>,
    profile: &ProfileState,
    settings: &DiscountSettings,
    shipping_fee: Amount,
) -> Result<BreakdownState, AmountError> {
    let ProfileState::Ready(profile) = profile else {
        return Ok(BreakdownState::Pending);
    };

    let subtotal = cart_total;

    let shipping_fee = if coupon.is_some_and(|coupon| coupon.free_shipping) {
        0
    } else {
        shipping_fee
    };

    let coupon_discount = coupon.map_or(Ok(0), |coupon| coupon.discount_amount(subtotal))?;

    let member_discount = profile.as_ref().map_or(Ok(0), |profile| {
        member_discount(profile.tier, subtotal, settings)
    })?;

    let grand_total = subtotal
        .saturating_add(shipping_fee)
        .saturating_sub(coupon_discount.saturating_add(member_discount));

    Ok(BreakdownState::Ready(CheckoutBreakdown {
        subtotal,
        shipping_fee,
        coupon_discount,
        member_discount,
        grand_total,
    }))
}
