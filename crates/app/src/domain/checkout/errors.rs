//! Checkout errors.

use arbor::{coupons::CouponIneligible, money::AmountError};
use thiserror::Error;

use crate::{domain::orders::OrdersServiceError, platform::PlatformError};

/// Why a coupon could not be applied.
///
/// Every variant maps to its own user-facing message; only the lookup
/// failure is unclassified, and it keeps the raw backend detail in its
/// source chain.
#[derive(Debug, Error)]
pub enum ApplyCouponError {
    /// Nothing remained after normalizing the entered code.
    #[error("enter a coupon code")]
    EmptyCode,

    /// No active coupon matches the code.
    #[error("coupon code is invalid")]
    NotFound,

    /// The coupon exists but failed an eligibility check.
    #[error(transparent)]
    Ineligible(#[from] CouponIneligible),

    /// The lookup itself failed.
    #[error("coupon lookup failed")]
    Platform(#[source] PlatformError),
}

/// Why an order submission was rejected or failed.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The cart emptied before submission, for example from another
    /// session. The customer goes back to the cart, not to an error page.
    #[error("cart is empty")]
    EmptyCart,

    /// The member profile fetch has not reached a terminal state.
    #[error("member profile is still loading")]
    ProfileStillLoading,

    /// Bank transfers need the last five digits of the remitting account.
    #[error("remittance reference must be exactly five digits")]
    InvalidRemittanceDigits,

    /// Amount computation failed.
    #[error(transparent)]
    Amount(#[from] AmountError),

    /// Order persistence failed; the cart and snapshot are left intact.
    #[error(transparent)]
    Orders(#[from] OrdersServiceError),
}
