//! Orders service errors.

use thiserror::Error;

use crate::platform::PlatformError;

/// Errors placing an order.
///
/// The variants name the phase that failed, because the phases have
/// different consequences: a failed order insert leaves nothing behind,
/// while a failure after it leaves a created order that support may need
/// to reconcile.
#[derive(Debug, Error)]
pub enum OrdersServiceError {
    /// The order row itself could not be created; nothing was persisted
    /// and the coupon counter is untouched.
    #[error("failed to create order")]
    OrderCreate(#[source] PlatformError),

    /// The order exists but its line items could not be created; the
    /// coupon counter is untouched.
    #[error("failed to create order items")]
    ItemsCreate(#[source] PlatformError),

    /// Transport failure while recording coupon usage, after the order
    /// and its items were durably created.
    #[error("failed to record coupon usage")]
    UsageBookkeeping(#[source] PlatformError),
}
