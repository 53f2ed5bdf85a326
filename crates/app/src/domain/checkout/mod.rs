//! Checkout

pub mod errors;
pub mod service;

pub use errors::{ApplyCouponError, SubmitError};
pub use service::*;
