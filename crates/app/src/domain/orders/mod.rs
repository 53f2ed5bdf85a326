//! Orders

pub mod errors;
pub mod models;
pub mod records;
mod repository;
pub mod service;

pub use errors::OrdersServiceError;
pub use repository::*;
pub use service::*;
