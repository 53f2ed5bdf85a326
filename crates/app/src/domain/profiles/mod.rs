//! Profiles

pub mod records;
pub mod repository;

pub use repository::*;
