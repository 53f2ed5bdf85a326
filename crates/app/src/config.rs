//! Runtime Config

use std::path::PathBuf;

use arbor::{money::Amount, pricing::FLAT_SHIPPING_FEE};
use clap::Parser;

/// Storefront runtime settings, read from arguments or the environment.
#[derive(Debug, Parser)]
pub struct StorefrontConfig {
    /// Base URL of the data platform's REST endpoint
    #[arg(long, env = "PLATFORM_URL")]
    pub platform_url: String,

    /// API key for the data platform
    #[arg(long, env = "PLATFORM_API_KEY")]
    pub platform_api_key: String,

    /// Flat shipping fee charged per order, in whole dollars
    #[arg(long, env = "SHIPPING_FEE", default_value_t = FLAT_SHIPPING_FEE)]
    pub shipping_fee: Amount,

    /// Path of the cart snapshot file
    #[arg(long, env = "CART_SNAPSHOT_PATH", default_value = "cart.json")]
    pub cart_snapshot_path: PathBuf,
}

impl StorefrontConfig {
    /// Load configuration, reading a `.env` file first when present.
    #[must_use]
    pub fn load() -> Self {
        _ = dotenvy::dotenv();

        Self::parse()
    }
}
