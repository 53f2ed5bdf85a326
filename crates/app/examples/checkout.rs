//! Wires a checkout session against a live platform and prints the order
//! summary for the locally saved cart.

use arbor::{membership::MembershipTier, pricing::BreakdownState, summary::write_summary};
use arbor_app::{
    config::StorefrontConfig,
    domain::{
        checkout::CheckoutSession,
        coupons::RestCouponsRepository,
        orders::PlatformOrdersService,
        profiles::RestProfilesRepository,
        settings::RestSettingsRepository,
    },
    platform::{PlatformClient, PlatformConfig},
    storage::{CartStore, FileCartStore},
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = StorefrontConfig::load();

    // The client is built once here and handed to every repository.
    let platform = PlatformClient::new(PlatformConfig {
        base_url: config.platform_url.clone(),
        api_key: config.platform_api_key.clone(),
    });

    let coupons = RestCouponsRepository::new(platform.clone());
    let orders = PlatformOrdersService::new(
        arbor_app::domain::orders::RestOrdersRepository::new(platform.clone()),
        RestCouponsRepository::new(platform.clone()),
    );

    let store = FileCartStore::new(config.cart_snapshot_path.clone());
    let cart = store.load();

    let mut session = CheckoutSession::new(
        coupons,
        RestProfilesRepository::new(platform.clone()),
        RestSettingsRepository::new(platform),
        orders,
        store,
        config.shipping_fee,
    );

    session.begin(None).await;

    if let BreakdownState::Ready(breakdown) = session.breakdown(&cart)? {
        write_summary(
            std::io::stdout(),
            &cart,
            &breakdown,
            session.applied_coupon(),
            MembershipTier::Normal,
            session.settings(),
        )?;
    }

    Ok(())
}
