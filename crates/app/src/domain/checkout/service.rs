//! Checkout Session

use arbor::{
    cart::Cart,
    coupons::{Coupon, CouponCode},
    membership::DiscountSettings,
    money::{Amount, AmountError},
    pricing::{BreakdownState, ProfileState, compute_breakdown},
};
use jiff::Timestamp;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    domain::{
        coupons::CouponsRepository,
        orders::{
            OrdersService,
            models::{
                AppliedCouponRef, CustomerInfo, NewOrder, NewOrderItem, PaymentMethod,
                PlacedOrder, generate_order_number,
            },
        },
        profiles::ProfilesRepository,
        settings::SettingsRepository,
    },
    storage::CartStore,
};

use super::errors::{ApplyCouponError, SubmitError};

/// One customer's checkout.
///
/// Owns the per-checkout state: the applied coupon lives in memory only
/// and is never persisted, the member profile goes through an explicit
/// loading state, and discount settings are read once at the start of the
/// session. Collaborators are injected at construction; the session holds
/// no hidden global client.
pub struct CheckoutSession<C, P, S, O, T> {
    coupons: C,
    profiles: P,
    settings_repo: S,
    orders: O,
    cart_store: T,
    shipping_fee: Amount,
    settings: DiscountSettings,
    profile: ProfileState,
    applied_coupon: Option<Coupon>,
}

impl<C, P, S, O, T> CheckoutSession<C, P, S, O, T>
where
    C: CouponsRepository,
    P: ProfilesRepository,
    S: SettingsRepository,
    O: OrdersService,
    T: CartStore,
{
    /// Create a session over the injected collaborators.
    ///
    /// The profile starts in [`ProfileState::Loading`], so breakdowns are
    /// pending until [`CheckoutSession::begin`] resolves it.
    pub fn new(
        coupons: C,
        profiles: P,
        settings_repo: S,
        orders: O,
        cart_store: T,
        shipping_fee: Amount,
    ) -> Self {
        Self {
            coupons,
            profiles,
            settings_repo,
            orders,
            cart_store,
            shipping_fee,
            settings: DiscountSettings::default(),
            profile: ProfileState::Loading,
            applied_coupon: None,
        }
    }

    /// Load discount settings and the member profile.
    ///
    /// Neither read can block checkout: settings degrade to defaults and a
    /// failed profile fetch checks out as a guest. Either way the profile
    /// reaches a terminal state and breakdowns become computable.
    pub async fn begin(&mut self, user_id: Option<Uuid>) {
        self.settings = match self.settings_repo.fetch_discount_settings().await {
            Ok(settings) => settings,
            Err(source) => {
                warn!("failed to load discount settings, using defaults: {source}");
                DiscountSettings::default()
            }
        };

        let profile = match user_id {
            None => None,
            Some(user_id) => match self.profiles.fetch(user_id).await {
                Ok(profile) => profile,
                Err(source) => {
                    warn!("failed to load member profile, continuing as guest: {source}");
                    None
                }
            },
        };

        self.profile = ProfileState::Ready(profile);
    }

    /// The profile state as the pricing engine sees it.
    pub fn profile(&self) -> &ProfileState {
        &self.profile
    }

    /// The discount settings in effect for this session.
    pub fn settings(&self) -> &DiscountSettings {
        &self.settings
    }

    /// The coupon currently applied, if any.
    pub fn applied_coupon(&self) -> Option<&Coupon> {
        self.applied_coupon.as_ref()
    }

    /// Apply a coupon code against the current cart.
    ///
    /// Eligibility always runs against the subtotal as it is right now —
    /// re-applying after the cart changed repeats every check from
    /// scratch. Any failure leaves no coupon applied.
    ///
    /// # Errors
    ///
    /// Returns an [`ApplyCouponError`] naming the specific failure.
    pub async fn apply_coupon(
        &mut self,
        raw_code: &str,
        cart: &Cart,
    ) -> Result<(), ApplyCouponError> {
        self.applied_coupon = None;

        let code = CouponCode::new(raw_code);

        if code.is_empty() {
            return Err(ApplyCouponError::EmptyCode);
        }

        let coupon = self
            .coupons
            .find_active(&code)
            .await
            .map_err(ApplyCouponError::Platform)?
            .ok_or(ApplyCouponError::NotFound)?;

        coupon.eligible_for(cart.total_price(), Timestamp::now())?;

        info!(code = %coupon.code, "applied coupon");

        self.applied_coupon = Some(coupon);

        Ok(())
    }

    /// Remove the applied coupon.
    pub fn remove_coupon(&mut self) {
        self.applied_coupon = None;
    }

    /// Compute the breakdown for the current inputs.
    ///
    /// Pending while the profile is still loading; otherwise a full
    /// recomputation from scratch — the engine is cheap and
    /// side-effect-free, so every input change just calls this again.
    ///
    /// # Errors
    ///
    /// Returns an [`AmountError`] if a percentage calculation overflows.
    pub fn breakdown(&self, cart: &Cart) -> Result<BreakdownState, AmountError> {
        compute_breakdown(
            cart.total_price(),
            self.applied_coupon.as_ref(),
            &self.profile,
            &self.settings,
            self.shipping_fee,
        )
    }

    /// Submit the order.
    ///
    /// On success the cart, its snapshot and the applied coupon are
    /// cleared. On failure everything is left intact so the customer can
    /// retry.
    ///
    /// # Errors
    ///
    /// Returns a [`SubmitError`] for an empty cart, an unresolved profile,
    /// invalid remittance digits, or a persistence failure.
    pub async fn submit(
        &mut self,
        cart: &mut Cart,
        user_id: Option<Uuid>,
        customer: CustomerInfo,
        payment: PaymentMethod,
    ) -> Result<PlacedOrder, SubmitError> {
        if cart.is_empty() {
            return Err(SubmitError::EmptyCart);
        }

        if let PaymentMethod::BankTransfer {
            remittance_last_five,
        } = &payment
        {
            if remittance_last_five.len() != 5
                || !remittance_last_five.bytes().all(|b| b.is_ascii_digit())
            {
                return Err(SubmitError::InvalidRemittanceDigits);
            }
        }

        let BreakdownState::Ready(breakdown) = self.breakdown(cart)? else {
            return Err(SubmitError::ProfileStillLoading);
        };

        let status = payment.initial_status();

        let coupon = self.applied_coupon.as_ref().map(|coupon| AppliedCouponRef {
            id: coupon.id,
            observed_used_count: coupon.used_count,
        });

        let order = NewOrder {
            order_number: generate_order_number(),
            user_id,
            customer,
            payment,
            breakdown,
            status,
            coupon,
            items: cart.iter().map(NewOrderItem::from_line).collect(),
        };

        let placed = self.orders.place_order(order).await?;

        // Only a durably placed order consumes the checkout.
        cart.clear();

        if let Err(source) = self.cart_store.clear() {
            warn!("failed to clear the cart snapshot: {source}");
        }

        self.applied_coupon = None;

        info!(order_number = %placed.order_number, "order submitted");

        Ok(placed)
    }
}

#[cfg(test)]
mod tests {
    use arbor::{
        cart::NewCartLine,
        coupons::{CouponDiscount, CouponIneligible},
        membership::{MemberProfile, MembershipTier},
        pricing::FLAT_SHIPPING_FEE,
    };
    use testresult::TestResult;

    use crate::{
        domain::{
            coupons::MockCouponsRepository,
            orders::{MockOrdersService, OrdersServiceError},
            profiles::MockProfilesRepository,
            settings::MockSettingsRepository,
        },
        platform::PlatformError,
        storage::MockCartStore,
    };

    use super::*;

    type TestSession = CheckoutSession<
        MockCouponsRepository,
        MockProfilesRepository,
        MockSettingsRepository,
        MockOrdersService,
        MockCartStore,
    >;

    struct Mocks {
        coupons: MockCouponsRepository,
        profiles: MockProfilesRepository,
        settings: MockSettingsRepository,
        orders: MockOrdersService,
        store: MockCartStore,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                coupons: MockCouponsRepository::new(),
                profiles: MockProfilesRepository::new(),
                settings: MockSettingsRepository::new(),
                orders: MockOrdersService::new(),
                store: MockCartStore::new(),
            }
        }

        fn into_session(self) -> TestSession {
            CheckoutSession::new(
                self.coupons,
                self.profiles,
                self.settings,
                self.orders,
                self.store,
                FLAT_SHIPPING_FEE,
            )
        }
    }

    fn user_id() -> Uuid {
        Uuid::from_u128(0xE1)
    }

    fn cart_totalling(subtotal: Amount) -> Cart {
        let mut cart = Cart::new();

        cart.add(NewCartLine {
            product_id: Uuid::from_u128(1),
            name: "Oak Table".to_string(),
            unit_price: subtotal,
            compare_at_price: None,
            image_url: None,
            stock_quantity: 9,
        });

        cart
    }

    fn stored_coupon(code: &str) -> Coupon {
        Coupon {
            id: Uuid::from_u128(0xC0),
            code: CouponCode::new(code),
            discount: CouponDiscount::Fixed(100),
            min_purchase: 0,
            usage_limit: None,
            used_count: 4,
            expires_at: None,
            is_active: true,
            free_shipping: false,
            description: String::new(),
        }
    }

    fn vip_profile() -> MemberProfile {
        MemberProfile {
            user_id: user_id(),
            tier: MembershipTier::Vip,
            full_name: None,
            email: None,
            phone: None,
            address: None,
        }
    }

    fn platform_error() -> PlatformError {
        PlatformError::UnexpectedResponse("boom".to_string())
    }

    fn bank_transfer(digits: &str) -> PaymentMethod {
        PaymentMethod::BankTransfer {
            remittance_last_five: digits.to_string(),
        }
    }

    #[test]
    fn breakdown_is_pending_before_the_profile_resolves() -> TestResult {
        let session = Mocks::new().into_session();
        let cart = cart_totalling(1_000);

        assert_eq!(session.breakdown(&cart)?, BreakdownState::Pending);

        Ok(())
    }

    #[tokio::test]
    async fn begin_resolves_profile_and_settings() -> TestResult {
        let mut mocks = Mocks::new();

        mocks
            .settings
            .expect_fetch_discount_settings()
            .times(1)
            .returning(|| Ok(DiscountSettings::from_raw(Some("15"), Some("30"))));

        mocks
            .profiles
            .expect_fetch()
            .times(1)
            .returning(|_| Ok(Some(vip_profile())));

        let mut session = mocks.into_session();
        session.begin(Some(user_id())).await;

        let cart = cart_totalling(1_000);
        let BreakdownState::Ready(breakdown) = session.breakdown(&cart)? else {
            return Err("expected a ready breakdown".into());
        };

        // VIP at the configured 15%.
        assert_eq!(breakdown.member_discount, 150);

        Ok(())
    }

    #[tokio::test]
    async fn failed_settings_read_degrades_to_defaults() -> TestResult {
        let mut mocks = Mocks::new();

        mocks
            .settings
            .expect_fetch_discount_settings()
            .times(1)
            .returning(|| Err(platform_error()));

        mocks
            .profiles
            .expect_fetch()
            .times(1)
            .returning(|_| Ok(Some(vip_profile())));

        let mut session = mocks.into_session();
        session.begin(Some(user_id())).await;

        let cart = cart_totalling(1_000);
        let BreakdownState::Ready(breakdown) = session.breakdown(&cart)? else {
            return Err("expected a ready breakdown".into());
        };

        // Default VIP rate of 10%.
        assert_eq!(breakdown.member_discount, 100);

        Ok(())
    }

    #[tokio::test]
    async fn failed_profile_fetch_checks_out_as_guest() -> TestResult {
        let mut mocks = Mocks::new();

        mocks
            .settings
            .expect_fetch_discount_settings()
            .returning(|| Ok(DiscountSettings::default()));

        mocks
            .profiles
            .expect_fetch()
            .times(1)
            .returning(|_| Err(platform_error()));

        let mut session = mocks.into_session();
        session.begin(Some(user_id())).await;

        // The fetch failed, but the state is terminal and prices compute.
        assert_eq!(session.profile(), &ProfileState::Ready(None));

        let cart = cart_totalling(1_000);
        let BreakdownState::Ready(breakdown) = session.breakdown(&cart)? else {
            return Err("expected a ready breakdown".into());
        };

        assert_eq!(breakdown.member_discount, 0);

        Ok(())
    }

    #[tokio::test]
    async fn guest_sessions_skip_the_profile_fetch() {
        let mut mocks = Mocks::new();

        mocks
            .settings
            .expect_fetch_discount_settings()
            .returning(|| Ok(DiscountSettings::default()));

        mocks.profiles.expect_fetch().times(0);

        let mut session = mocks.into_session();
        session.begin(None).await;

        assert_eq!(session.profile(), &ProfileState::Ready(None));
    }

    #[tokio::test]
    async fn empty_code_is_rejected_before_lookup() {
        let mut mocks = Mocks::new();
        mocks.coupons.expect_find_active().times(0);

        let mut session = mocks.into_session();
        let cart = cart_totalling(1_000);

        let result = session.apply_coupon("   ", &cart).await;

        assert!(
            matches!(result, Err(ApplyCouponError::EmptyCode)),
            "got {result:?}"
        );
    }

    #[tokio::test]
    async fn unknown_code_reports_not_found() {
        let mut mocks = Mocks::new();

        mocks
            .coupons
            .expect_find_active()
            .withf(|code| code.as_str() == "NOPE")
            .times(1)
            .returning(|_| Ok(None));

        let mut session = mocks.into_session();
        let cart = cart_totalling(1_000);

        let result = session.apply_coupon(" nope ", &cart).await;

        assert!(
            matches!(result, Err(ApplyCouponError::NotFound)),
            "got {result:?}"
        );
        assert!(session.applied_coupon().is_none());
    }

    #[tokio::test]
    async fn lookup_failure_keeps_the_backend_detail() {
        let mut mocks = Mocks::new();

        mocks
            .coupons
            .expect_find_active()
            .times(1)
            .returning(|_| Err(platform_error()));

        let mut session = mocks.into_session();
        let cart = cart_totalling(1_000);

        let result = session.apply_coupon("SUMMER", &cart).await;

        match result {
            Err(ApplyCouponError::Platform(PlatformError::UnexpectedResponse(detail))) => {
                assert!(detail.contains("boom"));
            }
            other => panic!("expected a platform error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn eligibility_runs_against_the_fresh_subtotal() {
        let mut mocks = Mocks::new();

        let mut coupon = stored_coupon("BIGSPEND");
        coupon.min_purchase = 2_000;

        mocks
            .coupons
            .expect_find_active()
            .times(2)
            .returning(move |_| Ok(Some(coupon.clone())));

        let mut session = mocks.into_session();

        // First attempt: the cart qualifies.
        let big_cart = cart_totalling(3_000);
        assert!(session.apply_coupon("BIGSPEND", &big_cart).await.is_ok());

        // The cart shrank; re-applying re-runs the checks and now fails.
        let small_cart = cart_totalling(1_000);
        let result = session.apply_coupon("BIGSPEND", &small_cart).await;

        assert!(
            matches!(
                result,
                Err(ApplyCouponError::Ineligible(
                    CouponIneligible::BelowMinimumPurchase { minimum: 2_000 }
                ))
            ),
            "got {result:?}"
        );
        assert!(session.applied_coupon().is_none());
    }

    #[tokio::test]
    async fn applied_coupon_changes_the_breakdown() -> TestResult {
        let mut mocks = Mocks::new();

        mocks
            .settings
            .expect_fetch_discount_settings()
            .returning(|| Ok(DiscountSettings::default()));

        mocks
            .coupons
            .expect_find_active()
            .times(1)
            .returning(|_| Ok(Some(stored_coupon("SUMMER100"))));

        let mut session = mocks.into_session();
        session.begin(None).await;

        let cart = cart_totalling(1_000);
        session.apply_coupon("summer100", &cart).await?;

        let BreakdownState::Ready(breakdown) = session.breakdown(&cart)? else {
            return Err("expected a ready breakdown".into());
        };

        assert_eq!(breakdown.coupon_discount, 100);
        assert_eq!(breakdown.grand_total, 1_000 + FLAT_SHIPPING_FEE - 100);

        // Removing the coupon restores the undiscounted total.
        session.remove_coupon();

        let BreakdownState::Ready(breakdown) = session.breakdown(&cart)? else {
            return Err("expected a ready breakdown".into());
        };

        assert_eq!(breakdown.coupon_discount, 0);

        Ok(())
    }

    #[tokio::test]
    async fn submitting_an_empty_cart_is_rejected() {
        let mut session = Mocks::new().into_session();
        let mut cart = Cart::new();

        let result = session
            .submit(&mut cart, None, CustomerInfo::default(), bank_transfer("12345"))
            .await;

        assert!(matches!(result, Err(SubmitError::EmptyCart)), "got {result:?}");
    }

    #[tokio::test]
    async fn submitting_before_the_profile_resolves_is_rejected() {
        let mut session = Mocks::new().into_session();
        let mut cart = cart_totalling(1_000);

        let result = session
            .submit(&mut cart, None, CustomerInfo::default(), bank_transfer("12345"))
            .await;

        assert!(
            matches!(result, Err(SubmitError::ProfileStillLoading)),
            "got {result:?}"
        );
    }

    #[tokio::test]
    async fn bad_remittance_digits_are_rejected() {
        let mut session = Mocks::new().into_session();
        let mut cart = cart_totalling(1_000);

        for digits in ["", "123", "123456", "12a45"] {
            let result = session
                .submit(
                    &mut cart,
                    None,
                    CustomerInfo::default(),
                    bank_transfer(digits),
                )
                .await;

            assert!(
                matches!(result, Err(SubmitError::InvalidRemittanceDigits)),
                "digits {digits:?} got {result:?}"
            );
        }
    }

    #[tokio::test]
    async fn successful_submission_consumes_the_checkout() -> TestResult {
        let mut mocks = Mocks::new();

        mocks
            .settings
            .expect_fetch_discount_settings()
            .returning(|| Ok(DiscountSettings::default()));

        mocks
            .coupons
            .expect_find_active()
            .returning(|_| Ok(Some(stored_coupon("SUMMER100"))));

        mocks
            .orders
            .expect_place_order()
            .times(1)
            .withf(|order| {
                order.coupon
                    == Some(AppliedCouponRef {
                        id: Uuid::from_u128(0xC0),
                        observed_used_count: 4,
                    })
                    && order.items.len() == 1
                    && order.breakdown.coupon_discount == 100
            })
            .returning(|order| {
                Ok(PlacedOrder {
                    id: Uuid::from_u128(0xF0),
                    order_number: order.order_number,
                })
            });

        mocks.store.expect_clear().times(1).returning(|| Ok(()));

        let mut session = mocks.into_session();
        session.begin(None).await;

        let mut cart = cart_totalling(1_000);
        session.apply_coupon("SUMMER100", &cart).await?;

        let placed = session
            .submit(&mut cart, None, CustomerInfo::default(), bank_transfer("12345"))
            .await?;

        assert!(placed.order_number.starts_with("ORD"));
        assert!(cart.is_empty());
        assert!(session.applied_coupon().is_none());

        Ok(())
    }

    #[tokio::test]
    async fn failed_submission_leaves_the_cart_intact() -> TestResult {
        let mut mocks = Mocks::new();

        mocks
            .settings
            .expect_fetch_discount_settings()
            .returning(|| Ok(DiscountSettings::default()));

        mocks.orders.expect_place_order().times(1).returning(|_| {
            Err(OrdersServiceError::OrderCreate(platform_error()))
        });

        mocks.store.expect_clear().times(0);

        let mut session = mocks.into_session();
        session.begin(None).await;

        let mut cart = cart_totalling(1_000);

        let result = session
            .submit(&mut cart, None, CustomerInfo::default(), bank_transfer("12345"))
            .await;

        assert!(matches!(result, Err(SubmitError::Orders(_))), "got {result:?}");
        assert!(!cart.is_empty());

        Ok(())
    }
}
