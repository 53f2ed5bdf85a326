//! Orders Service

use async_trait::async_trait;
use mockall::automock;
use tracing::{info, warn};

use crate::domain::coupons::CouponsRepository;

use super::{
    errors::OrdersServiceError,
    models::{AppliedCouponRef, NewOrder, PlacedOrder},
    records::{OrderItemRow, OrderRow},
    repository::OrdersRepository,
};

/// Attempts at the conditional usage increment before giving up.
const USAGE_INCREMENT_ATTEMPTS: u32 = 3;

/// Persists orders against the platform.
#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Create the order, its line items, and record coupon usage —
    /// strictly in that order, so a partial failure never leaves a
    /// recorded redemption without an order behind it.
    async fn place_order(&self, order: NewOrder) -> Result<PlacedOrder, OrdersServiceError>;
}

/// Platform-backed orders service.
#[derive(Debug, Clone)]
pub struct PlatformOrdersService<O, C> {
    orders: O,
    coupons: C,
}

impl<O, C> PlatformOrdersService<O, C> {
    /// Create a service over the given repositories.
    #[must_use]
    pub fn new(orders: O, coupons: C) -> Self {
        Self { orders, coupons }
    }
}

#[async_trait]
impl<O, C> OrdersService for PlatformOrdersService<O, C>
where
    O: OrdersRepository,
    C: CouponsRepository,
{
    #[tracing::instrument(
        name = "orders.service.place_order",
        skip(self, order),
        fields(order_number = %order.order_number),
        err
    )]
    async fn place_order(&self, order: NewOrder) -> Result<PlacedOrder, OrdersServiceError> {
        let order_id = self
            .orders
            .create_order(OrderRow::from_new(&order))
            .await
            .map_err(OrdersServiceError::OrderCreate)?;

        let items = order
            .items
            .iter()
            .map(|item| OrderItemRow::from_item(order_id, item))
            .collect();

        self.orders
            .create_order_items(items)
            .await
            .map_err(OrdersServiceError::ItemsCreate)?;

        // Usage bookkeeping comes last: an increment can be refused without
        // blocking an order that is already durably created.
        if let Some(coupon) = order.coupon {
            self.record_coupon_usage(coupon).await?;
        }

        info!(order_uuid = %order_id, "placed order");

        Ok(PlacedOrder {
            id: order_id,
            order_number: order.order_number,
        })
    }
}

impl<O, C> PlatformOrdersService<O, C>
where
    O: OrdersRepository,
    C: CouponsRepository,
{
    /// Increments the coupon's usage counter with an optimistic
    /// compare-and-swap: the update only matches the row still at the
    /// observed count, so the counter can never overrun its limit no
    /// matter how many submissions race.
    async fn record_coupon_usage(
        &self,
        applied: AppliedCouponRef,
    ) -> Result<(), OrdersServiceError> {
        let mut observed = applied.observed_used_count;

        for _attempt in 0..USAGE_INCREMENT_ATTEMPTS {
            let updated = self
                .coupons
                .increment_usage(applied.id, observed)
                .await
                .map_err(OrdersServiceError::UsageBookkeeping)?;

            if updated {
                return Ok(());
            }

            // Lost the race: re-read the counter before trying again.
            let current = self
                .coupons
                .find_by_id(applied.id)
                .await
                .map_err(OrdersServiceError::UsageBookkeeping)?;

            let Some(current) = current else {
                warn!(coupon_uuid = %applied.id, "coupon disappeared before usage was recorded");
                return Ok(());
            };

            if current
                .usage_limit
                .is_some_and(|limit| current.used_count >= limit)
            {
                // A concurrent order took the last use. This order is
                // already durable, so it stands; the counter stays at its
                // limit and the shortfall surfaces in reconciliation.
                warn!(coupon_uuid = %applied.id, "usage limit reached before this order's increment");
                return Ok(());
            }

            observed = current.used_count;
        }

        warn!(coupon_uuid = %applied.id, "gave up recording coupon usage after contention");

        Ok(())
    }
}
