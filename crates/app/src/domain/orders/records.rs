//! Order Records

use arbor::money::Amount;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::models::{NewOrder, NewOrderItem, OrderStatus, PaymentMethod};

/// Insert row for the platform's `orders` table.
///
/// Optional text fields are written as explicit nulls rather than omitted,
/// matching the table's column defaults.
#[derive(Debug, Clone, Serialize)]
pub struct OrderRow {
    pub order_number: String,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub user_id: Option<Uuid>,
    pub payment_method: &'static str,
    pub remittance_last_five: Option<String>,
    pub shipping_name: Option<String>,
    pub shipping_phone: Option<String>,
    pub shipping_address: Option<String>,
    pub subtotal_amount: Amount,
    pub shipping_fee: Amount,
    /// Combined coupon and member discount, as the table has always
    /// stored a single discount column.
    pub discount_amount: Amount,
    pub total_amount: Amount,
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub coupon_id: Option<Uuid>,
}

impl OrderRow {
    /// Builds the insert row from a priced order.
    #[must_use]
    pub fn from_new(order: &NewOrder) -> Self {
        let remittance_last_five = match &order.payment {
            PaymentMethod::BankTransfer {
                remittance_last_five,
            } => Some(remittance_last_five.clone()),
            PaymentMethod::CreditCard => None,
        };

        Self {
            order_number: order.order_number.clone(),
            customer_name: none_if_empty(&order.customer.customer_name),
            customer_email: none_if_empty(&order.customer.customer_email),
            customer_phone: none_if_empty(&order.customer.customer_phone),
            user_id: order.user_id,
            payment_method: order.payment.as_str(),
            remittance_last_five,
            shipping_name: none_if_empty(&order.customer.shipping_name),
            shipping_phone: none_if_empty(&order.customer.shipping_phone),
            shipping_address: none_if_empty(&order.customer.shipping_address),
            subtotal_amount: order.breakdown.subtotal,
            shipping_fee: order.breakdown.shipping_fee,
            discount_amount: order.breakdown.coupon_discount + order.breakdown.member_discount,
            total_amount: order.breakdown.grand_total,
            status: order.status,
            notes: none_if_empty(&order.customer.notes),
            coupon_id: order.coupon.map(|coupon| coupon.id),
        }
    }
}

/// Insert row for the platform's `order_items` table.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItemRow {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: u32,
    pub price: Amount,
}

impl OrderItemRow {
    /// Builds the insert row for one order item.
    #[must_use]
    pub fn from_item(order_id: Uuid, item: &NewOrderItem) -> Self {
        Self {
            order_id,
            product_id: item.product_id,
            quantity: item.quantity,
            price: item.unit_price,
        }
    }
}

/// The slice of the created order row the service reads back.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedOrderRow {
    pub id: Uuid,
}

fn none_if_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
