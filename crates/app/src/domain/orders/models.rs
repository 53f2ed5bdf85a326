//! Order Models

use arbor::{cart::CartLine, membership::MemberProfile, money::Amount, pricing::CheckoutBreakdown};
use rand::{Rng, distributions::Alphanumeric, thread_rng};
use uuid::Uuid;

/// Payment options at checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentMethod {
    /// Bank transfer; carries the last five digits of the remitting
    /// account for reconciliation.
    BankTransfer {
        /// Last five digits of the remitting account.
        remittance_last_five: String,
    },

    /// Credit card, settled externally.
    CreditCard,
}

impl PaymentMethod {
    /// The wire value stored on the order row.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BankTransfer { .. } => "bank_transfer",
            Self::CreditCard => "credit_card",
        }
    }

    /// The status a fresh order starts in for this payment method.
    ///
    /// Bank transfers wait for the remittance to be confirmed manually.
    #[must_use]
    pub fn initial_status(&self) -> OrderStatus {
        match self {
            Self::BankTransfer { .. } => OrderStatus::WaitingPayment,
            Self::CreditCard => OrderStatus::Pending,
        }
    }
}

/// Lifecycle states of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    WaitingPayment,
    Paid,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

/// Customer and shipping details captured at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerInfo {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub shipping_name: String,
    pub shipping_phone: String,
    pub shipping_address: String,
    pub notes: String,
}

impl CustomerInfo {
    /// Prefills the checkout form from a member profile.
    #[must_use]
    pub fn prefill_from(profile: &MemberProfile) -> Self {
        let name = profile.full_name.clone().unwrap_or_default();
        let phone = profile.phone.clone().unwrap_or_default();

        Self {
            customer_name: name.clone(),
            customer_email: profile.email.clone().unwrap_or_default(),
            customer_phone: phone.clone(),
            shipping_name: name,
            shipping_phone: phone,
            shipping_address: profile.address.clone().unwrap_or_default(),
            notes: String::new(),
        }
    }
}

/// Reference to the coupon applied to an order, with the usage count
/// observed at validation time for the conditional increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedCouponRef {
    /// Coupon identifier.
    pub id: Uuid,

    /// `used_count` as observed when the coupon was validated.
    pub observed_used_count: u32,
}

/// One purchased line, with the unit price frozen at purchase time so
/// later catalog price changes do not rewrite history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    /// Product identifier.
    pub product_id: Uuid,

    /// Quantity purchased.
    pub quantity: u32,

    /// Unit price at the time of purchase.
    pub unit_price: Amount,
}

impl NewOrderItem {
    /// Snapshots a cart line.
    #[must_use]
    pub fn from_line(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id,
            quantity: line.quantity,
            unit_price: line.unit_price,
        }
    }
}

/// A fully priced order ready for persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    /// Human-facing order number.
    pub order_number: String,

    /// The authenticated user, when not a guest checkout.
    pub user_id: Option<Uuid>,

    /// Customer and shipping snapshot.
    pub customer: CustomerInfo,

    /// Chosen payment method.
    pub payment: PaymentMethod,

    /// The computed amounts.
    pub breakdown: CheckoutBreakdown,

    /// Initial status.
    pub status: OrderStatus,

    /// The applied coupon, if any.
    pub coupon: Option<AppliedCouponRef>,

    /// One item per cart line.
    pub items: Vec<NewOrderItem>,
}

/// A successfully persisted order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    /// Platform row id.
    pub id: Uuid,

    /// Human-facing order number.
    pub order_number: String,
}

/// Generates an order number like `ORD20260805-K3QZ`.
#[must_use]
pub fn generate_order_number() -> String {
    let date = jiff::Zoned::now().date();

    let suffix: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(4)
        .map(|byte| char::from(byte).to_ascii_uppercase())
        .collect();

    format!(
        "ORD{:04}{:02}{:02}-{suffix}",
        date.year(),
        date.month(),
        date.day()
    )
}
