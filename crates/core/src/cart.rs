//! Cart
//!
//! An ordered collection of product lines, unique by product id. Quantities
//! are clamped into `[1, stock_quantity]` on every mutation rather than
//! rejected. The serde shape doubles as the persisted snapshot format.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::Amount;

/// One product line in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Product identifier.
    pub product_id: Uuid,

    /// Display name captured when the product was added.
    pub name: String,

    /// Unit price in whole dollars.
    pub unit_price: Amount,

    /// Optional strike-through comparison price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare_at_price: Option<Amount>,

    /// Optional product image reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Requested quantity; always within `[1, stock_quantity]`.
    pub quantity: u32,

    /// Stock ceiling at the time the product was last added.
    pub stock_quantity: u32,
}

impl CartLine {
    /// The line's contribution to the subtotal.
    #[must_use]
    pub fn line_total(&self) -> Amount {
        self.unit_price * Amount::from(self.quantity)
    }

    /// The quantity ceiling, never below one so clamping stays well-formed.
    fn ceiling(&self) -> u32 {
        self.stock_quantity.max(1)
    }
}

/// A product to add to the cart; the quantity is implied.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCartLine {
    /// Product identifier.
    pub product_id: Uuid,

    /// Display name.
    pub name: String,

    /// Unit price in whole dollars.
    pub unit_price: Amount,

    /// Optional strike-through comparison price.
    pub compare_at_price: Option<Amount>,

    /// Optional product image reference.
    pub image_url: Option<String>,

    /// Current stock ceiling.
    pub stock_quantity: u32,
}

/// Shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a product to the cart.
    ///
    /// If the product is already present its quantity is incremented by one,
    /// clamped to the freshly supplied stock ceiling; otherwise a new line is
    /// appended with quantity one.
    pub fn add(&mut self, product: NewCartLine) {
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.product_id == product.product_id)
        {
            line.stock_quantity = product.stock_quantity;
            line.quantity = line.quantity.saturating_add(1).clamp(1, line.ceiling());
            return;
        }

        self.lines.push(CartLine {
            product_id: product.product_id,
            name: product.name,
            unit_price: product.unit_price,
            compare_at_price: product.compare_at_price,
            image_url: product.image_url,
            quantity: 1,
            stock_quantity: product.stock_quantity,
        });
    }

    /// Sets the quantity of a line, clamped into `[1, stock_quantity]`.
    ///
    /// Unknown product ids are ignored.
    pub fn set_quantity(&mut self, product_id: Uuid, quantity: u32) {
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.product_id == product_id)
        {
            line.quantity = quantity.clamp(1, line.ceiling());
        }
    }

    /// Removes a line from the cart.
    pub fn remove(&mut self, product_id: Uuid) {
        self.lines.retain(|line| line.product_id != product_id);
    }

    /// Removes every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Looks up a line by product id.
    pub fn get(&self, product_id: Uuid) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_id == product_id)
    }

    /// Iterates over the lines in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.iter()
    }

    /// The number of distinct product lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of items across all lines.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.lines
            .iter()
            .map(|line| u64::from(line.quantity))
            .sum()
    }

    /// Sum of unit price times quantity across all lines.
    ///
    /// Already integral, so this is the order subtotal as-is.
    #[must_use]
    pub fn total_price(&self) -> Amount {
        self.lines.iter().map(CartLine::line_total).sum()
    }
}
