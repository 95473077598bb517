//! # Cart Model
//!
//! The pure shopping cart: lines, invariants and derived totals.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Operation                  Effect                                      │
//! │  ─────────                  ──────                                      │
//! │                                                                         │
//! │  add_product(p) ──────────► line for p? qty += 1 : push(p, qty 1)      │
//! │                             (refused once the line is at 999)           │
//! │                                                                         │
//! │  update_quantity(id, n) ──► n outside 1..=999? reject : line.qty = n   │
//! │                                                                         │
//! │  remove(id) ──────────────► retain(line.id != id)                      │
//! │                                                                         │
//! │  clear() ─────────────────► lines.clear()                              │
//! │                                                                         │
//! │  remove_submitted(order) ─► qty -= placed qty, drop lines at 0         │
//! │                                                                         │
//! │  total() ─────────────────► Σ price × qty, recomputed on every call    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - At most one line per product id
//! - Every quantity is in `1..=MAX_ITEM_QUANTITY`
//! - Insertion order is kept for display stability

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, ValidationError};
use crate::money::Money;
use crate::types::{OrderLine, OrderSubmission, Product};
use crate::validation::validate_quantity;
use crate::MAX_ITEM_QUANTITY;

/// One product entry in the cart.
///
/// Name, price and image are copied from the product when it is first added
/// so the cart renders without re-fetching the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: Uuid,
    pub name: String,
    /// Unit price, stored as integer cents.
    pub price: Money,
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl CartLine {
    /// Creates a line for a product with quantity 1.
    pub fn from_product(product: &Product) -> Self {
        CartLine {
            product_id: product.id,
            name: product.name.clone(),
            price: product.price,
            quantity: 1,
            image_url: product.image_url.clone(),
        }
    }

    /// Unit price × quantity.
    pub fn line_total(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }
}

/// The shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Adds one unit of a product.
    ///
    /// ## Behavior
    /// - If the product already has a line: its quantity increases by 1
    /// - Otherwise: a new line with quantity 1 is appended
    /// - A line already at [`MAX_ITEM_QUANTITY`] is left as is and the add
    ///   is refused
    pub fn add_product(&mut self, product: &Product) -> Result<(), ValidationError> {
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            let quantity = line.quantity.saturating_add(1);
            validate_quantity(quantity)?;
            line.quantity = quantity;
            return Ok(());
        }
        self.lines.push(CartLine::from_product(product));
        Ok(())
    }

    /// Removes the line for a product.
    ///
    /// Returns `true` if a line was removed, `false` if the product was not
    /// in the cart.
    pub fn remove(&mut self, product_id: Uuid) -> bool {
        let initial_len = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        self.lines.len() != initial_len
    }

    /// Replaces the quantity of a line.
    ///
    /// ## Behavior
    /// - Quantity < 1 or above [`MAX_ITEM_QUANTITY`]: rejected, cart unchanged
    /// - Product not in cart: `Ok(false)`, cart unchanged
    /// - Otherwise: `Ok(true)`
    pub fn update_quantity(&mut self, product_id: Uuid, quantity: i64) -> Result<bool, ValidationError> {
        validate_quantity(quantity)?;

        match self.lines.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => {
                line.quantity = quantity;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Takes a placed order's lines out of the cart.
    ///
    /// Each submitted quantity is subtracted from its line and lines that
    /// reach zero are dropped. When nothing changed since
    /// [`Cart::to_submission`], this empties the cart; units added while the
    /// order was in flight stay.
    pub fn remove_submitted(&mut self, submission: &OrderSubmission) {
        for placed in &submission.items {
            if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == placed.product_id) {
                line.quantity = line.quantity.saturating_sub(placed.quantity);
            }
        }
        self.lines.retain(|l| l.quantity >= 1);
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Looks up the line for a product.
    pub fn line(&self, product_id: Uuid) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    /// Number of distinct products.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total number of units (the badge count).
    pub fn item_count(&self) -> i64 {
        self.lines
            .iter()
            .fold(0i64, |count, l| count.saturating_add(l.quantity))
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Σ price × quantity over the current lines.
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Projects the cart to an order request: product ids and quantities only.
    pub fn to_submission(&self) -> OrderSubmission {
        OrderSubmission {
            items: self
                .lines
                .iter()
                .map(|l| OrderLine {
                    product_id: l.product_id,
                    quantity: l.quantity,
                })
                .collect(),
        }
    }

    // =========================================================================
    // Persistence Format
    // =========================================================================

    /// Serialises the cart as a JSON array of lines.
    pub fn to_persisted(&self) -> Result<String, CoreError> {
        serde_json::to_string(&self.lines).map_err(|e| CoreError::CorruptCart(e.to_string()))
    }

    /// Decodes a persisted cart.
    ///
    /// Any payload that parses is normalised so the invariants hold:
    /// - lines with a quantity outside `1..=MAX_ITEM_QUANTITY` are dropped
    /// - repeated product ids are merged into the first occurrence, capped
    ///   at [`MAX_ITEM_QUANTITY`]
    pub fn from_persisted(raw: &str) -> Result<Self, CoreError> {
        let decoded: Vec<CartLine> =
            serde_json::from_str(raw).map_err(|e| CoreError::CorruptCart(e.to_string()))?;

        let mut cart = Cart::new();
        for line in decoded
            .into_iter()
            .filter(|l| validate_quantity(l.quantity).is_ok())
        {
            match cart.lines.iter_mut().find(|l| l.product_id == line.product_id) {
                Some(existing) => {
                    existing.quantity = existing
                        .quantity
                        .checked_add(line.quantity)
                        .map_or(MAX_ITEM_QUANTITY, |q| q.min(MAX_ITEM_QUANTITY));
                }
                None => cart.lines.push(line),
            }
        }
        Ok(cart)
    }
}
