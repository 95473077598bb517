//! # Cart Commands
//!
//! `shop cart show|add|remove|set|clear`.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Checkout │────►│  Order   │       │
//! │  │  Cart    │     │          │     │          │     │  Placed  │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                                  │             │
//! │                   cart add                         cart emptied         │
//! │                   cart set                                              │
//! │                   cart remove                                           │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                   cart clear ─────────────────► (back to empty)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::io::Write;

use storefront_client::Storefront;
use tracing::debug;

use super::parse_id;
use crate::error::CliError;

/// Prints every line and the total.
pub fn show(shop: &Storefront, out: &mut dyn Write) -> Result<(), CliError> {
    debug!("cart show command");
    let lines = shop.cart.lines();

    if lines.is_empty() {
        writeln!(out, "Your cart is empty.")?;
        return Ok(());
    }

    for line in &lines {
        writeln!(
            out,
            "{:>3} x {:<32} {:>10}   {}",
            line.quantity,
            line.name,
            line.line_total().to_string(),
            line.product_id
        )?;
    }
    writeln!(out, "Items: {}", shop.cart.item_count())?;
    writeln!(out, "Total: {}", shop.cart.total())?;
    Ok(())
}

/// Adds one unit of a product fetched from the catalog.
pub async fn add(shop: &Storefront, id: &str, out: &mut dyn Write) -> Result<(), CliError> {
    let product = shop.catalog.get(parse_id(id)?).await?;
    shop.cart.add_to_cart(&product)?;

    let quantity = shop
        .cart
        .with_cart(|cart| cart.line(product.id).map(|l| l.quantity))
        .unwrap_or(1);
    writeln!(out, "Added {} to your cart ({} in cart).", product.name, quantity)?;
    Ok(())
}

pub fn remove(shop: &Storefront, id: &str, out: &mut dyn Write) -> Result<(), CliError> {
    let product_id = parse_id(id)?;

    if shop.cart.remove_from_cart(product_id) {
        writeln!(out, "Removed {} from your cart.", product_id)?;
    } else {
        writeln!(out, "{} was not in your cart.", product_id)?;
    }
    Ok(())
}

/// Sets a line's quantity. Quantities outside 1..=999 are refused.
pub fn set_quantity(shop: &Storefront, id: &str, quantity: i64, out: &mut dyn Write) -> Result<(), CliError> {
    let product_id = parse_id(id)?;

    if shop.cart.update_quantity(product_id, quantity)? {
        writeln!(out, "Quantity set to {}.", quantity)?;
    } else {
        writeln!(out, "{} is not in your cart.", product_id)?;
    }
    Ok(())
}

pub fn clear(shop: &Storefront, out: &mut dyn Write) -> Result<(), CliError> {
    shop.cart.clear_cart();
    writeln!(out, "Cart cleared.")?;
    Ok(())
}
