//! # Order History Command
//!
//! `shop orders`.

use std::io::Write;

use storefront_client::{OrderHistoryView, Storefront};

use crate::error::CliError;

/// Prints the signed-in user's orders, newest first.
pub async fn show(shop: &Storefront, out: &mut dyn Write) -> Result<(), CliError> {
    let orders = match shop.orders.for_current_user(&shop.session).await? {
        OrderHistoryView::SignInRequired => return Err(CliError::SignInRequired),
        OrderHistoryView::Orders(orders) => orders,
    };

    if orders.is_empty() {
        writeln!(out, "You have no orders yet.")?;
        return Ok(());
    }

    for order in &orders {
        writeln!(
            out,
            "Order {}  {}  {:<10} {}",
            order.id,
            order.created_at.format("%Y-%m-%d %H:%M"),
            order.status.to_string(),
            order.total()
        )?;
        for item in &order.items {
            writeln!(
                out,
                "  {:>3} x {}  @ {}",
                item.quantity, item.product_id, item.price_at_purchase
            )?;
        }
    }
    Ok(())
}
