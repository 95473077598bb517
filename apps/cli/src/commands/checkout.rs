//! # Checkout Command
//!
//! `shop checkout` places the cart as an order, then shows the order
//! history the way the storefront navigates to it after success.

use std::io::Write;

use storefront_client::{CheckoutOutcome, Route, Storefront};
use tracing::debug;

use super::orders;
use crate::error::CliError;

pub async fn checkout(shop: &Storefront, out: &mut dyn Write) -> Result<(), CliError> {
    let outcome = shop.checkout.checkout().await;
    debug!(placed = outcome.is_placed(), "checkout command");

    match &outcome {
        CheckoutOutcome::RedirectToLogin => {}
        CheckoutOutcome::EmptyCart => {
            writeln!(out, "Your cart is empty. Nothing to check out.")?;
        }
        CheckoutOutcome::Placed { order } => {
            if let Some(notice) = outcome.notice() {
                writeln!(out, "{}", notice)?;
            }
            writeln!(out, "Order {}: {}", order.id, order.total())?;
            writeln!(out)?;
        }
        CheckoutOutcome::Failed { message } => {
            return Err(CliError::CheckoutFailed {
                notice: outcome.notice().unwrap_or_default(),
                reason: message.clone(),
            });
        }
    }

    match outcome.next_route() {
        Some(Route::Login) => Err(CliError::SignInRequired),
        Some(Route::Orders) => orders::show(shop, out).await,
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{output, shop, MUG, TEA};
    use secrecy::SecretString;
    use storefront_client::testing::product;

    async fn sign_in(shop: &Storefront) {
        assert!(
            shop.session
                .login("ada@example.com", &SecretString::from("pw".to_string()))
                .await
        );
    }

    #[tokio::test]
    async fn test_signed_out_checkout_asks_for_login() {
        let (api, shop) = shop().await;
        shop.cart.add_to_cart(&product(MUG, "Mug", 1000)).unwrap();
        let mut out = Vec::new();

        let err = checkout(&shop, &mut out).await.unwrap_err();

        assert!(matches!(err, CliError::SignInRequired));
        assert!(api.order_requests().is_empty());
        assert_eq!(shop.cart.item_count(), 1);
    }

    #[tokio::test]
    async fn test_checkout_places_order_and_lists_history() {
        let (api, shop) = shop().await;
        sign_in(&shop).await;
        shop.cart.add_to_cart(&product(MUG, "Mug", 1000)).unwrap();
        shop.cart.add_to_cart(&product(TEA, "Tea", 450)).unwrap();
        let mut out = Vec::new();

        checkout(&shop, &mut out).await.unwrap();

        let text = output(out);
        assert!(text.starts_with("Order placed successfully!\n"));
        assert!(text.contains("$14.50"));
        assert_eq!(api.order_requests().len(), 1);
        assert!(shop.cart.is_empty());
    }

    #[tokio::test]
    async fn test_failed_checkout_reports_notice() {
        let (api, shop) = shop().await;
        sign_in(&shop).await;
        shop.cart.add_to_cart(&product(MUG, "Mug", 1000)).unwrap();
        api.fail_orders_with(503);
        let mut out = Vec::new();

        let err = checkout(&shop, &mut out).await.unwrap_err();

        assert!(err.to_string().starts_with("Checkout failed. Please try again."));
        assert_eq!(err.exit_code(), 1);
        assert_eq!(shop.cart.item_count(), 1);
    }
}
