//! # Checkout Orchestrator
//!
//! Turns the cart into an order for the signed-in user.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         checkout()                                      │
//! │                                                                         │
//! │  session.is_authenticated()? ── no ──► RedirectToLogin  (no request)    │
//! │          │ yes                                                          │
//! │          ▼                                                              │
//! │  cart empty? ────────────────── yes ─► EmptyCart        (no request)    │
//! │          │ no                                                           │
//! │          ▼                                                              │
//! │  cart.to_submission()  {items: [{product_id, quantity}]}                │
//! │          │                                                              │
//! │          ▼                                                              │
//! │  POST /orders/  (buyer = bearer token, never an explicit id)            │
//! │          │                                                              │
//! │     ┌────┴──────────┐                                                   │
//! │     │ ok            │ error                                             │
//! │     ▼               ▼                                                   │
//! │  drop placed     cart untouched                                         │
//! │  lines                                                                  │
//! │  Placed{order}   Failed{message}     (never retried)                    │
//! │  → Route::Orders                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use storefront_core::types::Order;
use tracing::{debug, info, instrument, warn};

use crate::api::StorefrontApi;
use crate::cart::CartManager;
use crate::session::SessionManager;

/// Notice shown after an order was accepted.
pub const ORDER_PLACED_NOTICE: &str = "Order placed successfully!";

/// Notice shown when the order request failed.
pub const CHECKOUT_FAILED_NOTICE: &str = "Checkout failed. Please try again.";

/// Where the presentation layer should go next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// The authentication entry point.
    Login,
    /// The order history view.
    Orders,
}

/// What a checkout attempt did.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
    /// No signed-in user. Nothing was sent.
    RedirectToLogin,
    /// Nothing to order. Nothing was sent.
    EmptyCart,
    /// The backend accepted the order and the cart was cleared.
    Placed { order: Order },
    /// The request failed. The cart is unchanged.
    Failed { message: String },
}

impl CheckoutOutcome {
    /// User-facing notification, if the outcome has one.
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            CheckoutOutcome::Placed { .. } => Some(ORDER_PLACED_NOTICE),
            CheckoutOutcome::Failed { .. } => Some(CHECKOUT_FAILED_NOTICE),
            CheckoutOutcome::RedirectToLogin | CheckoutOutcome::EmptyCart => None,
        }
    }

    /// Navigation that follows the outcome, if any.
    pub fn next_route(&self) -> Option<Route> {
        match self {
            CheckoutOutcome::RedirectToLogin => Some(Route::Login),
            CheckoutOutcome::Placed { .. } => Some(Route::Orders),
            CheckoutOutcome::EmptyCart | CheckoutOutcome::Failed { .. } => None,
        }
    }

    pub fn is_placed(&self) -> bool {
        matches!(self, CheckoutOutcome::Placed { .. })
    }
}

/// Reads the session and the cart; owns neither.
pub struct CheckoutOrchestrator {
    api: Arc<dyn StorefrontApi>,
    session: Arc<SessionManager>,
    cart: Arc<CartManager>,
}

impl CheckoutOrchestrator {
    pub fn new(api: Arc<dyn StorefrontApi>, session: Arc<SessionManager>, cart: Arc<CartManager>) -> Self {
        CheckoutOrchestrator { api, session, cart }
    }

    /// Submits the cart as an order. Never retries.
    ///
    /// On success the submitted lines leave the cart. Anything added while
    /// the request was in flight stays for the next checkout.
    #[instrument(skip(self))]
    pub async fn checkout(&self) -> CheckoutOutcome {
        if !self.session.is_authenticated() {
            debug!("Checkout without a session, redirecting to login");
            return CheckoutOutcome::RedirectToLogin;
        }

        let submission = self.cart.with_cart(|cart| cart.to_submission());
        if submission.items.is_empty() {
            debug!("Checkout with an empty cart");
            return CheckoutOutcome::EmptyCart;
        }

        match self.api.create_order(&submission).await {
            Ok(order) => {
                info!(
                    order_id = %order.id,
                    lines = submission.items.len(),
                    "Order placed"
                );
                self.cart.settle_submission(&submission);
                CheckoutOutcome::Placed { order }
            }
            Err(e) => {
                warn!(error = %e, "Checkout failed");
                CheckoutOutcome::Failed {
                    message: e.to_string(),
                }
            }
        }
    }
}
