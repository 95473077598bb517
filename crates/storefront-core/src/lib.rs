//! # storefront-core: Pure Domain Logic for the Storefront Client
//!
//! This crate holds the storefront's domain model as plain data and pure
//! functions. It never touches the network or the filesystem.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Storefront Client Architecture                     │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Presentation (apps/cli)                      │   │
//! │  │   products ──► cart add ──► login ──► checkout ──► orders       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 storefront-client (services)                    │   │
//! │  │   SessionManager   CartManager   CheckoutOrchestrator   HttpApi │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ storefront-core (THIS CRATE) ★                  │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │   Cart    │  │   email   │  │   │
//! │  │   │  Order    │  │  decimal  │  │ CartLine  │  │  quantity │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO STORAGE • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Wire types shared with the REST backend
//! - [`money`] - Integer cents with decimal conversion at the wire boundary
//! - [`cart`] - Cart lines, the single-line-per-product invariant, totals
//! - [`error`] - Domain error types
//! - [`validation`] - Checks applied before any request is sent
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::cart::Cart;
//! use storefront_core::money::Money;
//! use storefront_core::types::Product;
//! use uuid::Uuid;
//!
//! let mug = Product {
//!     id: Uuid::new_v4(),
//!     name: "Mug".to_string(),
//!     description: None,
//!     price: Money::from_cents(1000),
//!     image_url: None,
//! };
//!
//! let mut cart = Cart::new();
//! cart.add_product(&mug).unwrap();
//! cart.add_product(&mug).unwrap();
//!
//! assert_eq!(cart.line_count(), 1);
//! assert_eq!(cart.total().cents(), 2000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine};
pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Page size the backend uses when `limit` is omitted.
///
/// Product listings are requested in pages of at most this many items.
pub const DEFAULT_PAGE_LIMIT: u32 = 100;

/// Largest page the client will request.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Maximum quantity of a single product in the cart.
///
/// Keeps line totals far from `i64` overflow and catches a mistyped
/// quantity (1000 instead of 10) before it reaches checkout.
pub const MAX_ITEM_QUANTITY: i64 = 999;
