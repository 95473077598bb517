//! # storefront-client: Session, Cart and Checkout for the Storefront
//!
//! This crate owns every side effect of the storefront client: the REST
//! calls, durable storage of the token and cart, and the state managers the
//! presentation layer drives.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Storefront Client Services                         │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                 Storefront (wiring, startup order)               │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │ SessionManager │  │  CartManager   │  │ CheckoutOrchestrator   │    │
//! │  │                │  │                │  │                        │    │
//! │  │ token + user   │  │ lines, total   │  │ reads both managers,   │    │
//! │  │ login/logout   │  │ persisted on   │  │ POST /orders/, clears  │    │
//! │  │ /users/me      │  │ every mutation │  │ cart on success        │    │
//! │  └───────┬────────┘  └───────┬────────┘  └───────────┬────────────┘    │
//! │          │                   │                       │                  │
//! │          ▼                   ▼                       ▼                  │
//! │  ┌────────────────────────────────┐  ┌───────────────────────────────┐ │
//! │  │  KeyValueStore                 │  │  StorefrontApi                │ │
//! │  │  FileStore / MemoryStore       │  │  HttpApi (reqwest)            │ │
//! │  │  "token" → string              │  │  bearer attached implicitly   │ │
//! │  │  "cart"  → JSON array          │  │                               │ │
//! │  └────────────────────────────────┘  └───────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`api`] - `StorefrontApi` port and the `HttpApi` adapter
//! - [`storage`] - Key/value persistence
//! - [`session`] - Session Manager
//! - [`cart`] - Cart Manager
//! - [`checkout`] - Checkout Orchestrator
//! - [`catalog`] / [`orders`] - Product listing and order history
//! - [`config`] - Client configuration (file + env)
//! - [`error`] - Client error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storefront_client::{ClientConfig, Storefront};
//!
//! let config = ClientConfig::load_or_default(None);
//! let shop = Storefront::open(&config, false).await?;
//!
//! let products = shop.catalog.list(0, 20).await?;
//! shop.cart.add_to_cart(&products[0])?;
//!
//! let outcome = shop.checkout.checkout().await;
//! if let Some(notice) = outcome.notice() {
//!     println!("{notice}");
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod api;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod orders;
pub mod session;
pub mod storage;
pub mod storefront;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use api::{HttpApi, StorefrontApi};
pub use cart::CartManager;
pub use catalog::Catalog;
pub use checkout::{CheckoutOrchestrator, CheckoutOutcome, Route};
pub use config::{ApiSettings, ClientConfig, StorageSettings};
pub use error::{ClientError, ClientResult};
pub use orders::{OrderHistory, OrderHistoryView};
pub use session::{RegisterOutcome, Session, SessionManager};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use storefront::Storefront;
