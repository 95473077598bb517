//! # Commands Module
//!
//! One function per `shop` command. Each takes the opened [`Storefront`]
//! (except the `config` commands, which run before it is opened)
//! and writes its human-readable result to `out`.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (exports, shared helpers)
//! ├── catalog.rs  ◄─── Product listing and detail
//! ├── cart.rs     ◄─── Cart manipulation
//! ├── auth.rs     ◄─── Session commands
//! ├── checkout.rs ◄─── Order placement
//! ├── orders.rs   ◄─── Order history
//! └── config.rs   ◄─── Config file (runs without a Storefront)
//! ```
//!
//! [`Storefront`]: storefront_client::Storefront

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod orders;

use uuid::Uuid;

use crate::error::CliError;

/// Parses a product id given on the command line.
pub(crate) fn parse_id(raw: &str) -> Result<Uuid, CliError> {
    raw.trim()
        .parse::<Uuid>()
        .map_err(|_| CliError::InvalidId(raw.to_string()))
}
