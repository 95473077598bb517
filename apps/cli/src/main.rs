//! # `shop` Entry Point
//!
//! The actual setup is in lib.rs so commands can be tested without the
//! binary.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    storefront_cli::run().await
}
