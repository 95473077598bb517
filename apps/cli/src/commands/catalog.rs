//! # Catalog Commands
//!
//! `shop products` and `shop product <ID>`.

use std::io::Write;

use storefront_client::Storefront;
use tracing::debug;

use super::parse_id;
use crate::error::CliError;

/// Lists one page of products.
pub async fn list(shop: &Storefront, skip: u32, limit: u32, out: &mut dyn Write) -> Result<(), CliError> {
    let products = shop.catalog.list(skip, limit).await?;
    debug!(count = products.len(), "products command");

    if products.is_empty() {
        writeln!(out, "No products found.")?;
        return Ok(());
    }

    for product in &products {
        writeln!(out, "{}  {:<32} {:>10}", product.id, product.name, product.price.to_string())?;
    }
    Ok(())
}

/// Shows a product's details.
pub async fn show(shop: &Storefront, id: &str, out: &mut dyn Write) -> Result<(), CliError> {
    let product = shop.catalog.get(parse_id(id)?).await?;

    writeln!(out, "{}", product.name)?;
    writeln!(out, "  Price: {}", product.price)?;
    if let Some(description) = &product.description {
        writeln!(out, "  {}", description)?;
    }
    if let Some(image_url) = &product.image_url {
        writeln!(out, "  Image: {}", image_url)?;
    }
    writeln!(out, "  Id:    {}", product.id)?;
    Ok(())
}
