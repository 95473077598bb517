//! # Catalog
//!
//! Read-only product browsing.

use std::sync::Arc;

use storefront_core::types::Product;
use storefront_core::validation::validate_page;
use tracing::debug;
use uuid::Uuid;

use crate::api::StorefrontApi;
use crate::error::ClientResult;

/// Product listing and lookup.
pub struct Catalog {
    api: Arc<dyn StorefrontApi>,
}

impl Catalog {
    pub fn new(api: Arc<dyn StorefrontApi>) -> Self {
        Catalog { api }
    }

    /// One page of products. `limit` must be within `1..=MAX_PAGE_LIMIT`.
    pub async fn list(&self, skip: u32, limit: u32) -> ClientResult<Vec<Product>> {
        validate_page(skip, limit)?;
        let products = self.api.list_products(skip, limit).await?;
        debug!(skip, limit, count = products.len(), "Products listed");
        Ok(products)
    }

    pub async fn get(&self, id: Uuid) -> ClientResult<Product> {
        self.api.get_product(id).await
    }
}
