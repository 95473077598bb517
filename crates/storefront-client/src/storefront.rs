//! # Storefront
//!
//! Wires the managers together in startup order.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Startup Sequence                                   │
//! │                                                                         │
//! │  1. Store     FileStore(data_dir)  or  MemoryStore (ephemeral)          │
//! │  2. Api       HttpApi(base_url, timeout)                                │
//! │  3. Session   token restored ──► initialize() resolves identity         │
//! │  4. Cart      hydrated from storage, independent of the session         │
//! │  5. Views     CheckoutOrchestrator, Catalog, OrderHistory               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tracing::info;

use crate::api::{HttpApi, StorefrontApi};
use crate::cart::CartManager;
use crate::catalog::Catalog;
use crate::checkout::CheckoutOrchestrator;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::orders::OrderHistory;
use crate::session::SessionManager;
use crate::storage::{FileStore, KeyValueStore, MemoryStore};

/// Every service of the client, sharing one API and one store.
pub struct Storefront {
    pub session: Arc<SessionManager>,
    pub cart: Arc<CartManager>,
    pub checkout: CheckoutOrchestrator,
    pub catalog: Catalog,
    pub orders: OrderHistory,
}

impl Storefront {
    /// Builds the client from configuration and resolves the session.
    ///
    /// `ephemeral` keeps the token and cart in memory only.
    pub async fn open(config: &ClientConfig, ephemeral: bool) -> ClientResult<Self> {
        let store: Arc<dyn KeyValueStore> = if ephemeral {
            Arc::new(MemoryStore::new())
        } else {
            let dir = config
                .data_dir()
                .ok_or_else(|| ClientError::Storage("no data directory available".into()))?;
            info!(dir = %dir.display(), "Using file storage");
            Arc::new(FileStore::new(dir))
        };

        let api: Arc<dyn StorefrontApi> = Arc::new(HttpApi::new(&config.api)?);
        Ok(Self::assemble(api, store, config).await)
    }

    /// Builds the client over an existing API and store.
    pub async fn assemble(api: Arc<dyn StorefrontApi>, store: Arc<dyn KeyValueStore>, config: &ClientConfig) -> Self {
        let session = Arc::new(SessionManager::new(
            api.clone(),
            store.clone(),
            config.storage.token_key.clone(),
        ));
        session.initialize().await;

        let cart = Arc::new(CartManager::hydrate(store, config.storage.cart_key.clone()));

        Storefront {
            checkout: CheckoutOrchestrator::new(api.clone(), session.clone(), cart.clone()),
            catalog: Catalog::new(api.clone()),
            orders: OrderHistory::new(api),
            session,
            cart,
        }
    }
}
