//! # Cart Manager
//!
//! Wraps the pure [`Cart`] with durable persistence.
//!
//! ## Thread Safety
//! The cart sits behind a `Mutex`. Each mutation applies the change and
//! writes the whole cart while still holding the lock, so storage always
//! sees writes in the order the mutations happened.
//!
//! ## Persistence Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Manager Operations                              │
//! │                                                                         │
//! │  hydrate() ───────────► store.get(key) ──► Cart::from_persisted         │
//! │                          absent / corrupt ──► empty cart (warn)         │
//! │                                                                         │
//! │  add_to_cart() ───┐                                                     │
//! │  remove_from_cart()│                                                    │
//! │  update_quantity()├──► mutate ──► store.set(key, JSON array)            │
//! │  clear_cart() ────┤    (rejected or no-op mutations write nothing)      │
//! │  settle_submission()┘                                                   │
//! │                                                                         │
//! │  total() ─────────────► recomputed from the lines on every call         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use storefront_core::cart::{Cart, CartLine};
use storefront_core::money::Money;
use storefront_core::types::{OrderSubmission, Product};
use storefront_core::ValidationError;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::storage::KeyValueStore;

/// The persisted shopping cart.
pub struct CartManager {
    cart: Mutex<Cart>,
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl CartManager {
    /// Restores the cart saved under `key`.
    ///
    /// A missing, unreadable or corrupt payload yields an empty cart.
    pub fn hydrate(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let key = key.into();

        let cart = match store.get(&key) {
            Ok(Some(raw)) => Cart::from_persisted(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Stored cart is corrupt, starting empty");
                Cart::new()
            }),
            Ok(None) => Cart::new(),
            Err(e) => {
                warn!(error = %e, "Could not read stored cart, starting empty");
                Cart::new()
            }
        };

        debug!(lines = cart.line_count(), "Cart hydrated");

        CartManager {
            cart: Mutex::new(cart),
            store,
            key,
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds one unit of `product`, merging into an existing line.
    ///
    /// Refused once the line holds [`MAX_ITEM_QUANTITY`] units; the cart
    /// and storage stay untouched.
    ///
    /// [`MAX_ITEM_QUANTITY`]: storefront_core::MAX_ITEM_QUANTITY
    pub fn add_to_cart(&self, product: &Product) -> Result<(), ValidationError> {
        let mut cart = self.lock();
        cart.add_product(product)?;
        debug!(product_id = %product.id, "Added to cart");
        self.persist(&cart);
        Ok(())
    }

    /// Removes a product's line. Returns `false` if it was not in the cart.
    pub fn remove_from_cart(&self, product_id: Uuid) -> bool {
        let mut cart = self.lock();
        let removed = cart.remove(product_id);
        if removed {
            debug!(%product_id, "Removed from cart");
            self.persist(&cart);
        }
        removed
    }

    /// Replaces a line's quantity.
    ///
    /// Quantities outside `1..=MAX_ITEM_QUANTITY` are rejected and leave the
    /// cart and storage untouched. Returns `Ok(false)` if the product is not in the cart.
    pub fn update_quantity(&self, product_id: Uuid, quantity: i64) -> Result<bool, ValidationError> {
        let mut cart = self.lock();
        let updated = cart.update_quantity(product_id, quantity)?;
        if updated {
            debug!(%product_id, quantity, "Quantity updated");
            self.persist(&cart);
        }
        Ok(updated)
    }

    /// Empties the cart and persists the empty state.
    pub fn clear_cart(&self) {
        let mut cart = self.lock();
        cart.clear();
        debug!("Cart cleared");
        self.persist(&cart);
    }

    /// Removes the lines of an order the backend accepted.
    ///
    /// See [`Cart::remove_submitted`]: lines added after `submission` was
    /// built are kept.
    pub fn settle_submission(&self, submission: &OrderSubmission) {
        let mut cart = self.lock();
        cart.remove_submitted(submission);
        debug!(remaining = cart.line_count(), "Placed lines removed from cart");
        self.persist(&cart);
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Σ price × quantity, computed from the current lines.
    pub fn total(&self) -> Money {
        self.lock().total()
    }

    pub fn lines(&self) -> Vec<CartLine> {
        self.lock().lines().to_vec()
    }

    pub fn item_count(&self) -> i64 {
        self.lock().item_count()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Runs `f` with read access to the cart.
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.lock();
        f(&cart)
    }

    fn lock(&self) -> MutexGuard<'_, Cart> {
        self.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Writes the whole cart. Failures are logged; memory stays authoritative.
    fn persist(&self, cart: &Cart) {
        let written = cart
            .to_persisted()
            .map_err(crate::error::ClientError::from)
            .and_then(|raw| self.store.set(&self.key, &raw));

        if let Err(e) = written {
            warn!(error = %e, "Could not persist cart");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStore, MemoryStore};
    use crate::testing::product;
    use storefront_core::MAX_ITEM_QUANTITY;

    const KEY: &str = "cart";

    fn fresh() -> (Arc<MemoryStore>, CartManager) {
        let store = Arc::new(MemoryStore::new());
        let manager = CartManager::hydrate(store.clone(), KEY);
        (store, manager)
    }

    #[test]
    fn test_add_twice_yields_single_line() {
        let (_, cart) = fresh();
        let mug = product(1, "Mug", 1000);

        cart.add_to_cart(&mug).unwrap();
        cart.add_to_cart(&mug).unwrap();

        let lines = cart.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 2);
    }

    #[test]
    fn test_total_recomputed_on_read() {
        let (_, cart) = fresh();
        let ten = product(1, "Ten", 1000);
        let five = product(2, "Five", 500);

        cart.add_to_cart(&ten).unwrap();
        cart.add_to_cart(&ten).unwrap();
        cart.add_to_cart(&five).unwrap();
        assert_eq!(cart.total(), Money::from_cents(2500));

        cart.remove_from_cart(ten.id);
        assert_eq!(cart.total(), Money::from_cents(500));
    }

    #[test]
    fn test_invalid_quantity_leaves_cart_and_storage_untouched() {
        let (store, cart) = fresh();
        let mug = product(1, "Mug", 1000);
        cart.add_to_cart(&mug).unwrap();
        let persisted = store.get(KEY).unwrap();

        assert!(cart.update_quantity(mug.id, 0).is_err());
        assert!(cart.update_quantity(mug.id, -2).is_err());

        assert_eq!(cart.lines()[0].quantity, 1);
        assert_eq!(store.get(KEY).unwrap(), persisted);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let (_, cart) = fresh();
        cart.add_to_cart(&product(1, "Mug", 1000)).unwrap();

        assert!(!cart.remove_from_cart(Uuid::from_u128(42)));
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_every_mutation_is_persisted() {
        let (store, cart) = fresh();
        let mug = product(1, "Mug", 1000);

        cart.add_to_cart(&mug).unwrap();
        cart.update_quantity(mug.id, 3).unwrap();

        let rehydrated = CartManager::hydrate(store.clone(), KEY);
        assert_eq!(rehydrated.lines(), cart.lines());
        assert_eq!(rehydrated.item_count(), 3);
    }

    #[test]
    fn test_clear_persists_empty_cart() {
        let (store, cart) = fresh();
        cart.add_to_cart(&product(1, "Mug", 1000)).unwrap();

        cart.clear_cart();

        assert_eq!(store.get(KEY).unwrap().as_deref(), Some("[]"));
        assert!(CartManager::hydrate(store, KEY).is_empty());
    }

    #[test]
    fn test_corrupt_payload_hydrates_empty() {
        let store = Arc::new(MemoryStore::with_entries([(KEY, "{\"oops\": tru")]));
        let cart = CartManager::hydrate(store.clone(), KEY);
        assert!(cart.is_empty());

        // The next mutation overwrites the corrupt payload
        cart.add_to_cart(&product(1, "Mug", 1000)).unwrap();
        assert!(store.get(KEY).unwrap().unwrap().starts_with('['));
    }

    #[test]
    fn test_file_backed_cart_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let mug = product(1, "Mug", 1250);

        {
            let cart = CartManager::hydrate(Arc::new(FileStore::new(dir.path())), KEY);
            cart.add_to_cart(&mug).unwrap();
            cart.add_to_cart(&mug).unwrap();
        }

        let cart = CartManager::hydrate(Arc::new(FileStore::new(dir.path())), KEY);
        assert_eq!(cart.total(), Money::from_cents(2500));
        assert_eq!(cart.with_cart(|c| c.line(mug.id).map(|l| l.name.clone())), Some("Mug".to_string()));
    }

    #[test]
    fn test_quantity_cap_leaves_cart_and_storage_untouched() {
        let (store, cart) = fresh();
        let mug = product(1, "Mug", 1000);
        cart.add_to_cart(&mug).unwrap();

        assert!(cart.update_quantity(mug.id, i64::MAX / 100).is_err());
        assert_eq!(cart.total(), Money::from_cents(1000));

        cart.update_quantity(mug.id, MAX_ITEM_QUANTITY).unwrap();
        let persisted = store.get(KEY).unwrap();
        assert!(cart.add_to_cart(&mug).is_err());

        assert_eq!(cart.item_count(), MAX_ITEM_QUANTITY);
        assert_eq!(store.get(KEY).unwrap(), persisted);
    }

    #[test]
    fn test_hostile_payloads_hydrate_without_panic() {
        let id = Uuid::from_u128(1);
        let line = |quantity: i64| {
            format!(r#"{{"product_id": "{id}", "name": "Mug", "price": 1000, "quantity": {quantity}}}"#)
        };

        // (stored payload, expected item count)
        let cases = [
            (format!("[{}]", line(i64::MAX)), 0),
            (format!("[{},{}]", line(i64::MAX), line(i64::MAX)), 0),
            (format!("[{},{}]", line(MAX_ITEM_QUANTITY), line(MAX_ITEM_QUANTITY)), MAX_ITEM_QUANTITY),
            (format!("[{},{}]", line(-5), line(2)), 2),
            ("[1, 2, 3]".to_string(), 0),
        ];

        for (raw, expected) in cases {
            let store = Arc::new(MemoryStore::with_entries([(KEY, raw.as_str())]));
            let cart = CartManager::hydrate(store, KEY);

            assert_eq!(cart.item_count(), expected, "payload {raw}");
            assert_eq!(cart.total(), Money::from_cents(1000 * expected));
        }
    }

    #[test]
    fn test_settle_submission_persists_remaining_lines() {
        let (store, cart) = fresh();
        let mug = product(1, "Mug", 1000);
        let tea = product(2, "Tea", 450);
        cart.add_to_cart(&mug).unwrap();
        let submission = cart.with_cart(|c| c.to_submission());
        cart.add_to_cart(&tea).unwrap();

        cart.settle_submission(&submission);

        let rehydrated = CartManager::hydrate(store, KEY);
        assert_eq!(rehydrated.lines(), cart.lines());
        assert_eq!(rehydrated.total(), Money::from_cents(450));
    }
}
