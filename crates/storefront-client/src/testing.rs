//! # Test Doubles
//!
//! An in-memory [`StorefrontApi`] that behaves like a small backend and
//! records every request it receives.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  RecordingApi                                                           │
//! │                                                                         │
//! │  accounts  email → (password, token, profile)                           │
//! │  products  catalog served by list_products / get_product                │
//! │  orders    user id → orders created through create_order                │
//! │                                                                         │
//! │  calls()   every request in arrival order, with the bearer attached     │
//! │            at the time it was sent                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Available to this crate's tests and, with the `testing` feature, to
//! downstream test suites.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use storefront_core::money::Money;
use storefront_core::types::{AccessToken, Order, OrderItem, OrderStatus, OrderSubmission, Product, UserProfile};
use tokio::sync::Notify;
use uuid::Uuid;

use crate::api::StorefrontApi;
use crate::error::{ClientError, ClientResult};

/// A request seen by [`RecordingApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    ObtainToken { email: String },
    CreateUser { email: String },
    CurrentUser { bearer: Option<String> },
    CreateOrder { bearer: Option<String>, submission: OrderSubmission },
    ListUserOrders { bearer: Option<String>, user_id: Uuid },
    ListProducts { skip: u32, limit: u32 },
    GetProduct { id: Uuid },
}

/// Profile with a deterministic id.
pub fn user_profile(n: u128, email: &str) -> UserProfile {
    UserProfile {
        id: Uuid::from_u128(n),
        email: email.to_string(),
        is_active: true,
        is_admin: false,
    }
}

/// Product with a deterministic id.
pub fn product(n: u128, name: &str, price_cents: i64) -> Product {
    Product {
        id: Uuid::from_u128(n),
        name: name.to_string(),
        description: None,
        price: Money::from_cents(price_cents),
        image_url: None,
    }
}

struct Account {
    email: String,
    password: String,
    token: String,
    user: UserProfile,
}

#[derive(Default)]
struct Backend {
    bearer: Option<String>,
    calls: Vec<ApiCall>,
    accounts: Vec<Account>,
    registered: HashSet<String>,
    products: Vec<Product>,
    orders: HashMap<Uuid, Vec<Order>>,
    order_failure: Option<u16>,
    offline: bool,
}

impl Backend {
    fn user_for_bearer(&self, bearer: Option<&str>) -> ClientResult<UserProfile> {
        bearer
            .and_then(|token| self.accounts.iter().find(|a| a.token == token))
            .map(|a| a.user.clone())
            .ok_or_else(|| ClientError::Unauthorized("Could not validate credentials".to_string()))
    }

    fn check_online(&self) -> ClientResult<()> {
        if self.offline {
            return Err(ClientError::Transport("connection refused".to_string()));
        }
        Ok(())
    }
}

/// Scriptable in-memory backend.
#[derive(Default)]
pub struct RecordingApi {
    backend: Mutex<Backend>,
    held_identity: Mutex<Option<Arc<Notify>>>,
    held_order: Mutex<Option<Arc<Notify>>>,
}

impl RecordingApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an account that can log in and whose token resolves to `user`.
    pub fn with_account(self, email: &str, password: &str, token: &str, user: UserProfile) -> Self {
        {
            let mut backend = self.backend();
            backend.registered.insert(email.to_string());
            backend.accounts.push(Account {
                email: email.to_string(),
                password: password.to_string(),
                token: token.to_string(),
                user,
            });
        }
        self
    }

    pub fn with_products(self, products: Vec<Product>) -> Self {
        self.backend().products = products;
        self
    }

    /// Seeds order history for a user.
    pub fn with_orders(self, user_id: Uuid, orders: Vec<Order>) -> Self {
        self.backend().orders.insert(user_id, orders);
        self
    }

    /// Makes every later `create_order` fail with `status`.
    pub fn fail_orders_with(&self, status: u16) {
        self.backend().order_failure = Some(status);
    }

    /// Makes every later request fail as if the server were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.backend().offline = offline;
    }

    /// Holds the next `current_user` response until the returned handle is
    /// notified.
    pub fn hold_next_identity(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.held_identity.lock().unwrap_or_else(PoisonError::into_inner) = Some(gate.clone());
        gate
    }

    /// Holds the next `create_order` response until the returned handle is
    /// notified.
    pub fn hold_next_order(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.held_order.lock().unwrap_or_else(PoisonError::into_inner) = Some(gate.clone());
        gate
    }

    /// Yields until a `create_order` request has arrived.
    pub async fn wait_for_order_request(&self) {
        while self.order_requests().is_empty() {
            tokio::task::yield_now().await;
        }
    }

    /// Yields until a `current_user` request has arrived.
    pub async fn wait_for_identity_request(&self) {
        loop {
            let seen = self
                .backend()
                .calls
                .iter()
                .any(|c| matches!(c, ApiCall::CurrentUser { .. }));
            if seen {
                return;
            }
            tokio::task::yield_now().await;
        }
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.backend().calls.clone()
    }

    /// Bodies of every `create_order` request.
    pub fn order_requests(&self) -> Vec<OrderSubmission> {
        self.backend()
            .calls
            .iter()
            .filter_map(|c| match c {
                ApiCall::CreateOrder { submission, .. } => Some(submission.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn current_bearer(&self) -> Option<String> {
        self.backend().bearer.clone()
    }

    fn backend(&self) -> MutexGuard<'_, Backend> {
        self.backend.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl StorefrontApi for RecordingApi {
    fn set_bearer(&self, token: Option<&str>) {
        self.backend().bearer = token.map(str::to_string);
    }

    fn has_bearer(&self) -> bool {
        self.backend().bearer.is_some()
    }

    async fn obtain_token(&self, email: &str, password: &SecretString) -> ClientResult<AccessToken> {
        let mut backend = self.backend();
        backend.calls.push(ApiCall::ObtainToken {
            email: email.to_string(),
        });
        backend.check_online()?;

        backend
            .accounts
            .iter()
            .find(|a| a.email == email && a.password == password.expose_secret())
            .map(|a| AccessToken {
                access_token: a.token.clone(),
                token_type: Some("bearer".to_string()),
            })
            .ok_or_else(|| ClientError::Unauthorized("Incorrect username or password".to_string()))
    }

    async fn create_user(&self, email: &str, _password: &SecretString) -> ClientResult<UserProfile> {
        let mut backend = self.backend();
        backend.calls.push(ApiCall::CreateUser {
            email: email.to_string(),
        });
        backend.check_online()?;

        if !backend.registered.insert(email.to_string()) {
            return Err(ClientError::Status {
                status: 400,
                detail: "Email already registered".to_string(),
            });
        }

        Ok(UserProfile {
            id: Uuid::new_v4(),
            email: email.to_string(),
            is_active: true,
            is_admin: false,
        })
    }

    async fn current_user(&self) -> ClientResult<UserProfile> {
        let bearer = {
            let mut backend = self.backend();
            let bearer = backend.bearer.clone();
            backend.calls.push(ApiCall::CurrentUser {
                bearer: bearer.clone(),
            });
            bearer
        };

        let gate = self
            .held_identity
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let backend = self.backend();
        backend.check_online()?;
        backend.user_for_bearer(bearer.as_deref())
    }

    async fn create_order(&self, submission: &OrderSubmission) -> ClientResult<Order> {
        let bearer = {
            let mut backend = self.backend();
            let bearer = backend.bearer.clone();
            backend.calls.push(ApiCall::CreateOrder {
                bearer: bearer.clone(),
                submission: submission.clone(),
            });
            bearer
        };

        let gate = self
            .held_order
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let mut backend = self.backend();
        backend.check_online()?;

        let user = backend.user_for_bearer(bearer.as_deref())?;
        if let Some(status) = backend.order_failure {
            return Err(ClientError::Status {
                status,
                detail: "Order could not be created".to_string(),
            });
        }

        let order_id = Uuid::new_v4();
        let items = submission
            .items
            .iter()
            .map(|line| OrderItem {
                id: Uuid::new_v4(),
                order_id,
                product_id: line.product_id,
                quantity: line.quantity,
                price_at_purchase: backend
                    .products
                    .iter()
                    .find(|p| p.id == line.product_id)
                    .map(|p| p.price)
                    .unwrap_or_else(Money::zero),
            })
            .collect();

        let order = Order {
            id: order_id,
            user_id: user.id,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
            items,
        };
        backend.orders.entry(user.id).or_default().push(order.clone());
        Ok(order)
    }

    async fn list_user_orders(&self, user_id: Uuid) -> ClientResult<Vec<Order>> {
        let mut backend = self.backend();
        let bearer = backend.bearer.clone();
        backend.calls.push(ApiCall::ListUserOrders {
            bearer: bearer.clone(),
            user_id,
        });
        backend.check_online()?;

        backend.user_for_bearer(bearer.as_deref())?;
        Ok(backend.orders.get(&user_id).cloned().unwrap_or_default())
    }

    async fn list_products(&self, skip: u32, limit: u32) -> ClientResult<Vec<Product>> {
        let mut backend = self.backend();
        backend.calls.push(ApiCall::ListProducts { skip, limit });
        backend.check_online()?;

        Ok(backend
            .products
            .iter()
            .skip(skip as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn get_product(&self, id: Uuid) -> ClientResult<Product> {
        let mut backend = self.backend();
        backend.calls.push(ApiCall::GetProduct { id });
        backend.check_online()?;

        backend
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| ClientError::Status {
                status: 404,
                detail: "Product not found".to_string(),
            })
    }
}
