//! # Order History
//!
//! The signed-in user's past orders.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  for_current_user(session)                                              │
//! │                                                                         │
//! │   session.user() ── None ──► SignInRequired   (no request)              │
//! │         │ Some(user)                                                    │
//! │         ▼                                                               │
//! │   GET /users/{user.id}/orders ──► sort by created_at, newest first      │
//! │         │                                                               │
//! │         └──► Orders(vec)  or  Err(..) shown inline                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use storefront_core::types::Order;
use tracing::debug;

use crate::api::StorefrontApi;
use crate::error::ClientResult;
use crate::session::SessionManager;

/// What the order history view shows.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderHistoryView {
    SignInRequired,
    /// Newest first.
    Orders(Vec<Order>),
}

pub struct OrderHistory {
    api: Arc<dyn StorefrontApi>,
}

impl OrderHistory {
    pub fn new(api: Arc<dyn StorefrontApi>) -> Self {
        OrderHistory { api }
    }

    /// Loads the orders of the session's user.
    pub async fn for_current_user(&self, session: &SessionManager) -> ClientResult<OrderHistoryView> {
        let Some(user) = session.user() else {
            return Ok(OrderHistoryView::SignInRequired);
        };

        let mut orders = self.api.list_user_orders(user.id).await?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        debug!(user_id = %user.id, count = orders.len(), "Order history loaded");
        Ok(OrderHistoryView::Orders(orders))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::testing::{user_profile, RecordingApi};
    use chrono::{Duration, Utc};
    use secrecy::SecretString;
    use storefront_core::types::OrderStatus;
    use uuid::Uuid;

    fn order(n: u128, user_id: Uuid, age_days: i64) -> Order {
        Order {
            id: Uuid::from_u128(n),
            user_id,
            status: OrderStatus::Completed,
            created_at: Utc::now() - Duration::days(age_days),
            items: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_signed_out_needs_sign_in() {
        let api = Arc::new(RecordingApi::new());
        let session = SessionManager::new(api.clone(), Arc::new(MemoryStore::new()), "token");
        session.initialize().await;

        let view = OrderHistory::new(api.clone()).for_current_user(&session).await.unwrap();

        assert_eq!(view, OrderHistoryView::SignInRequired);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_orders_newest_first() {
        let ada = user_profile(1, "ada@example.com");
        let api = Arc::new(
            RecordingApi::new()
                .with_account("ada@example.com", "pw", "tok-ada", ada.clone())
                .with_orders(ada.id, vec![order(1, ada.id, 9), order(2, ada.id, 1), order(3, ada.id, 4)]),
        );
        let session = SessionManager::new(api.clone(), Arc::new(MemoryStore::new()), "token");
        session.initialize().await;
        session
            .login("ada@example.com", &SecretString::from("pw".to_string()))
            .await;

        let view = OrderHistory::new(api).for_current_user(&session).await.unwrap();

        match view {
            OrderHistoryView::Orders(orders) => {
                let ids: Vec<_> = orders.iter().map(|o| o.id.as_u128()).collect();
                assert_eq!(ids, vec![2, 3, 1]);
            }
            other => panic!("unexpected view: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transport_failure_is_returned() {
        let ada = user_profile(1, "ada@example.com");
        let api = Arc::new(RecordingApi::new().with_account("ada@example.com", "pw", "tok-ada", ada));
        let session = SessionManager::new(api.clone(), Arc::new(MemoryStore::new()), "token");
        session.initialize().await;
        session
            .login("ada@example.com", &SecretString::from("pw".to_string()))
            .await;
        api.set_offline(true);

        let err = OrderHistory::new(api).for_current_user(&session).await.unwrap_err();
        assert!(err.is_transport_error());
    }
}
