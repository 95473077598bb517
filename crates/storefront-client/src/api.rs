//! # Storefront REST API
//!
//! The port every manager talks through, and its `reqwest` adapter.
//!
//! ## Endpoints
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      REST Contract                                      │
//! │                                                                         │
//! │  obtain_token      POST /token              form: username, password   │
//! │  create_user       POST /users/             json: {email, password}    │
//! │  current_user      GET  /users/me           bearer                     │
//! │  create_order      POST /orders/            bearer, json: {items:[..]} │
//! │  list_user_orders  GET  /users/{id}/orders  bearer                     │
//! │  list_products     GET  /products/?skip&limit                          │
//! │  get_product       GET  /products/{id}                                 │
//! │                                                                         │
//! │  Authorization: Bearer <token> is attached to EVERY request once       │
//! │  set_bearer(Some(..)) has been called. No call takes a user id for     │
//! │  authorization purposes: the token identifies the caller.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Error Mapping
//! | Response              | Error                                   |
//! |-----------------------|-----------------------------------------|
//! | 401 / 403             | `ClientError::Unauthorized(detail)`     |
//! | other non-2xx         | `ClientError::Status { status, detail }`|
//! | body shape mismatch   | `ClientError::Decode`                   |
//! | no response / timeout | `ClientError::Transport` / `Timeout`    |
//!
//! `detail` comes from the backend's `{"detail": ...}` error body when
//! present, otherwise from the raw body text.

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use storefront_core::types::{AccessToken, Order, OrderSubmission, Product, UserProfile};
use tracing::{debug, instrument};
use url::Url;
use uuid::Uuid;

use crate::config::ApiSettings;
use crate::error::{ClientError, ClientResult};

// =============================================================================
// Port
// =============================================================================

/// Everything the client asks of the backend.
///
/// Object-safe so managers can share one `Arc<dyn StorefrontApi>`.
#[async_trait]
pub trait StorefrontApi: Send + Sync {
    /// Sets or clears the bearer token attached to every later request.
    fn set_bearer(&self, token: Option<&str>);

    /// Whether a bearer token is currently attached.
    fn has_bearer(&self) -> bool;

    /// Exchanges credentials for an access token.
    async fn obtain_token(&self, email: &str, password: &SecretString) -> ClientResult<AccessToken>;

    /// Creates an account. Does not authenticate.
    async fn create_user(&self, email: &str, password: &SecretString) -> ClientResult<UserProfile>;

    /// Identity behind the attached bearer token.
    async fn current_user(&self) -> ClientResult<UserProfile>;

    /// Places an order for the bearer's identity.
    async fn create_order(&self, submission: &OrderSubmission) -> ClientResult<Order>;

    async fn list_user_orders(&self, user_id: Uuid) -> ClientResult<Vec<Order>>;

    async fn list_products(&self, skip: u32, limit: u32) -> ClientResult<Vec<Product>>;

    async fn get_product(&self, id: Uuid) -> ClientResult<Product>;
}

// =============================================================================
// HTTP Adapter
// =============================================================================

/// `reqwest`-backed implementation of [`StorefrontApi`].
pub struct HttpApi {
    client: Client,
    base: Url,
    bearer: RwLock<Option<SecretString>>,
}

impl std::fmt::Debug for HttpApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpApi")
            .field("base", &self.base.as_str())
            .field("bearer", &self.has_bearer().then_some("[REDACTED]"))
            .finish_non_exhaustive()
    }
}

/// JSON body of `POST /users/`.
#[derive(Serialize)]
struct NewUser<'a> {
    email: &'a str,
    password: &'a str,
}

impl HttpApi {
    /// Builds a client for `settings.base_url` with the configured timeout.
    pub fn new(settings: &ApiSettings) -> ClientResult<Self> {
        let mut base = Url::parse(&settings.base_url)?;
        // Relative joins must append to the base path, not replace its last segment.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = Client::builder().timeout(settings.timeout()).build()?;

        debug!(base = %base, timeout_secs = settings.timeout_secs, "HTTP API client created");

        Ok(HttpApi {
            client,
            base,
            bearer: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        Ok(self.base.join(path)?)
    }

    /// Attaches the current bearer token, if any.
    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let bearer = self.bearer.read().unwrap_or_else(PoisonError::into_inner);
        match bearer.as_ref() {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> ClientResult<T> {
        let response = self.authorized(self.client.get(url)).send().await?;
        decode(response).await
    }
}

#[async_trait]
impl StorefrontApi for HttpApi {
    fn set_bearer(&self, token: Option<&str>) {
        let mut bearer = self.bearer.write().unwrap_or_else(PoisonError::into_inner);
        *bearer = token.map(|t| SecretString::from(t.to_string()));
    }

    fn has_bearer(&self) -> bool {
        self.bearer.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    #[instrument(skip(self, password))]
    async fn obtain_token(&self, email: &str, password: &SecretString) -> ClientResult<AccessToken> {
        let url = self.endpoint("token")?;
        let form = [("username", email), ("password", password.expose_secret())];

        let response = self.client.post(url).form(&form).send().await?;
        let token: AccessToken = decode(response).await?;

        debug!(token_type = ?token.token_type, "Access token obtained");
        Ok(token)
    }

    #[instrument(skip(self, password))]
    async fn create_user(&self, email: &str, password: &SecretString) -> ClientResult<UserProfile> {
        let url = self.endpoint("users/")?;
        let body = NewUser {
            email,
            password: password.expose_secret(),
        };

        let response = self.authorized(self.client.post(url)).json(&body).send().await?;
        decode(response).await
    }

    #[instrument(skip(self))]
    async fn current_user(&self) -> ClientResult<UserProfile> {
        let url = self.endpoint("users/me")?;
        self.get_json(url).await
    }

    #[instrument(skip(self, submission), fields(lines = submission.items.len()))]
    async fn create_order(&self, submission: &OrderSubmission) -> ClientResult<Order> {
        let url = self.endpoint("orders/")?;
        let response = self
            .authorized(self.client.post(url))
            .json(submission)
            .send()
            .await?;
        decode(response).await
    }

    #[instrument(skip(self))]
    async fn list_user_orders(&self, user_id: Uuid) -> ClientResult<Vec<Order>> {
        let url = self.endpoint(&format!("users/{}/orders", user_id))?;
        self.get_json(url).await
    }

    #[instrument(skip(self))]
    async fn list_products(&self, skip: u32, limit: u32) -> ClientResult<Vec<Product>> {
        let mut url = self.endpoint("products/")?;
        url.query_pairs_mut()
            .append_pair("skip", &skip.to_string())
            .append_pair("limit", &limit.to_string());
        self.get_json(url).await
    }

    #[instrument(skip(self))]
    async fn get_product(&self, id: Uuid) -> ClientResult<Product> {
        let url = self.endpoint(&format!("products/{}", id))?;
        self.get_json(url).await
    }
}

// =============================================================================
// Response Handling
// =============================================================================

/// Decodes a 2xx body, or converts the error response.
async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let body = response.text().await.unwrap_or_default();
    Err(error_from_status(status, &body))
}

/// Maps a non-success response onto [`ClientError`].
fn error_from_status(status: StatusCode, body: &str) -> ClientError {
    let detail = extract_detail(body).unwrap_or_else(|| {
        if body.trim().is_empty() {
            status.canonical_reason().unwrap_or("no details").to_string()
        } else {
            body.trim().to_string()
        }
    });

    debug!(status = status.as_u16(), detail = %detail, "Request rejected");

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ClientError::Unauthorized(detail),
        _ => ClientError::Status {
            status: status.as_u16(),
            detail,
        },
    }
}

/// Pulls `detail` out of a `{"detail": ...}` error body.
///
/// Field validation errors arrive as an array of objects with a `msg`;
/// those messages are joined.
fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(entries) => {
            let messages: Vec<&str> = entries
                .iter()
                .filter_map(|e| e.get("msg").and_then(|m| m.as_str()))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_at(base_url: &str) -> HttpApi {
        HttpApi::new(&ApiSettings {
            base_url: base_url.to_string(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_join_keeps_base_path() {
        let api = api_at("https://shop.example.com/api");
        assert_eq!(
            api.endpoint("users/me").unwrap().as_str(),
            "https://shop.example.com/api/users/me"
        );

        let api = api_at("http://localhost:8000");
        assert_eq!(api.endpoint("token").unwrap().as_str(), "http://localhost:8000/token");
    }

    #[test]
    fn test_bearer_set_and_clear() {
        let api = api_at("http://localhost:8000");
        assert!(!api.has_bearer());

        api.set_bearer(Some("abc"));
        assert!(api.has_bearer());
        assert!(!format!("{:?}", api).contains("abc"));

        api.set_bearer(None);
        assert!(!api.has_bearer());
    }

    #[test]
    fn test_unauthorized_mapping() {
        let err = error_from_status(
            StatusCode::UNAUTHORIZED,
            r#"{"detail": "Incorrect username or password"}"#,
        );
        assert!(err.is_auth_error());
        assert_eq!(err.to_string(), "Not authorized: Incorrect username or password");
    }

    #[test]
    fn test_status_mapping_uses_detail_or_body() {
        match error_from_status(StatusCode::BAD_REQUEST, r#"{"detail": "Email already registered"}"#) {
            ClientError::Status { status, detail } => {
                assert_eq!(status, 400);
                assert_eq!(detail, "Email already registered");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        match error_from_status(StatusCode::BAD_GATEWAY, "upstream down") {
            ClientError::Status { detail, .. } => assert_eq!(detail, "upstream down"),
            other => panic!("unexpected error: {other:?}"),
        }

        match error_from_status(StatusCode::INTERNAL_SERVER_ERROR, "") {
            ClientError::Status { detail, .. } => assert_eq!(detail, "Internal Server Error"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validation_detail_array() {
        let body = r#"{"detail": [
            {"loc": ["body", "email"], "msg": "field required", "type": "value_error.missing"},
            {"loc": ["body", "password"], "msg": "field required", "type": "value_error.missing"}
        ]}"#;
        assert_eq!(
            extract_detail(body).as_deref(),
            Some("field required; field required")
        );
    }
}
