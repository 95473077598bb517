//! Wire-contract tests for `HttpApi` against a stub backend on loopback.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use secrecy::SecretString;
use serde_json::{json, Value};
use storefront_client::{ApiSettings, ClientConfig, HttpApi, MemoryStore, StorefrontApi, Storefront};
use storefront_core::types::{OrderLine, OrderSubmission};
use uuid::Uuid;

const USER_ID: &str = "11111111-1111-1111-1111-111111111111";
const PRODUCT_ID: &str = "22222222-2222-2222-2222-222222222222";
const TOKEN: &str = "tok-abc";

#[derive(Default)]
struct Seen {
    token_content_type: Option<String>,
    token_form: HashMap<String, String>,
    authorization: HashMap<&'static str, Option<String>>,
    order_body: Option<Value>,
    product_query: HashMap<String, String>,
}

type Shared = Arc<Mutex<Seen>>;

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn authorized(headers: &HeaderMap) -> bool {
    bearer(headers).as_deref() == Some(&format!("Bearer {TOKEN}"))
}

fn unauthorized() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Could not validate credentials"})),
    )
}

async fn token(
    State(seen): State<Shared>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let ok = form.get("username").map(String::as_str) == Some("ada@example.com")
        && form.get("password").map(String::as_str) == Some("hunter2");
    {
        let mut seen = seen.lock().unwrap();
        seen.token_content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        seen.token_form = form;
    }
    if !ok {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Incorrect username or password"})),
        ));
    }
    Ok(Json(json!({"access_token": TOKEN, "token_type": "bearer"})))
}

async fn create_user(Json(body): Json<Value>) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if body["email"] == "taken@example.com" {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": "Email already registered"})),
        ));
    }
    Ok(Json(json!({
        "id": Uuid::new_v4(),
        "email": body["email"],
        "is_active": true,
        "is_admin": false
    })))
}

async fn me(State(seen): State<Shared>, headers: HeaderMap) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    seen.lock().unwrap().authorization.insert("me", bearer(&headers));
    if !authorized(&headers) {
        return Err(unauthorized());
    }
    Ok(Json(json!({
        "id": USER_ID,
        "email": "ada@example.com",
        "is_active": true,
        "is_admin": false
    })))
}

async fn create_order(
    State(seen): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    {
        let mut seen = seen.lock().unwrap();
        seen.authorization.insert("orders", bearer(&headers));
        seen.order_body = Some(body.clone());
    }
    if !authorized(&headers) {
        return Err(unauthorized());
    }
    let order_id = Uuid::new_v4();
    let items: Vec<Value> = body["items"]
        .as_array()
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .map(|line| {
            json!({
                "id": Uuid::new_v4(),
                "order_id": order_id,
                "product_id": line["product_id"],
                "quantity": line["quantity"],
                "price_at_purchase": 19.99
            })
        })
        .collect();
    Ok(Json(json!({
        "id": order_id,
        "user_id": USER_ID,
        "status": "pending",
        "created_at": "2024-05-01T10:30:00.000001",
        "items": items
    })))
}

async fn user_orders(
    Path(user_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if !authorized(&headers) {
        return Err(unauthorized());
    }
    Ok(Json(json!([{
        "id": Uuid::new_v4(),
        "user_id": user_id,
        "status": "completed",
        "created_at": "2024-04-01T08:00:00+00:00",
        "items": []
    }])))
}

async fn products(State(seen): State<Shared>, Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    seen.lock().unwrap().product_query = query;
    Json(json!([
        {"id": PRODUCT_ID, "name": "Desk Lamp", "description": "Warm light", "price": 24.99, "image_url": null}
    ]))
}

async fn product(Path(id): Path<String>) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if id != PRODUCT_ID {
        return Err((StatusCode::NOT_FOUND, Json(json!({"detail": "Product not found"}))));
    }
    Ok(Json(json!({"id": PRODUCT_ID, "name": "Desk Lamp", "price": 24.99})))
}

/// Starts the stub backend and returns its base URL.
async fn spawn_backend() -> (String, Shared) {
    let seen: Shared = Arc::default();
    let app = Router::new()
        .route("/token", post(token))
        .route("/users/", post(create_user))
        .route("/users/me", get(me))
        .route("/users/{id}/orders", get(user_orders))
        .route("/orders/", post(create_order))
        .route("/products/", get(products))
        .route("/products/{id}", get(product))
        .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), seen)
}

fn api_for(base_url: &str) -> HttpApi {
    HttpApi::new(&ApiSettings {
        base_url: base_url.to_string(),
        timeout_secs: 5,
    })
    .unwrap()
}

fn secret(s: &str) -> SecretString {
    SecretString::from(s.to_string())
}

#[tokio::test]
async fn login_is_form_encoded() {
    let (base, seen) = spawn_backend().await;
    let api = api_for(&base);

    let token = api.obtain_token("ada@example.com", &secret("hunter2")).await.unwrap();

    assert_eq!(token.access_token, TOKEN);
    let seen = seen.lock().unwrap();
    assert_eq!(
        seen.token_content_type.as_deref(),
        Some("application/x-www-form-urlencoded")
    );
    assert_eq!(seen.token_form.get("username").map(String::as_str), Some("ada@example.com"));
}

#[tokio::test]
async fn bad_credentials_are_unauthorized() {
    let (base, _) = spawn_backend().await;
    let api = api_for(&base);

    let err = api.obtain_token("ada@example.com", &secret("nope")).await.unwrap_err();

    assert!(err.is_auth_error());
    assert!(err.to_string().contains("Incorrect username or password"));
}

#[tokio::test]
async fn bearer_is_attached_to_identity_and_orders() {
    let (base, seen) = spawn_backend().await;
    let api = api_for(&base);

    assert!(api.current_user().await.unwrap_err().is_auth_error());

    api.set_bearer(Some(TOKEN));
    let user = api.current_user().await.unwrap();
    assert_eq!(user.id.to_string(), USER_ID);

    let submission = OrderSubmission {
        items: vec![OrderLine {
            product_id: PRODUCT_ID.parse().unwrap(),
            quantity: 2,
        }],
    };
    let order = api.create_order(&submission).await.unwrap();
    assert_eq!(order.total().cents(), 3998);

    let seen = seen.lock().unwrap();
    let expected = Some(format!("Bearer {TOKEN}"));
    assert_eq!(seen.authorization.get("me"), Some(&expected));
    assert_eq!(seen.authorization.get("orders"), Some(&expected));
    assert_eq!(
        seen.order_body,
        Some(json!({"items": [{"product_id": PRODUCT_ID, "quantity": 2}]}))
    );
}

#[tokio::test]
async fn products_are_paged_and_priced_in_cents() {
    let (base, seen) = spawn_backend().await;
    let api = api_for(&base);

    let products = api.list_products(20, 10).await.unwrap();

    assert_eq!(products.len(), 1);
    assert_eq!(products[0].price.cents(), 2499);
    let query = seen.lock().unwrap().product_query.clone();
    assert_eq!(query.get("skip").map(String::as_str), Some("20"));
    assert_eq!(query.get("limit").map(String::as_str), Some("10"));

    let missing = api.get_product(Uuid::nil()).await.unwrap_err();
    assert!(matches!(
        missing,
        storefront_client::ClientError::Status { status: 404, .. }
    ));
}

#[tokio::test]
async fn duplicate_registration_reports_detail() {
    let (base, _) = spawn_backend().await;
    let api = api_for(&base);

    assert!(api.create_user("new@example.com", &secret("pw")).await.is_ok());

    let err = api.create_user("taken@example.com", &secret("pw")).await.unwrap_err();
    assert_eq!(err.to_string(), "Server returned 400: Email already registered");
}

#[tokio::test]
async fn full_flow_login_checkout_history() {
    let (base, seen) = spawn_backend().await;
    let mut config = ClientConfig::default();
    config.api.base_url = base.clone();
    let api = Arc::new(api_for(&base));
    let store = Arc::new(MemoryStore::new());

    let shop = Storefront::assemble(api, store, &config).await;
    assert!(!shop.session.is_authenticated());

    let lamp = shop.catalog.get(PRODUCT_ID.parse().unwrap()).await.unwrap();
    shop.cart.add_to_cart(&lamp).unwrap();
    shop.cart.add_to_cart(&lamp).unwrap();

    assert_eq!(
        shop.checkout.checkout().await,
        storefront_client::CheckoutOutcome::RedirectToLogin
    );
    assert!(seen.lock().unwrap().order_body.is_none());

    assert!(shop.session.login("ada@example.com", &secret("hunter2")).await);
    assert!(shop.session.is_authenticated());

    let outcome = shop.checkout.checkout().await;
    assert!(outcome.is_placed());
    assert!(shop.cart.is_empty());

    let view = shop.orders.for_current_user(&shop.session).await.unwrap();
    assert!(matches!(view, storefront_client::OrderHistoryView::Orders(ref o) if o.len() == 1));
}
