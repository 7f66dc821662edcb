//! Integration test harness for Candleworks.
//!
//! Spins up an in-process mock of the backend REST surface (axum, ephemeral
//! port) and builds a storefront engine pointed at it. The mock records
//! every cart mutation in order and supports scripted failures so tests can
//! exercise the degradation paths.

#![allow(clippy::unwrap_used)]

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};

use candleworks_storefront::{Storefront, StorefrontConfig};

/// One recorded cart mutation: `(key, Some(value))` for an upsert,
/// `(key, None)` for a delete.
pub type CartWrite = (String, Option<String>);

/// Shared state of the mock backend.
#[derive(Default)]
pub struct BackendState {
    /// The `cart_data` hashmap.
    pub cart: Mutex<BTreeMap<String, String>>,
    /// Every cart mutation in arrival order.
    pub cart_writes: Mutex<Vec<CartWrite>>,
    /// Keys whose deletes fail with a 500 (the attempt is still recorded).
    pub failing_delete_keys: Mutex<HashSet<String>>,
    /// Artificial delay applied to cart upserts, to widen race windows.
    pub update_delay_ms: AtomicU64,
    /// Whether `GET /auth/me/` reports an existing session.
    pub authed: AtomicBool,
    /// Fail `POST /auth/logout/` with a 500.
    pub fail_logout: AtomicBool,
    /// Fail `POST /save-order/` with a 500.
    pub fail_save_order: AtomicBool,
    /// Fail `POST /paymentConfirmation/` with a 500.
    pub fail_arm_payment: AtomicBool,
    /// Orders accepted by `POST /save-order/`.
    pub orders: Mutex<Vec<Value>>,
    /// Payment-confirmation arms received.
    pub armed_payments: Mutex<Vec<Value>>,
    /// Number of confirmation polls received.
    pub payment_polls: AtomicUsize,
    /// Poll number (1-based) from which the confirmation reports success;
    /// 0 means never.
    pub payment_success_after: AtomicUsize,
    /// Serve a malformed cart entry value from `GET /cart/query/`.
    pub serve_malformed_cart: AtomicBool,
    /// Addresses returned by `GET /fetchaddress/`.
    pub addresses: Mutex<Vec<Value>>,
}

impl BackendState {
    /// Seed one cart entry with the standard record shape.
    pub fn seed_cart_entry(&self, name: &str, price: &str, quantity: u32, image: &str) {
        let value = json!({ "price": price, "quantity": quantity, "image": image }).to_string();
        self.cart.lock().unwrap().insert(name.to_string(), value);
    }

    /// Quantity currently stored for a cart key.
    pub fn stored_quantity(&self, name: &str) -> Option<u64> {
        let cart = self.cart.lock().unwrap();
        let raw = cart.get(name)?;
        let value: Value = serde_json::from_str(raw).ok()?;
        value.get("quantity")?.as_u64()
    }

    /// Recorded mutations for one key, in order.
    pub fn writes_for(&self, name: &str) -> Vec<CartWrite> {
        self.cart_writes
            .lock()
            .unwrap()
            .iter()
            .filter(|(key, _)| key == name)
            .cloned()
            .collect()
    }
}

type SharedState = Arc<BackendState>;

/// A running mock backend plus an engine wired to it.
pub struct TestContext {
    pub backend: SharedState,
    pub base_url: String,
    pub store: Storefront,
}

impl TestContext {
    /// Start the mock backend with default (long) timeouts.
    pub async fn start() -> Self {
        Self::start_with(|_| {}).await
    }

    /// Start the mock backend, letting the caller shorten timeouts before
    /// the engine is built.
    pub async fn start_with(configure: impl FnOnce(&mut StorefrontConfig)) -> Self {
        let backend: SharedState = Arc::new(BackendState::default());

        let app = router(backend.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let base_url = format!("http://{addr}/");
        let mut config = StorefrontConfig::for_base_url(&base_url).unwrap();
        configure(&mut config);
        let store = Storefront::new(config).unwrap();

        Self {
            backend,
            base_url,
            store,
        }
    }

    /// Mark the backend session valid and log the engine in.
    pub async fn login(&self) {
        self.backend.authed.store(true, Ordering::SeqCst);
        self.store.session().login("jnana", "hunter2!").await.unwrap();
    }
}

fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/token/", post(token))
        .route("/auth/me/", get(me))
        .route("/auth/logout/", post(logout))
        .route("/register/", post(accept))
        .route("/verify-otp/", post(accept))
        .route("/forgot-password/", post(accept))
        .route("/verify-otp-password-reset/", post(accept))
        .route("/reset-password/", post(accept))
        .route("/cart/query/", get(query_cart))
        .route("/cart/update/", post(update_cart))
        .route("/cart/delete/", post(delete_cart))
        .route("/fetchaddress/", get(fetch_addresses))
        .route(
            "/user-addresses/",
            put(update_address).post(add_address).delete(delete_address),
        )
        .route("/save-order/", post(save_order))
        .route("/paymentConfirmation/", post(arm_payment))
        .route("/paymentConfirmation", get(poll_payment))
        .route("/products/", get(products))
        .route("/reviews/", get(reviews))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct TokenRequest {
    username: String,
    #[allow(dead_code)]
    password: String,
}

async fn token(State(state): State<SharedState>, Json(body): Json<TokenRequest>) -> Response {
    if body.username == "wrong" {
        return (StatusCode::UNAUTHORIZED, Json(json!({"detail": "bad credentials"})))
            .into_response();
    }
    state.authed.store(true, Ordering::SeqCst);
    Json(json!({ "access": "test-access-token", "refresh": "test-refresh-token" })).into_response()
}

async fn me(State(state): State<SharedState>) -> StatusCode {
    if state.authed.load(Ordering::SeqCst) {
        StatusCode::OK
    } else {
        StatusCode::UNAUTHORIZED
    }
}

async fn logout(State(state): State<SharedState>) -> StatusCode {
    if state.fail_logout.load(Ordering::SeqCst) {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        state.authed.store(false, Ordering::SeqCst);
        StatusCode::OK
    }
}

async fn accept() -> StatusCode {
    StatusCode::OK
}

async fn query_cart(State(state): State<SharedState>) -> Json<Value> {
    if state.serve_malformed_cart.load(Ordering::SeqCst) {
        return Json(json!({ "data": { "Broken Candle": "not json at all" } }));
    }
    let cart = state.cart.lock().unwrap().clone();
    Json(json!({ "data": cart }))
}

#[derive(Debug, Deserialize)]
struct CartMutation {
    #[allow(dead_code)]
    hashmap: String,
    key: String,
    value: Option<String>,
}

async fn update_cart(State(state): State<SharedState>, Json(body): Json<CartMutation>) -> StatusCode {
    let delay = state.update_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
    let Some(value) = body.value else {
        return StatusCode::BAD_REQUEST;
    };
    state
        .cart_writes
        .lock()
        .unwrap()
        .push((body.key.clone(), Some(value.clone())));
    state.cart.lock().unwrap().insert(body.key, value);
    StatusCode::OK
}

async fn delete_cart(State(state): State<SharedState>, Json(body): Json<CartMutation>) -> StatusCode {
    state
        .cart_writes
        .lock()
        .unwrap()
        .push((body.key.clone(), None));
    if state
        .failing_delete_keys
        .lock()
        .unwrap()
        .contains(&body.key)
    {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    state.cart.lock().unwrap().remove(&body.key);
    StatusCode::OK
}

async fn fetch_addresses(State(state): State<SharedState>) -> Json<Value> {
    Json(Value::Array(state.addresses.lock().unwrap().clone()))
}

async fn add_address(Json(mut body): Json<Value>) -> Json<Value> {
    body["id"] = json!(1);
    Json(body)
}

async fn update_address(Json(body): Json<Value>) -> Json<Value> {
    Json(body)
}

async fn delete_address() -> StatusCode {
    StatusCode::OK
}

async fn save_order(State(state): State<SharedState>, Json(body): Json<Value>) -> StatusCode {
    if state.fail_save_order.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    state.orders.lock().unwrap().push(body);
    StatusCode::CREATED
}

async fn arm_payment(State(state): State<SharedState>, Json(body): Json<Value>) -> StatusCode {
    if state.fail_arm_payment.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    state.armed_payments.lock().unwrap().push(body);
    StatusCode::OK
}

async fn poll_payment(State(state): State<SharedState>) -> Json<Value> {
    let poll = state.payment_polls.fetch_add(1, Ordering::SeqCst) + 1;
    let success_after = state.payment_success_after.load(Ordering::SeqCst);
    let status = if success_after > 0 && poll >= success_after {
        "success"
    } else {
        "pending"
    };
    Json(json!({ "status": status }))
}

async fn products() -> Json<Value> {
    Json(json!([
        { "id": 1, "name": "Lavender Bliss", "price": "25", "image": "/images/i1.jpg" },
        { "id": 2, "name": "Vanilla Harmony", "price": "30", "image": "/images/i2.jpg" },
        { "id": 3, "name": "Midnight Oud", "price": "32", "image": "/images/i6.jpg" }
    ]))
}

async fn reviews() -> Json<Value> {
    Json(json!([
        { "product": "Lavender Bliss", "rating": 5, "comment": "Lovely scent", "author": "asha" }
    ]))
}
