//! Integration test support for the FarmFerry storefront.
//!
//! Tests drive the real storefront router (sessions included) against a
//! scripted fake of the commerce backend, spawned on a loopback port per
//! test. No network beyond loopback, no live backend.
//!
//! ```rust,ignore
//! let app = spawn_app().await;
//! let response = api(&app, Method::GET, "/api/cart", None, None).await;
//! assert_eq!(response.status, StatusCode::OK);
//! ```

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::{Method, Request, StatusCode, header},
    routing::get,
};
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;

use farmferry_storefront::config::{BackendConfig, EmailConfig, StorefrontConfig};
use farmferry_storefront::middleware::create_session_layer;
use farmferry_storefront::routes;
use farmferry_storefront::state::AppState;

// =============================================================================
// Fake commerce backend
// =============================================================================

/// One line of the fake backend's cart.
#[derive(Clone)]
struct CartEntry {
    product_id: String,
    quantity: u32,
}

/// Shared state of the fake backend: a single customer cart.
#[derive(Clone, Default)]
struct FakeBackend {
    cart: Arc<Mutex<Vec<CartEntry>>>,
}

/// Fake product catalog: any id resolves; ids starting with `oos-` report
/// zero stock.
fn product_json(id: &str) -> Value {
    let stock = if id.starts_with("oos-") { 0 } else { 50 };
    json!({
        "id": id,
        "name": format!("product {id}"),
        "price": 100,
        "gstPercent": 0,
        "stockQuantity": stock,
    })
}

fn envelope(data: Value) -> Json<Value> {
    Json(json!({ "success": true, "data": data }))
}

fn cart_json(state: &FakeBackend) -> Value {
    let cart = state.cart.lock().expect("lock");
    let items: Vec<Value> = cart
        .iter()
        .map(|entry| {
            json!({
                "id": format!("line-{}", entry.product_id),
                "product": product_json(&entry.product_id),
                "quantity": entry.quantity,
            })
        })
        .collect();
    json!({ "items": items })
}

async fn fake_product(Path(id): Path<String>) -> Json<Value> {
    envelope(product_json(&id))
}

async fn fake_categories() -> Json<Value> {
    envelope(json!([
        { "id": "cat-1", "name": "Vegetables" },
        { "id": "cat-2", "name": "Dairy" },
    ]))
}

async fn fake_banners() -> Json<Value> {
    envelope(json!({ "banners": ["monsoon-sale"] }))
}

async fn fake_get_cart(State(state): State<FakeBackend>) -> Json<Value> {
    envelope(cart_json(&state))
}

async fn fake_add_cart_item(
    State(state): State<FakeBackend>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let product_id = body["productId"].as_str().unwrap_or_default().to_owned();
    let quantity = u32::try_from(body["quantity"].as_u64().unwrap_or(1)).unwrap_or(1);
    {
        let mut cart = state.cart.lock().expect("lock");
        match cart.iter_mut().find(|e| e.product_id == product_id) {
            Some(entry) => entry.quantity += quantity,
            None => cart.push(CartEntry {
                product_id,
                quantity,
            }),
        }
    }
    envelope(cart_json(&state))
}

async fn fake_update_cart_item(
    State(state): State<FakeBackend>,
    Path(product_id): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let quantity = u32::try_from(body["quantity"].as_u64().unwrap_or(0)).unwrap_or(0);
    {
        let mut cart = state.cart.lock().expect("lock");
        let Some(entry) = cart.iter_mut().find(|e| e.product_id == product_id) else {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "success": false, "message": "cart line not found" })),
            );
        };
        entry.quantity = quantity;
        cart.retain(|e| e.quantity > 0);
    }
    (StatusCode::OK, envelope(cart_json(&state)))
}

async fn fake_remove_cart_item(
    State(state): State<FakeBackend>,
    Path(product_id): Path<String>,
) -> (StatusCode, Json<Value>) {
    {
        let mut cart = state.cart.lock().expect("lock");
        let before = cart.len();
        cart.retain(|e| e.product_id != product_id);
        if cart.len() == before {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "success": false, "message": "cart line not found" })),
            );
        }
    }
    (StatusCode::OK, envelope(cart_json(&state)))
}

async fn fake_login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["password"].as_str() == Some("wrong") {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "message": "Invalid credentials" })),
        );
    }
    (
        StatusCode::OK,
        envelope(json!({
            "customer": { "id": "cust-1", "firstName": "Asha", "email": "asha@example.com" },
            "accessToken": "test-access-token",
            "refreshToken": "test-refresh-token",
        })),
    )
}

async fn fake_clear_cart(State(state): State<FakeBackend>) -> Json<Value> {
    state.cart.lock().expect("lock").clear();
    Json(json!({ "success": true, "message": "Cart cleared" }))
}

async fn fake_logout() -> Json<Value> {
    Json(json!({ "success": true, "message": "Logged out" }))
}

/// Spawn the fake backend on a loopback port and return its address.
async fn spawn_fake_backend() -> SocketAddr {
    let state = FakeBackend::default();

    let app = Router::new()
        .route("/api/v1/products/{id}", get(fake_product))
        .route("/api/v1/categories", get(fake_categories))
        .route("/api/v1/banners", get(fake_banners))
        .route("/api/v1/cart", get(fake_get_cart).delete(fake_clear_cart))
        .route("/api/v1/cart/items", axum::routing::post(fake_add_cart_item))
        .route(
            "/api/v1/cart/items/{product_id}",
            axum::routing::put(fake_update_cart_item).delete(fake_remove_cart_item),
        )
        .route("/api/v1/auth/login", axum::routing::post(fake_login))
        .route("/api/v1/auth/logout", axum::routing::post(fake_logout))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake backend");
    let addr = listener.local_addr().expect("fake backend addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake backend");
    });

    addr
}

// =============================================================================
// Storefront under test
// =============================================================================

fn test_config(backend_url: &str) -> StorefrontConfig {
    StorefrontConfig {
        host: "127.0.0.1".parse().expect("host"),
        port: 0,
        base_url: "http://localhost:3000".to_owned(),
        session_secret: SecretString::from("kP9#mW2$vR7!qT4&xZ8*cB5^nL1@jF6e"),
        backend: BackendConfig {
            api_url: backend_url.to_owned(),
            api_version: "v1".to_owned(),
        },
        email: EmailConfig {
            smtp_host: "smtp.gmail.com".to_owned(),
            smtp_port: 587,
            username: "noreply@farmferry.test".to_owned(),
            password: SecretString::from("test-smtp-pass"),
            from_address: "noreply@farmferry.test".to_owned(),
            contact_recipient: "support@farmferry.test".to_owned(),
        },
        google_maps_api_key: None,
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// Build the storefront router wired to a freshly spawned fake backend.
pub async fn spawn_app() -> Router {
    let backend_addr = spawn_fake_backend().await;
    let config = test_config(&format!("http://{backend_addr}"));

    let state = AppState::new(config).expect("app state");
    let session_layer = create_session_layer(state.config());

    Router::new()
        .merge(routes::routes())
        .layer(session_layer)
        .with_state(state)
}

// =============================================================================
// Request helpers
// =============================================================================

/// A decoded API response: status, session cookie (if set), JSON body.
pub struct ApiResponse {
    pub status: StatusCode,
    pub cookie: Option<String>,
    pub body: Value,
}

impl ApiResponse {
    /// The `data` payload of a success envelope.
    #[must_use]
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }
}

/// Fire one request at the app, optionally carrying a session cookie and a
/// JSON body. Returns the parsed response and any refreshed cookie.
pub async fn api(
    app: &Router,
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> ApiResponse {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).expect("body")))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let response = app.clone().oneshot(request).await.expect("response");

    let status = response.status();
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(ToOwned::to_owned);

    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body bytes")
        .to_bytes();
    let body: Value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    ApiResponse {
        status,
        cookie: set_cookie,
        body,
    }
}

/// Carry the session forward: prefer a newly set cookie, else keep the old.
#[must_use]
pub fn next_cookie(response: &ApiResponse, previous: Option<String>) -> Option<String> {
    response.cookie.clone().or(previous)
}
