//! HTTP route handlers for the storefront JSON API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness check
//! GET  /health/ready                    - Readiness check (pings the backend)
//!
//! # Catalog
//! GET  /api/products                    - Product listing (filter/search/page)
//! GET  /api/products/{id}               - Product detail
//! GET  /api/supplier/products           - Supplier product feed
//! GET  /api/categories                  - Category listing
//!
//! # Cart (guest via session, authenticated via backend)
//! GET    /api/cart                      - Cart contents + totals
//! DELETE /api/cart                      - Empty the cart
//! POST   /api/cart/items                - Add a product
//! POST   /api/cart/items/{id}/increase  - Bump quantity by one
//! POST   /api/cart/items/{id}/decrease  - Drop quantity by one (1 -> removed)
//! DELETE /api/cart/items/{id}           - Remove a line
//!
//! # Auth (pass-through to the backend, session bookkeeping here)
//! POST /api/auth/register               - Register
//! POST /api/auth/login                  - Login (merges guest cart)
//! POST /api/auth/send-otp               - Dispatch OTP
//! POST /api/auth/verify-otp             - Verify OTP (logs in, merges guest cart)
//! POST /api/auth/forgot-password        - Start password reset
//! POST /api/auth/reset-password         - Complete password reset
//! POST /api/auth/refresh                - Rotate tokens (failure logs out)
//! POST /api/auth/logout                 - Logout
//! GET  /api/auth/me                     - Current customer
//!
//! # Account (requires auth)
//! GET    /api/customers/addresses       - Address list
//! POST   /api/customers/addresses       - Create address
//! PUT    /api/customers/addresses/{id}  - Update address
//! DELETE /api/customers/addresses/{id}  - Delete address
//!
//! # Orders (requires auth)
//! POST /api/orders                      - Checkout (assembled from live cart)
//! GET  /api/orders/my-orders            - Order history
//! GET  /api/orders/{id}/status          - Order status
//!
//! # Contact & bootstrap
//! POST /api/contact                     - Contact form (sends two emails)
//! GET  /api/config                      - Publishable client configuration
//!
//! Anything else under /api falls through to the transparent backend proxy.
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod contact;
pub mod meta;
pub mod orders;
pub mod products;
pub mod proxy;

use axum::{
    Json, Router,
    routing::{delete, get, post},
};
use serde::Serialize;
use serde_json::json;

use crate::state::AppState;

/// Standard success envelope for API responses.
pub(crate) fn ok<T: Serialize>(data: T) -> Json<serde_json::Value> {
    Json(json!({ "success": true, "data": data }))
}

/// Success envelope carrying only a message (ack-style endpoints).
pub(crate) fn ok_message(message: impl Into<String>) -> Json<serde_json::Value> {
    Json(json!({ "success": true, "message": message.into() }))
}

/// Create the full storefront router.
pub fn routes() -> Router<AppState> {
    Router::new().nest("/api", api_routes())
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .route("/supplier/products", get(products::supplier_feed))
        .route("/categories", get(categories::index))
        .nest("/cart", cart_routes())
        .nest("/auth", auth_routes())
        .nest("/customers/addresses", address_routes())
        .nest("/orders", order_routes())
        .route("/contact", post(contact::submit))
        .route("/config", get(meta::client_config))
        // Everything else is forwarded verbatim to the backend
        .fallback(proxy::forward)
}

/// Create the cart routes router.
fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add))
        .route("/items/{product_id}", delete(cart::remove))
        .route("/items/{product_id}/increase", post(cart::increase))
        .route("/items/{product_id}/decrease", post(cart::decrease))
}

/// Create the auth routes router.
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/send-otp", post(auth::send_otp))
        .route("/verify-otp", post(auth::verify_otp))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password", post(auth::reset_password))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the address book routes router.
fn address_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::list).post(account::create))
        .route(
            "/{address_id}",
            axum::routing::put(account::update).delete(account::remove),
        )
}

/// Create the order routes router.
fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::checkout))
        .route("/my-orders", get(orders::my_orders))
        .route("/{order_id}/status", get(orders::status))
}
