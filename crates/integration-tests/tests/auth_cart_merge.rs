//! Login flow: guest-cart merge into the backend cart, authenticated cart
//! operations, logout.

use axum::http::{Method, StatusCode};
use serde_json::json;

use farmferry_integration_tests::{api, next_cookie, spawn_app};

#[tokio::test]
async fn test_login_merges_guest_cart_into_backend_cart() {
    let app = spawn_app().await;

    // Guest puts ₹100 x 2 of p1 in the session cart
    let response = api(
        &app,
        Method::POST,
        "/api/cart/items",
        None,
        Some(json!({ "productId": "p1", "quantity": 2 })),
    )
    .await;
    let cookie = response.cookie.clone().expect("cookie");

    // Login: the guest cart must survive the transition
    let response = api(
        &app,
        Method::POST,
        "/api/auth/login",
        Some(&cookie),
        Some(json!({ "email": "asha@example.com", "password": "pw-123456" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["firstName"], "Asha");
    let cookie = next_cookie(&response, Some(cookie)).expect("cookie");

    // The authenticated cart is served by the backend and holds the line
    let response = api(&app, Method::GET, "/api/cart", Some(&cookie), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["items"][0]["productId"], "p1");
    assert_eq!(response.data()["items"][0]["quantity"], 2);

    // Authenticated increase accumulates on the backend
    let response = api(
        &app,
        Method::POST,
        "/api/cart/items/p1/increase",
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(response.data()["items"][0]["quantity"], 3);

    // Logout flushes auth; the session cart is empty because it merged away
    let response = api(&app, Method::POST, "/api/auth/logout", Some(&cookie), None).await;
    assert_eq!(response.status, StatusCode::OK);

    let response = api(&app, Method::GET, "/api/cart", Some(&cookie), None).await;
    assert!(
        response.data()["items"]
            .as_array()
            .expect("items")
            .is_empty()
    );
}

#[tokio::test]
async fn test_login_rejection_surfaces_backend_status_and_message() {
    let app = spawn_app().await;

    let response = api(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "asha@example.com", "password": "wrong" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.body["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_protected_routes_require_auth() {
    let app = spawn_app().await;

    let response = api(&app, Method::GET, "/api/auth/me", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = api(&app, Method::GET, "/api/orders/my-orders", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = api(&app, Method::GET, "/api/customers/addresses", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_returns_session_customer() {
    let app = spawn_app().await;

    let response = api(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "asha@example.com", "password": "pw-123456" })),
    )
    .await;
    let cookie = response.cookie.clone().expect("cookie");

    let response = api(&app, Method::GET, "/api/auth/me", Some(&cookie), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["id"], "cust-1");
    assert_eq!(response.data()["firstName"], "Asha");
}
