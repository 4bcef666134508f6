//! Guest cart flow through the full router: session persistence, quantity
//! round trips, stock guard, totals.

use axum::http::{Method, StatusCode};
use serde_json::json;

use farmferry_integration_tests::{api, next_cookie, spawn_app};

#[tokio::test]
async fn test_add_then_reload_restores_cart_from_session() {
    let app = spawn_app().await;

    let response = api(
        &app,
        Method::POST,
        "/api/cart/items",
        None,
        Some(json!({ "productId": "p1", "quantity": 2 })),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    let cookie = response.cookie.clone().expect("session cookie set");

    // A later request in the same session sees the same cart
    let response = api(&app, Method::GET, "/api/cart", Some(&cookie), None).await;
    assert_eq!(response.status, StatusCode::OK);
    let data = response.data();
    assert_eq!(data["items"].as_array().expect("items").len(), 1);
    assert_eq!(data["items"][0]["productId"], "p1");
    assert_eq!(data["items"][0]["quantity"], 2);
}

#[tokio::test]
async fn test_totals_for_checkout_scenario() {
    let app = spawn_app().await;

    // One product at ₹100 x 2
    let response = api(
        &app,
        Method::POST,
        "/api/cart/items",
        None,
        Some(json!({ "productId": "p1", "quantity": 2 })),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);

    let totals = &response.data()["totals"];
    assert_eq!(totals["subtotal"], "200");
    assert_eq!(totals["deliveryCharge"], "20");
    assert_eq!(totals["platformFee"], "2");
    assert_eq!(totals["gst"], "0");
    assert_eq!(totals["grandTotal"], "222");
    assert_eq!(totals["isFreeDelivery"], false);
    assert_eq!(response.data()["grandTotal"], "\u{20b9}222.00");
}

#[tokio::test]
async fn test_free_delivery_at_threshold() {
    let app = spawn_app().await;

    // ₹100 x 5 = ₹500, at the free-delivery threshold
    let response = api(
        &app,
        Method::POST,
        "/api/cart/items",
        None,
        Some(json!({ "productId": "p1", "quantity": 5 })),
    )
    .await;

    let totals = &response.data()["totals"];
    assert_eq!(totals["subtotal"], "500");
    assert_eq!(totals["isFreeDelivery"], true);
    assert_eq!(totals["deliveryCharge"], "0");
    assert_eq!(totals["grandTotal"], "502");
}

#[tokio::test]
async fn test_increase_decrease_round_trip_and_removal() {
    let app = spawn_app().await;

    let response = api(
        &app,
        Method::POST,
        "/api/cart/items",
        None,
        Some(json!({ "productId": "p1", "quantity": 1 })),
    )
    .await;
    let mut cookie = response.cookie.clone().expect("cookie");

    let response = api(
        &app,
        Method::POST,
        "/api/cart/items/p1/increase",
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(response.data()["items"][0]["quantity"], 2);
    cookie = next_cookie(&response, Some(cookie)).expect("cookie");

    let response = api(
        &app,
        Method::POST,
        "/api/cart/items/p1/decrease",
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(response.data()["items"][0]["quantity"], 1);
    cookie = next_cookie(&response, Some(cookie)).expect("cookie");

    // Decreasing a one-unit line removes it
    let response = api(
        &app,
        Method::POST,
        "/api/cart/items/p1/decrease",
        Some(&cookie),
        None,
    )
    .await;
    assert!(
        response.data()["items"]
            .as_array()
            .expect("items")
            .is_empty()
    );
}

#[tokio::test]
async fn test_out_of_stock_product_is_refused() {
    let app = spawn_app().await;

    let response = api(
        &app,
        Method::POST,
        "/api/cart/items",
        None,
        Some(json!({ "productId": "oos-okra", "quantity": 1 })),
    )
    .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.body["message"], "product oos-okra is out of stock");

    // Nothing was added
    let cookie = response.cookie.clone();
    let response = api(&app, Method::GET, "/api/cart", cookie.as_deref(), None).await;
    assert!(
        response.data()["items"]
            .as_array()
            .expect("items")
            .is_empty()
    );
}

#[tokio::test]
async fn test_remove_unknown_line_is_a_noop() {
    let app = spawn_app().await;

    // Guest delete of a line that was never added: idempotent, empty cart
    let response = api(&app, Method::DELETE, "/api/cart/items/ghost", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(
        response.data()["items"]
            .as_array()
            .expect("items")
            .is_empty()
    );
}
