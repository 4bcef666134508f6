//! The transparent proxy fallback: unmatched `/api` paths are forwarded to
//! the backend and the response relayed.

use axum::http::{Method, StatusCode};

use farmferry_integration_tests::{api, spawn_app};

#[tokio::test]
async fn test_unmatched_api_path_is_forwarded() {
    let app = spawn_app().await;

    // The storefront has no /api/banners handler; the fake backend does
    let response = api(&app, Method::GET, "/api/banners", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.data()["banners"][0], "monsoon-sale");
}

#[tokio::test]
async fn test_upstream_status_is_relayed() {
    let app = spawn_app().await;

    // The fake backend has no such route either: its 404 comes straight back
    let response = api(&app, Method::GET, "/api/nope/never", None, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_catalog_routes_read_through_the_client() {
    let app = spawn_app().await;

    let response = api(&app, Method::GET, "/api/categories", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    let categories = response.data().as_array().expect("categories");
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0]["name"], "Vegetables");

    let response = api(&app, Method::GET, "/api/products/p9", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["id"], "p9");
    assert_eq!(response.data()["name"], "product p9");
}
