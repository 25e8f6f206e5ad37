//! Public pages, health checks and response headers.

use axum::http::{StatusCode, header};

use merch_integration_tests::TestApp;
use merch_storefront::middleware::request_id::REQUEST_ID_HEADER;

#[tokio::test]
async fn test_public_pages_render() {
    let app = TestApp::new();

    for (path, heading) in [
        ("/", "Merch for every fan"),
        ("/products/", "Products"),
        ("/cart/", "Your cart"),
        ("/checkout/", "Checkout"),
        ("/thank/", "Thank you for your order!"),
        ("/signup/", "Sign up"),
        ("/login/", "Log in"),
    ] {
        let response = app.get(path).await;
        assert_eq!(response.status, StatusCode::OK, "{path}");
        assert!(response.body.contains(heading), "{path} lacks {heading:?}");
    }
}

#[tokio::test]
async fn test_anonymous_nav_offers_login() {
    let app = TestApp::new();

    let response = app.get("/").await;

    assert!(response.body.contains("href=\"/login/\""));
    assert!(!response.body.contains("action=\"/logout/\""));
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let app = TestApp::new();

    let response = app.get("/no-such-page/").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body, "Not found: /no-such-page/");
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::new();

    let health = app.get("/health").await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body, "ok");

    assert_eq!(app.get("/health/ready").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_security_headers_present() {
    let app = TestApp::new();

    let response = app.get("/").await;

    assert_eq!(response.headers[header::X_FRAME_OPTIONS], "DENY");
    assert_eq!(response.headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    assert!(response.headers.contains_key(header::CONTENT_SECURITY_POLICY));
    assert_eq!(response.headers[header::CACHE_CONTROL], "no-store, max-age=0");
}

#[tokio::test]
async fn test_request_id_assigned() {
    let app = TestApp::new();

    let first = app.get("/health").await;
    let second = app.get("/health").await;

    let first_id = first.headers.get(REQUEST_ID_HEADER);
    assert!(first_id.is_some());
    assert_ne!(first_id, second.headers.get(REQUEST_ID_HEADER));
}
