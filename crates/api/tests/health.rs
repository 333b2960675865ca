//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use common::{body_json, empty_app, get};
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Test: GET /health returns 200 with expected JSON fields
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_returns_ok_with_json() {
    let (app, _) = empty_app();
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["db_healthy"], true);
}

// ---------------------------------------------------------------------------
// Test: Health is served at the root, not under /api
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_is_not_nested_under_api() {
    let (app, _) = empty_app();
    let response = get(app, "/api/health").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: Unknown route returns 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_route_returns_404() {
    let (app, _) = empty_app();
    let response = get(app, "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: x-request-id header is present in response
// ---------------------------------------------------------------------------

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let (app, _) = empty_app();
    let response = get(app, "/health").await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("Response must contain an x-request-id header");

    let id_str = request_id.to_str().unwrap();
    assert_eq!(id_str.len(), 36, "x-request-id should be a UUID: {id_str}");
}

// ---------------------------------------------------------------------------
// Test: A caller-supplied request id is echoed back
// ---------------------------------------------------------------------------

#[tokio::test]
async fn caller_request_id_is_propagated() {
    let (app, _) = empty_app();
    let request = Request::get("/health")
        .header("x-request-id", "trace-me-123")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.headers()["x-request-id"], "trace-me-123");
}

// ---------------------------------------------------------------------------
// Test: CORS preflight allows the configured origin
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cors_preflight_allows_configured_origin() {
    let (app, _) = empty_app();
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/todos")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:3000"
    );
}
