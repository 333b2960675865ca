#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::Router;
use dayplan_db::store::MemoryTodoStore;
use http_body_util::BodyExt;
use tower::ServiceExt;

use dayplan_api::config::ServerConfig;
use dayplan_api::router::build_app_router;
use dayplan_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        database_url: None,
    }
}

/// Build the full application router over the given store.
///
/// Uses the same builder as `main.rs`, so tests exercise the production
/// middleware stack.
pub fn build_test_app(store: Arc<MemoryTodoStore>) -> Router {
    let config = test_config();
    let state = AppState {
        store,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

/// A fresh app over an empty in-memory store.
pub fn empty_app() -> (Router, Arc<MemoryTodoStore>) {
    let store = Arc::new(MemoryTodoStore::new());
    (build_test_app(Arc::clone(&store)), store)
}

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

fn json_request(method: Method, uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn delete(app: Router, uri: &str) -> Response {
    send(app, Request::delete(uri).body(Body::empty()).unwrap()).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, json_request(Method::POST, uri, &body)).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, json_request(Method::PUT, uri, &body)).await
}

/// Send a raw (possibly malformed) JSON body.
pub async fn post_raw(app: Router, uri: &str, body: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create a todo through the API and return its `data` object.
pub async fn create_todo(app: Router, body: serde_json::Value) -> serde_json::Value {
    let response = post_json(app, "/api/todos", body).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"].clone()
}
