//! End-to-end tests: the HTTP client and cache against a live server
//! backed by the in-memory store.

use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::NaiveDate;
use dayplan_api::config::ServerConfig;
use dayplan_api::router::build_app_router;
use dayplan_api::state::AppState;
use dayplan_client::{ClientError, HttpTodoApi, QueryKey, TodoApi, TodoClient};
use dayplan_core::todo::{CreateTodo, UpdateTodo};
use dayplan_db::store::MemoryTodoStore;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Serve the full router on a random local port and return its API base URL.
async fn spawn_server() -> String {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        database_url: None,
    };
    let state = AppState {
        store: Arc::new(MemoryTodoStore::new()),
        config: Arc::new(config.clone()),
    };
    let app = build_app_router(state, &config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}/api")
}

fn march_first() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

fn new_todo(title: &str, date: Option<&str>) -> CreateTodo {
    CreateTodo {
        title: title.to_string(),
        date: date.map(str::to_string),
        ..CreateTodo::default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn completing_the_only_task_reaches_full_progress() {
    let client = TodoClient::new(HttpTodoApi::new(spawn_server().await), 10);

    let before = client.fetch_dashboard(march_first()).await.unwrap();
    assert_eq!(before.pending_tasks, 0);

    let todo = client.create(new_todo("Pay rent", Some("2024-03-01"))).await.unwrap();
    let dashboard = client.fetch_dashboard(march_first()).await.unwrap();
    assert_eq!(dashboard.pending_tasks, 1);
    assert_eq!(dashboard.todos_for_today[0].id, todo.id);

    let updated = client.set_completed(todo.id, true).await.unwrap();
    assert!(updated.is_completed);

    let cached = client
        .cache()
        .get(&QueryKey::Dashboard { date: march_first() })
        .await
        .unwrap();
    let dashboard = cached.as_dashboard().unwrap();
    assert_eq!(dashboard.completed_tasks, 1);
    assert_eq!(dashboard.pending_tasks, 0);
    assert_eq!(dashboard.progress_percent, 100.0);
}

#[tokio::test]
async fn search_pages_concatenate_to_full_result() {
    let api_url = spawn_server().await;
    let client = TodoClient::new(HttpTodoApi::new(api_url.clone()), 2);
    for title in ["Rent car", "Pay rent", "Gym", "Rent flat", "Call landlord"] {
        client.create(new_todo(title, None)).await.unwrap();
    }

    let key = QueryKey::search("rent");
    client.fetch_search("rent").await.unwrap();
    while client.fetch_next_page(&key).await.unwrap() {}
    let paged: Vec<_> = client.cache().get(&key).await.unwrap().todos().cloned().collect();

    let full = HttpTodoApi::new(api_url).list(Some("rent"), None, 100).await.unwrap();
    assert_eq!(paged, full.data);
    assert_eq!(paged.len(), 3);
}

#[tokio::test]
async fn server_rejection_rolls_back_and_resyncs() {
    let api_url = spawn_server().await;
    let client = TodoClient::new(HttpTodoApi::new(api_url.clone()), 10);
    let todo = client.create(new_todo("Pay rent", Some("2024-03-01"))).await.unwrap();
    client.fetch_todos().await.unwrap();
    client.fetch_dashboard(march_first()).await.unwrap();

    // Another session deletes the todo behind this client's back.
    HttpTodoApi::new(api_url).delete(todo.id).await.unwrap();

    let result = client.set_completed(todo.id, true).await;
    assert_matches!(result, Err(ClientError::Api { status: 404, .. }));

    // The settle refetch brings the cache in line with the server.
    assert!(client.cache().get(&QueryKey::Todos).await.unwrap().todos().next().is_none());
    let dashboard = client.fetch_dashboard(march_first()).await.unwrap();
    assert_eq!(dashboard.pending_tasks, 0);
}

#[tokio::test]
async fn http_errors_carry_the_envelope_message() {
    let api = HttpTodoApi::new(spawn_server().await);

    let err = api.get(uuid::Uuid::now_v7()).await.unwrap_err();
    assert_matches!(err, ClientError::Api { status: 404, ref message } if message == "Todo not found");

    let err = api
        .update(uuid::Uuid::now_v7(), &UpdateTodo::completion(true))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));

    let err = api.create(&new_todo("", None)).await.unwrap_err();
    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn dashboard_without_date_uses_server_today() {
    let api = HttpTodoApi::new(spawn_server().await);
    let dashboard = api.dashboard(None).await.unwrap();

    assert!(dashboard.todos_for_today.is_empty());
    assert_eq!(dashboard.progress_percent, 0.0);
}
