pub mod health;
pub mod todo;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /todos                  list (GET), create (POST)
/// /todos/dashboard        daily dashboard (GET)
/// /todos/{id}             get, update (PUT), delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/todos", todo::router())
}
