//! Route definitions for the `/todos` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::{dashboard, todo};
use crate::state::AppState;

/// Routes mounted at `/todos`.
///
/// ```text
/// GET    /             -> list
/// POST   /             -> create
/// GET    /dashboard    -> dashboard::get
/// GET    /{id}         -> get_by_id
/// PUT    /{id}         -> update
/// DELETE /{id}         -> delete
/// ```
///
/// The static `/dashboard` segment takes priority over `/{id}`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(todo::list).post(todo::create))
        .route("/dashboard", get(dashboard::get))
        .route(
            "/{id}",
            get(todo::get_by_id).put(todo::update).delete(todo::delete),
        )
}
