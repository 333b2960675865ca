//! Handler for the daily dashboard.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use dayplan_core::dashboard::Dashboard;
use dayplan_core::dates::resolve_day;

use crate::error::AppResult;
use crate::extract::ApiQuery;
use crate::query::DashboardParams;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/todos/dashboard?date=YYYY-MM-DD
///
/// Todos dated on the given calendar day (the server's local date when
/// omitted) plus completed/pending counters and progress. Undated todos
/// never appear.
pub async fn get(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<DashboardParams>,
) -> AppResult<impl IntoResponse> {
    let range = resolve_day(params.date.as_deref())?;
    let todos = state.store.list_for_day(&range).await?;
    let dashboard = Dashboard::from_todos(todos);

    tracing::debug!(
        date = %range.date(),
        completed = dashboard.completed_tasks,
        pending = dashboard.pending_tasks,
        "Dashboard computed",
    );

    Ok(Json(ApiResponse::ok(dashboard)))
}
