//! Handlers for the `/todos` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use dayplan_core::error::CoreError;
use dayplan_core::search::{clamp_limit, normalize_query, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use dayplan_core::todo::{CreateTodo, UpdateTodo};
use dayplan_core::types::TodoId;
use dayplan_db::store::ListQuery;

use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::query::ListParams;
use crate::response::{ApiResponse, ListResponse};
use crate::state::AppState;

/// Parse a path id. Anything that is not a todo identity cannot name a
/// todo, so it is reported as not found.
fn parse_id(raw: &str) -> AppResult<TodoId> {
    raw.parse::<TodoId>()
        .map_err(|_| AppError::Core(CoreError::todo_not_found(raw)))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/todos?q=&cursor=&limit=
///
/// Newest-first page of todos, optionally filtered by a case-insensitive
/// substring of title or description.
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> AppResult<impl IntoResponse> {
    let cursor = params
        .cursor
        .as_deref()
        .filter(|c| !c.is_empty())
        .map(|c| {
            c.parse::<TodoId>()
                .map_err(|_| AppError::BadRequest("Invalid cursor".into()))
        })
        .transpose()?;

    let query = ListQuery {
        query: normalize_query(params.q.as_deref()),
        cursor,
        limit: clamp_limit(params.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT),
    };

    let page = state.store.list_page(&query).await?;

    tracing::debug!(
        query = ?query.query,
        returned = page.data.len(),
        has_more = page.has_more,
        "Todos listed",
    );

    Ok(Json(ListResponse::from(page)))
}

/// POST /api/todos
///
/// Create a todo. `date` is accepted as `YYYY-MM-DD` and stored as UTC
/// midnight of that day.
pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateTodo>,
) -> AppResult<impl IntoResponse> {
    let new = input.normalize()?;
    let todo = state.store.create(&new).await?;

    tracing::info!(todo_id = %todo.id, "Todo created");

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(todo))))
}

/// GET /api/todos/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    let todo = state
        .store
        .find(id)
        .await?
        .ok_or(AppError::Core(CoreError::todo_not_found(id)))?;
    Ok(Json(ApiResponse::ok(todo)))
}

/// PUT /api/todos/{id}
///
/// Partial update: only the fields present in the body change.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<UpdateTodo>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    let patch = input.normalize()?;
    let todo = state
        .store
        .update(id, &patch)
        .await?
        .ok_or(AppError::Core(CoreError::todo_not_found(id)))?;

    tracing::info!(todo_id = %todo.id, is_completed = todo.is_completed, "Todo updated");

    Ok(Json(ApiResponse::ok(todo)))
}

/// DELETE /api/todos/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    if !state.store.delete(id).await? {
        return Err(AppError::Core(CoreError::todo_not_found(id)));
    }

    tracing::info!(todo_id = %id, "Todo deleted");

    Ok(Json(ApiResponse::ok(serde_json::json!({}))))
}
