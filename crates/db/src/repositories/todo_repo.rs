//! Repository for the `todos` table.

use dayplan_core::dates::DayRange;
use dayplan_core::todo::{NewTodo, Todo, TodoPatch};
use dayplan_core::types::{Timestamp, TodoId};
use sqlx::PgPool;

use crate::models::todo::TodoRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, title, start_time, end_time, date, description, is_completed, created_at";

/// Shared ordering: newest first, id as tie-break.
const ORDER_BY: &str = "ORDER BY created_at DESC, id DESC";

/// Provides CRUD operations for todos.
pub struct TodoRepo;

impl TodoRepo {
    /// Insert a new todo, returning the created row.
    ///
    /// `created_at` is assigned by the database.
    pub async fn create(pool: &PgPool, id: TodoId, input: &NewTodo) -> Result<Todo, sqlx::Error> {
        let query = format!(
            "INSERT INTO todos (id, title, start_time, end_time, date, description, is_completed)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, TodoRow>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.start_time)
            .bind(&input.end_time)
            .bind(input.date)
            .bind(&input.description)
            .bind(input.is_completed)
            .fetch_one(pool)
            .await?;
        Ok(row.into())
    }

    /// Find a todo by id.
    pub async fn find_by_id(pool: &PgPool, id: TodoId) -> Result<Option<Todo>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM todos WHERE id = $1");
        let row = sqlx::query_as::<_, TodoRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Into::into))
    }

    /// List todos in listing order, optionally filtered and positioned
    /// strictly after `after`.
    ///
    /// `pattern` is an `ILIKE` pattern matched against title OR description.
    /// Callers pass `limit + 1` to detect whether another page exists.
    pub async fn list(
        pool: &PgPool,
        pattern: Option<&str>,
        after: Option<(Timestamp, TodoId)>,
        fetch: i64,
    ) -> Result<Vec<Todo>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM todos
             WHERE ($1::text IS NULL OR title ILIKE $1 OR description ILIKE $1)
               AND ($2::timestamptz IS NULL OR (created_at, id) < ($2, $3))
             {ORDER_BY}
             LIMIT $4"
        );
        let rows = sqlx::query_as::<_, TodoRow>(&query)
            .bind(pattern)
            .bind(after.map(|(created_at, _)| created_at))
            .bind(after.map(|(_, id)| id))
            .bind(fetch)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// List todos whose `date` falls inside the given day, newest first.
    pub async fn list_in_range(pool: &PgPool, range: &DayRange) -> Result<Vec<Todo>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM todos
             WHERE date >= $1 AND date < $2
             {ORDER_BY}"
        );
        let rows = sqlx::query_as::<_, TodoRow>(&query)
            .bind(range.start)
            .bind(range.end)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Update a todo. Only non-`None` fields in `patch` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: TodoId,
        patch: &TodoPatch,
    ) -> Result<Option<Todo>, sqlx::Error> {
        let query = format!(
            "UPDATE todos SET
                title = COALESCE($2, title),
                start_time = COALESCE($3, start_time),
                end_time = COALESCE($4, end_time),
                date = COALESCE($5, date),
                description = COALESCE($6, description),
                is_completed = COALESCE($7, is_completed)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, TodoRow>(&query)
            .bind(id)
            .bind(&patch.title)
            .bind(&patch.start_time)
            .bind(&patch.end_time)
            .bind(patch.date)
            .bind(&patch.description)
            .bind(patch.is_completed)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Into::into))
    }

    /// Delete a todo by id. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: TodoId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
