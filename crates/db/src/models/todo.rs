//! Row mapping for the `todos` table.

use dayplan_core::todo::Todo;
use dayplan_core::types::{Timestamp, TodoId};
use sqlx::FromRow;

/// A row from the `todos` table.
#[derive(Debug, Clone, FromRow)]
pub struct TodoRow {
    pub id: TodoId,
    pub title: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub date: Option<Timestamp>,
    pub description: Option<String>,
    pub is_completed: bool,
    pub created_at: Timestamp,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Todo {
            id: row.id,
            title: row.title,
            start_time: row.start_time,
            end_time: row.end_time,
            date: row.date,
            description: row.description,
            is_completed: row.is_completed,
            created_at: row.created_at,
        }
    }
}
