//! The storage seam between the HTTP layer and persistence.
//!
//! Handlers hold an `Arc<dyn TodoStore>` so the same router runs against
//! PostgreSQL in production and against [`MemoryTodoStore`] in tests or
//! when no database is configured.

mod memory;
mod postgres;

use async_trait::async_trait;
use dayplan_core::dates::DayRange;
use dayplan_core::search::Page;
use dayplan_core::todo::{NewTodo, Todo, TodoPatch};
use dayplan_core::types::TodoId;

pub use memory::MemoryTodoStore;
pub use postgres::PgTodoStore;

/// Errors from a [`TodoStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The underlying database failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A pagination cursor named a todo that does not exist.
    #[error("Unknown cursor: {0}")]
    UnknownCursor(TodoId),
}

/// Parameters for a paginated listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    /// Substring filter over title and description; `None` lists everything.
    pub query: Option<String>,
    /// Id of the last item on the previous page.
    pub cursor: Option<TodoId>,
    /// Page size, already clamped.
    pub limit: i64,
}

/// Persistence operations over the todo collection.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Verify the backing store is reachable.
    async fn health_check(&self) -> Result<(), StoreError>;

    /// Insert a todo; the store assigns the id and creation timestamp.
    async fn create(&self, input: &NewTodo) -> Result<Todo, StoreError>;

    async fn find(&self, id: TodoId) -> Result<Option<Todo>, StoreError>;

    /// One page in newest-first order, positioned strictly after the cursor.
    async fn list_page(&self, query: &ListQuery) -> Result<Page<Todo>, StoreError>;

    /// Todos dated inside `range`, newest first.
    async fn list_for_day(&self, range: &DayRange) -> Result<Vec<Todo>, StoreError>;

    /// Apply a partial update. `None` if the todo does not exist.
    async fn update(&self, id: TodoId, patch: &TodoPatch) -> Result<Option<Todo>, StoreError>;

    /// Remove a todo. `false` if it did not exist.
    async fn delete(&self, id: TodoId) -> Result<bool, StoreError>;
}
