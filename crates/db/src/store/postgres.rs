use async_trait::async_trait;
use dayplan_core::dates::DayRange;
use dayplan_core::search::{like_pattern, Page};
use dayplan_core::todo::{NewTodo, Todo, TodoPatch};
use dayplan_core::types::{new_todo_id, TodoId};

use super::{ListQuery, StoreError, TodoStore};
use crate::repositories::TodoRepo;
use crate::DbPool;

/// [`TodoStore`] backed by PostgreSQL via [`TodoRepo`].
#[derive(Clone)]
pub struct PgTodoStore {
    pool: DbPool,
}

impl PgTodoStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TodoStore for PgTodoStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }

    async fn create(&self, input: &NewTodo) -> Result<Todo, StoreError> {
        Ok(TodoRepo::create(&self.pool, new_todo_id(), input).await?)
    }

    async fn find(&self, id: TodoId) -> Result<Option<Todo>, StoreError> {
        Ok(TodoRepo::find_by_id(&self.pool, id).await?)
    }

    async fn list_page(&self, query: &ListQuery) -> Result<Page<Todo>, StoreError> {
        let after = match query.cursor {
            Some(cursor) => {
                let Some(anchor) = TodoRepo::find_by_id(&self.pool, cursor).await? else {
                    tracing::debug!(%cursor, "Pagination cursor does not name a todo");
                    return Err(StoreError::UnknownCursor(cursor));
                };
                Some((anchor.created_at, anchor.id))
            }
            None => None,
        };
        let pattern = query.query.as_deref().map(like_pattern);

        let rows = TodoRepo::list(&self.pool, pattern.as_deref(), after, query.limit + 1).await?;
        Ok(Page::from_overfetch(rows, query.limit, |t| t.id))
    }

    async fn list_for_day(&self, range: &DayRange) -> Result<Vec<Todo>, StoreError> {
        Ok(TodoRepo::list_in_range(&self.pool, range).await?)
    }

    async fn update(&self, id: TodoId, patch: &TodoPatch) -> Result<Option<Todo>, StoreError> {
        Ok(TodoRepo::update(&self.pool, id, patch).await?)
    }

    async fn delete(&self, id: TodoId) -> Result<bool, StoreError> {
        Ok(TodoRepo::delete(&self.pool, id).await?)
    }
}
