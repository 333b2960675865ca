use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use dayplan_core::dates::DayRange;
use dayplan_core::search::{is_after_cursor, matches_query, newest_first, Page};
use dayplan_core::todo::{NewTodo, Todo, TodoPatch};
use dayplan_core::types::{new_todo_id, TodoId};
use tokio::sync::RwLock;

use super::{ListQuery, StoreError, TodoStore};

/// [`TodoStore`] holding todos in process memory.
///
/// Used by tests and by the server when no `DATABASE_URL` is configured.
/// Contents are lost on restart.
#[derive(Default)]
pub struct MemoryTodoStore {
    todos: RwLock<HashMap<TodoId, Todo>>,
}

impl MemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully-formed todo, replacing any with the same id.
    pub async fn insert(&self, todo: Todo) {
        self.todos.write().await.insert(todo.id, todo);
    }

    pub async fn is_empty(&self) -> bool {
        self.todos.read().await.is_empty()
    }

    fn sorted<'a>(todos: impl Iterator<Item = &'a Todo>) -> Vec<Todo> {
        let mut todos: Vec<Todo> = todos.cloned().collect();
        todos.sort_by(|a, b| newest_first((&a.created_at, &a.id), (&b.created_at, &b.id)));
        todos
    }
}

#[async_trait]
impl TodoStore for MemoryTodoStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn create(&self, input: &NewTodo) -> Result<Todo, StoreError> {
        let todo = input.clone().into_todo(new_todo_id(), Utc::now());
        self.todos.write().await.insert(todo.id, todo.clone());
        Ok(todo)
    }

    async fn find(&self, id: TodoId) -> Result<Option<Todo>, StoreError> {
        Ok(self.todos.read().await.get(&id).cloned())
    }

    async fn list_page(&self, query: &ListQuery) -> Result<Page<Todo>, StoreError> {
        let todos = self.todos.read().await;

        let anchor = match query.cursor {
            Some(cursor) => {
                let anchor = todos.get(&cursor).ok_or(StoreError::UnknownCursor(cursor))?;
                Some((anchor.created_at, anchor.id))
            }
            None => None,
        };

        let matching = todos.values().filter(|t| {
            let matches = query
                .query
                .as_deref()
                .map_or(true, |q| matches_query(q, &t.title, t.description.as_deref()));
            let after = anchor
                .as_ref()
                .map_or(true, |(at, id)| is_after_cursor((&t.created_at, &t.id), (at, id)));
            matches && after
        });

        let limit = usize::try_from(query.limit).unwrap_or(0);
        let rows: Vec<Todo> = Self::sorted(matching).into_iter().take(limit + 1).collect();
        Ok(Page::from_overfetch(rows, query.limit, |t| t.id))
    }

    async fn list_for_day(&self, range: &DayRange) -> Result<Vec<Todo>, StoreError> {
        let todos = self.todos.read().await;
        Ok(Self::sorted(
            todos
                .values()
                .filter(|t| t.date.as_ref().is_some_and(|d| range.contains(d))),
        ))
    }

    async fn update(&self, id: TodoId, patch: &TodoPatch) -> Result<Option<Todo>, StoreError> {
        let mut todos = self.todos.write().await;
        Ok(todos.get_mut(&id).map(|todo| {
            patch.apply_to(todo);
            todo.clone()
        }))
    }

    async fn delete(&self, id: TodoId) -> Result<bool, StoreError> {
        Ok(self.todos.write().await.remove(&id).is_some())
    }
}
