//! Cache-backed client with optimistic updates.
//!
//! Reads go through [`QueryCache`] fetch tickets so a superseded response
//! never overwrites newer data. Updates and deletes follow the optimistic
//! protocol:
//!
//! 1. cancel in-flight fetches, snapshot, and apply locally (one write lock);
//! 2. send the request;
//! 3. on failure restore the snapshot;
//! 4. either way, mark every affected entry stale and refetch it.
//!
//! Creates are not optimistic: the request is sent first and the affected
//! entries are refetched afterwards.

use std::future::Future;

use chrono::NaiveDate;
use dayplan_core::dashboard::Dashboard;
use dayplan_core::dates::local_today;
use dayplan_core::search::Page;
use dayplan_core::todo::{CreateTodo, Todo, UpdateTodo};
use dayplan_core::types::TodoId;

use crate::api::{HttpTodoApi, TodoApi};
use crate::cache::{CachedData, FetchTicket, NextPage, QueryCache, QueryKey};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::optimistic::{Mutation, Transaction};

/// Attempts for a first load that keeps getting cancelled by mutations.
const FIRST_LOAD_ATTEMPTS: u32 = 3;

pub struct TodoClient<A> {
    api: A,
    cache: QueryCache,
    page_size: i64,
}

impl TodoClient<HttpTodoApi> {
    /// HTTP client configured from [`ClientConfig`].
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(HttpTodoApi::new(config.api_url.clone()), config.page_size)
    }
}

impl<A: TodoApi> TodoClient<A> {
    pub fn new(api: A, page_size: i64) -> Self {
        Self {
            api,
            cache: QueryCache::new(),
            page_size,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Load the first page of the unfiltered listing.
    pub async fn fetch_todos(&self) -> Result<Vec<Todo>, ClientError> {
        self.fetch_listing(&QueryKey::Todos).await
    }

    /// Load the first page of a search. A blank term lists everything.
    pub async fn fetch_search(&self, term: &str) -> Result<Vec<Todo>, ClientError> {
        self.fetch_listing(&QueryKey::search(term)).await
    }

    /// Load the dashboard for `date`.
    pub async fn fetch_dashboard(&self, date: NaiveDate) -> Result<Dashboard, ClientError> {
        let key = QueryKey::Dashboard { date };
        match self.refetch(&key).await? {
            CachedData::Dashboard(dashboard) => Ok(dashboard),
            CachedData::Pages(_) => unreachable!("dashboard keys only hold dashboard data"),
        }
    }

    /// Load the dashboard for the local calendar date.
    pub async fn fetch_today(&self) -> Result<Dashboard, ClientError> {
        self.fetch_dashboard(local_today()).await
    }

    /// Append the next page to a loaded listing.
    ///
    /// Returns whether more pages remain. Loads the first page when the
    /// listing has not been fetched yet.
    pub async fn fetch_next_page(&self, key: &QueryKey) -> Result<bool, ClientError> {
        let (ticket, cursor) = match self.cache.begin_next_page(key).await {
            NextPage::Unloaded => {
                let data = self.refetch(key).await?;
                return Ok(has_more(&data));
            }
            NextPage::Exhausted => return Ok(false),
            NextPage::Fetch { ticket, cursor } => (ticket, cursor),
        };

        let page = self
            .guarded(&ticket, self.api.list(key.query(), cursor, self.page_size))
            .await?;
        let more = page.has_more;
        if !self.cache.append_page(key, &ticket, page).await {
            return Err(ClientError::Cancelled);
        }
        Ok(more)
    }

    /// Fetch `key` again and store the result.
    ///
    /// Listings reload as many pages as were loaded before. A first load
    /// cancelled by a mutation is retried, since no settle refetch will
    /// deliver data to the caller.
    pub async fn refetch(&self, key: &QueryKey) -> Result<CachedData, ClientError> {
        let first_load = self.cache.get(key).await.is_none();
        let mut attempt = 1;
        loop {
            match self.fetch_once(key).await {
                Err(ClientError::Cancelled) if first_load && attempt < FIRST_LOAD_ATTEMPTS => {
                    tracing::debug!(%key, attempt, "First load cancelled, retrying");
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Create a todo, then refetch every cached query.
    pub async fn create(&self, input: CreateTodo) -> Result<Todo, ClientError> {
        input.normalize()?;
        let todo = self.api.create(&input).await?;
        tracing::debug!(todo_id = %todo.id, "Todo created");

        let keys = self.cache.keys().await;
        self.settle(&keys).await;
        Ok(todo)
    }

    /// Optimistically apply a partial update.
    pub async fn update(&self, id: TodoId, input: UpdateTodo) -> Result<Todo, ClientError> {
        let patch = input.normalize()?;
        let tx = self.cache.begin_transaction(Mutation::Update { id, patch }).await;
        let result = self.api.update(id, &input).await;
        self.finish(&tx, result.as_ref().err()).await;
        result
    }

    /// Optimistically set the completion flag.
    pub async fn set_completed(&self, id: TodoId, is_completed: bool) -> Result<Todo, ClientError> {
        self.update(id, UpdateTodo::completion(is_completed)).await
    }

    /// Optimistically delete a todo.
    pub async fn delete(&self, id: TodoId) -> Result<(), ClientError> {
        let tx = self.cache.begin_transaction(Mutation::Delete { id }).await;
        let result = self.api.delete(id).await;
        self.finish(&tx, result.as_ref().err()).await;
        result
    }

    // ---- private helpers ----

    async fn fetch_listing(&self, key: &QueryKey) -> Result<Vec<Todo>, ClientError> {
        let data = self.refetch(key).await?;
        Ok(data.todos().cloned().collect())
    }

    async fn fetch_once(&self, key: &QueryKey) -> Result<CachedData, ClientError> {
        let loaded_pages = self
            .cache
            .get(key)
            .await
            .and_then(|data| data.as_pages().map(|pages| pages.len()))
            .unwrap_or(1)
            .max(1);

        let ticket = self.cache.begin_fetch(key).await;
        let data = match key {
            QueryKey::Dashboard { date } => CachedData::Dashboard(
                self.guarded(&ticket, self.api.dashboard(Some(*date)))
                    .await?,
            ),
            QueryKey::Todos | QueryKey::Search { .. } => CachedData::Pages(
                self.guarded(&ticket, self.load_pages(key.query(), loaded_pages))
                    .await?,
            ),
        };

        if !self.cache.complete_fetch(key, &ticket, data.clone()).await {
            return Err(ClientError::Cancelled);
        }
        Ok(data)
    }

    /// Await `fut` unless the ticket is cancelled first.
    async fn guarded<T, F>(&self, ticket: &FetchTicket, fut: F) -> Result<T, ClientError>
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        tokio::select! {
            biased;
            () = ticket.token.cancelled() => Err(ClientError::Cancelled),
            result = fut => result,
        }
    }

    /// Load up to `count` pages from the start of a listing.
    async fn load_pages(
        &self,
        query: Option<&str>,
        count: usize,
    ) -> Result<Vec<Page<Todo>>, ClientError> {
        let mut pages = Vec::with_capacity(count);
        let mut cursor = None;
        loop {
            let page = self.api.list(query, cursor, self.page_size).await?;
            cursor = page.next_cursor;
            let more = page.has_more;
            pages.push(page);
            if !more || cursor.is_none() || pages.len() >= count {
                return Ok(pages);
            }
        }
    }

    async fn finish(&self, tx: &Transaction, error: Option<&ClientError>) {
        if let Some(error) = error {
            tracing::warn!(todo_id = %tx.mutation.id(), %error, "Mutation failed, rolling back");
            self.cache.rollback(tx).await;
        }
        self.settle(&tx.affected_keys).await;
    }

    /// Mark entries stale and refetch them.
    async fn settle(&self, keys: &[QueryKey]) {
        self.cache.invalidate(keys).await;
        for key in keys {
            match self.refetch(key).await {
                Ok(_) => {}
                // A later mutation owns the entry now and refetches it itself.
                Err(ClientError::Cancelled) => tracing::debug!(%key, "Refetch superseded"),
                Err(error) => tracing::warn!(%key, %error, "Refetch after mutation failed"),
            }
        }
    }
}

fn has_more(data: &CachedData) -> bool {
    data.as_pages()
        .and_then(|pages| pages.last())
        .is_some_and(|page| page.has_more)
}
