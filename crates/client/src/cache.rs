//! Keyed cache of query results.
//!
//! Each entry tracks a fetch generation. Starting a fetch, cancelling, or
//! applying a mutation bumps it, and a fetch may only store its result if
//! the generation it started with is still current. A cancelled or
//! superseded fetch therefore never overwrites newer data.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use dayplan_core::dashboard::Dashboard;
use dayplan_core::dates::DATE_FORMAT;
use dayplan_core::search::{normalize_query, Page};
use dayplan_core::todo::Todo;
use dayplan_core::types::TodoId;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::optimistic::{Mutation, Transaction};

/// Logical identity of a cached query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// The unfiltered todo listing.
    Todos,
    /// The dashboard for one calendar day.
    Dashboard { date: NaiveDate },
    /// A filtered listing.
    Search { term: String },
}

impl QueryKey {
    /// Key for a search term. A blank term is the unfiltered listing.
    pub fn search(term: &str) -> Self {
        match normalize_query(Some(term)) {
            Some(term) => QueryKey::Search { term },
            None => QueryKey::Todos,
        }
    }

    /// The `q` parameter for paginated keys.
    pub fn query(&self) -> Option<&str> {
        match self {
            QueryKey::Search { term } => Some(term),
            _ => None,
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::Todos => f.write_str("todos"),
            QueryKey::Dashboard { date } => write!(f, "dashboard:{}", date.format(DATE_FORMAT)),
            QueryKey::Search { term } => write!(f, "search:{term}"),
        }
    }
}

/// Last-known-good data of an entry.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedData {
    /// Loaded pages of a listing, in order.
    Pages(Vec<Page<Todo>>),
    Dashboard(Dashboard),
}

impl CachedData {
    /// Every todo held by this entry.
    pub fn todos(&self) -> Box<dyn Iterator<Item = &Todo> + '_> {
        match self {
            CachedData::Pages(pages) => Box::new(pages.iter().flat_map(|p| p.data.iter())),
            CachedData::Dashboard(dashboard) => Box::new(dashboard.todos_for_today.iter()),
        }
    }

    pub fn as_dashboard(&self) -> Option<&Dashboard> {
        match self {
            CachedData::Dashboard(dashboard) => Some(dashboard),
            CachedData::Pages(_) => None,
        }
    }

    pub fn as_pages(&self) -> Option<&[Page<Todo>]> {
        match self {
            CachedData::Pages(pages) => Some(pages),
            CachedData::Dashboard(_) => None,
        }
    }
}

#[derive(Debug, Default)]
struct CacheEntry {
    data: Option<CachedData>,
    stale: bool,
    generation: u64,
    in_flight: Option<CancellationToken>,
}

impl CacheEntry {
    /// Cancel any in-flight fetch and invalidate its generation.
    fn cancel_in_flight(&mut self) {
        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }
        self.generation += 1;
    }
}

/// Result of [`QueryCache::begin_next_page`].
#[derive(Debug)]
pub enum NextPage {
    /// The entry holds no listing yet.
    Unloaded,
    /// The last loaded page is the final one.
    Exhausted,
    /// Fetch the page after `cursor`.
    Fetch {
        ticket: FetchTicket,
        cursor: Option<TodoId>,
    },
}

/// Handle for one fetch of one entry.
#[derive(Debug, Clone)]
pub struct FetchTicket {
    pub generation: u64,
    /// Cancelled when the fetch is superseded.
    pub token: CancellationToken,
}

/// The client's query cache.
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: RwLock<HashMap<QueryKey, CacheEntry>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &QueryKey) -> Option<CachedData> {
        self.entries.read().await.get(key)?.data.clone()
    }

    /// Whether the entry needs a refetch. Unknown keys are stale.
    pub async fn is_stale(&self, key: &QueryKey) -> bool {
        self.entries
            .read()
            .await
            .get(key)
            .map_or(true, |entry| entry.stale || entry.data.is_none())
    }

    pub async fn keys(&self) -> Vec<QueryKey> {
        self.entries.read().await.keys().cloned().collect()
    }

    /// Data of every loaded entry.
    pub async fn snapshot(&self) -> HashMap<QueryKey, CachedData> {
        self.entries
            .read()
            .await
            .iter()
            .filter_map(|(key, entry)| Some((key.clone(), entry.data.clone()?)))
            .collect()
    }

    /// Start a fetch for `key`, superseding any fetch already in flight.
    pub async fn begin_fetch(&self, key: &QueryKey) -> FetchTicket {
        let mut entries = self.entries.write().await;
        let entry = entries.entry(key.clone()).or_default();
        entry.cancel_in_flight();

        let token = CancellationToken::new();
        entry.in_flight = Some(token.clone());
        FetchTicket {
            generation: entry.generation,
            token,
        }
    }

    /// Store a fetch result. Returns `false`, discarding `data`, when the
    /// fetch was cancelled or superseded since [`begin_fetch`](Self::begin_fetch).
    pub async fn complete_fetch(
        &self,
        key: &QueryKey,
        ticket: &FetchTicket,
        data: CachedData,
    ) -> bool {
        let mut entries = self.entries.write().await;
        let Some(entry) = entries.get_mut(key) else {
            return false;
        };
        if entry.generation != ticket.generation || ticket.token.is_cancelled() {
            tracing::debug!(%key, generation = ticket.generation, "Discarding superseded fetch");
            return false;
        }

        entry.data = Some(data);
        entry.stale = false;
        entry.in_flight = None;
        true
    }

    /// Mark entries stale so the next read refetches them.
    pub async fn invalidate(&self, keys: &[QueryKey]) {
        let mut entries = self.entries.write().await;
        for key in keys {
            if let Some(entry) = entries.get_mut(key) {
                entry.stale = true;
            }
        }
    }

    /// Start fetching the page after the last loaded item of `key`.
    ///
    /// The cursor and the ticket come from the same lock acquisition, so a
    /// mutation applied before this call is already part of the pages the
    /// next page gets appended to, and one applied after it cancels the
    /// ticket.
    pub async fn begin_next_page(&self, key: &QueryKey) -> NextPage {
        let mut entries = self.entries.write().await;
        let Some(entry) = entries.get_mut(key) else {
            return NextPage::Unloaded;
        };
        let Some(CachedData::Pages(pages)) = &entry.data else {
            return NextPage::Unloaded;
        };
        if !pages.last().is_some_and(|page| page.has_more) {
            return NextPage::Exhausted;
        }

        // The last loaded item marks the position even if the page's own
        // cursor was dropped by a local delete.
        let cursor = pages.iter().rev().find_map(|page| page.data.last()).map(|t| t.id);

        entry.cancel_in_flight();
        let token = CancellationToken::new();
        entry.in_flight = Some(token.clone());
        NextPage::Fetch {
            ticket: FetchTicket {
                generation: entry.generation,
                token,
            },
            cursor,
        }
    }

    /// Append a page to the entry's current pages. Returns `false`,
    /// discarding `page`, when the fetch was cancelled or superseded since
    /// [`begin_next_page`](Self::begin_next_page).
    pub async fn append_page(&self, key: &QueryKey, ticket: &FetchTicket, page: Page<Todo>) -> bool {
        let mut entries = self.entries.write().await;
        let Some(entry) = entries.get_mut(key) else {
            return false;
        };
        if entry.generation != ticket.generation || ticket.token.is_cancelled() {
            tracing::debug!(%key, generation = ticket.generation, "Discarding superseded page");
            return false;
        }
        let Some(CachedData::Pages(pages)) = &mut entry.data else {
            return false;
        };

        pages.push(page);
        entry.stale = false;
        entry.in_flight = None;
        true
    }

    /// Cancel conflicting fetches, snapshot, and apply `mutation` to every
    /// entry, all under one write lock.
    pub async fn begin_transaction(&self, mutation: Mutation) -> Transaction {
        let mut entries = self.entries.write().await;
        for entry in entries.values_mut() {
            entry.cancel_in_flight();
        }

        let keys: Vec<QueryKey> = entries.keys().cloned().collect();
        let tx = Transaction::plan(
            mutation,
            keys,
            entries
                .iter()
                .filter_map(|(key, entry)| Some((key, entry.data.as_ref()?))),
        );
        write_all(&mut entries, &tx.after);

        tracing::debug!(
            todo_id = %tx.mutation.id(),
            entries = tx.affected_keys.len(),
            "Applied optimistic mutation",
        );
        tx
    }

    /// Restore every entry to its state before `tx`.
    pub async fn rollback(&self, tx: &Transaction) {
        let mut entries = self.entries.write().await;
        for key in &tx.affected_keys {
            if let Some(entry) = entries.get_mut(key) {
                entry.cancel_in_flight();
            }
        }
        write_all(&mut entries, &tx.before);

        tracing::debug!(todo_id = %tx.mutation.id(), "Rolled back optimistic mutation");
    }

    #[cfg(test)]
    pub(crate) async fn put(&self, key: QueryKey, data: CachedData) {
        let ticket = self.begin_fetch(&key).await;
        self.complete_fetch(&key, &ticket, data).await;
    }
}

/// Write a set of entry states. Shared by apply and rollback.
fn write_all(entries: &mut HashMap<QueryKey, CacheEntry>, states: &HashMap<QueryKey, CachedData>) {
    for (key, data) in states {
        entries.entry(key.clone()).or_default().data = Some(data.clone());
    }
}
