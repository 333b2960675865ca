//! Search and cursor-pagination helpers.
//!
//! Listing order is newest-first by creation time with the id as a
//! tie-break, so the order is total and a cursor (the id of the last item
//! on a page) always identifies a unique position.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::types::{Timestamp, TodoId};

// ---------------------------------------------------------------------------
// Pagination defaults
// ---------------------------------------------------------------------------

/// Default number of todos per page.
pub const DEFAULT_PAGE_LIMIT: i64 = 10;

/// Maximum number of todos per page.
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Clamp a user-provided limit to valid bounds.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Normalize a raw `q` parameter. Blank queries mean "no filter".
pub fn normalize_query(q: Option<&str>) -> Option<String> {
    q.map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_string)
}

/// Case-insensitive substring match against title OR description.
pub fn matches_query(query: &str, title: &str, description: Option<&str>) -> bool {
    let needle = query.to_lowercase();
    title.to_lowercase().contains(&needle)
        || description.is_some_and(|d| d.to_lowercase().contains(&needle))
}

/// Escape `%`, `_` and `\` so user input is matched literally by `ILIKE`.
pub fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// `ILIKE` pattern for a substring search.
pub fn like_pattern(query: &str) -> String {
    format!("%{}%", escape_like(query))
}

// ---------------------------------------------------------------------------
// Ordering & pages
// ---------------------------------------------------------------------------

/// Listing order: newest first, then descending id.
pub fn newest_first(a: (&Timestamp, &TodoId), b: (&Timestamp, &TodoId)) -> Ordering {
    b.0.cmp(a.0).then_with(|| b.1.cmp(a.1))
}

/// Whether `item` sorts strictly after the `cursor` position.
pub fn is_after_cursor(item: (&Timestamp, &TodoId), cursor: (&Timestamp, &TodoId)) -> bool {
    newest_first(item, cursor) == Ordering::Greater
}

/// One page of a cursor-paginated listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub next_cursor: Option<TodoId>,
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Build a page from a `limit + 1` over-fetch.
    ///
    /// The extra row only signals that more results exist; it is dropped.
    /// `next_cursor` is the id of the last returned item when more exist.
    pub fn from_overfetch(mut rows: Vec<T>, limit: i64, id_of: impl Fn(&T) -> TodoId) -> Self {
        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        let has_more = rows.len() > limit;
        rows.truncate(limit);
        let next_cursor = if has_more { rows.last().map(&id_of) } else { None };
        Page {
            data: rows,
            next_cursor,
            has_more,
        }
    }
}
