//! Query parameter types for API handlers.

use serde::Deserialize;

/// `GET /todos?q=&cursor=&limit=`
///
/// `cursor` stays a string here so a malformed value can be reported as a
/// bad cursor rather than a generic query-string error.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub q: Option<String>,
    pub cursor: Option<String>,
    pub limit: Option<i64>,
}

/// `GET /todos/dashboard?date=YYYY-MM-DD`
#[derive(Debug, Default, Deserialize)]
pub struct DashboardParams {
    pub date: Option<String>,
}
