//! Shared response envelope types for API handlers.
//!
//! Every response is `{ "success": bool, "data"?: ..., "error"?: ... }`.
//! List responses additionally carry `nextCursor` and `hasMore` beside
//! `data`.

use dayplan_core::search::Page;
use serde::Serialize;

/// Standard `{ "success", "data"?, "error"? }` envelope.
///
/// # Example
///
/// ```ignore
/// Ok(Json(ApiResponse::ok(todo)))
/// ```
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// `{ "success", "data": [...], "nextCursor", "hasMore" }` for paginated lists.
#[derive(Debug, Serialize)]
pub struct ListResponse<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub page: Page<T>,
}

impl<T: Serialize> From<Page<T>> for ListResponse<T> {
    fn from(page: Page<T>) -> Self {
        Self {
            success: true,
            page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_envelope_omits_error() {
        let json = serde_json::to_value(ApiResponse::ok(5)).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "data": 5}));
    }

    #[test]
    fn failure_envelope_omits_data() {
        let json = serde_json::to_value(ApiResponse::<()>::failure("Todo not found")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": false, "error": "Todo not found"})
        );
    }

    #[test]
    fn list_envelope_flattens_page() {
        let page = Page {
            data: vec![1, 2],
            next_cursor: None,
            has_more: false,
        };
        let json = serde_json::to_value(ListResponse::from(page)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": true, "data": [1, 2], "nextCursor": null, "hasMore": false})
        );
    }
}
