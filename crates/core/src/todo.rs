//! The todo record, its input DTOs, and the field rules applied to them.
//!
//! Raw client input ([`CreateTodo`], [`UpdateTodo`]) is normalized into
//! [`NewTodo`] / [`TodoPatch`] before it reaches storage: blank strings
//! collapse to `None`, dates become UTC midnight, times become `HH:MM`.
//! A [`TodoPatch`] is applied the same way by the in-memory store and by the
//! client cache's optimistic updates.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dates::normalize_date_input;
use crate::error::CoreError;
use crate::types::{Timestamp, TodoId};

/// Maximum title length, in characters.
pub const TITLE_MAX_LEN: usize = 60;

/// Maximum description length, in characters.
pub const DESCRIPTION_MAX_LEN: usize = 1000;

/// Wire format for start/end times.
pub const TIME_OF_DAY_FORMAT: &str = "%H:%M";

/// A stored todo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    #[serde(alias = "_id")]
    pub id: TodoId,
    pub title: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    /// UTC midnight of the todo's calendar date.
    pub date: Option<Timestamp>,
    pub description: Option<String>,
    pub is_completed: bool,
    pub created_at: Timestamp,
}

/// Request body for creating a todo.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodo {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    /// `YYYY-MM-DD` (or an RFC 3339 timestamp).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
}

/// Request body for a partial update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
}

impl UpdateTodo {
    /// Patch that only flips the completion flag.
    pub fn completion(is_completed: bool) -> Self {
        Self {
            is_completed: Some(is_completed),
            ..Self::default()
        }
    }
}

/// A validated todo ready to insert.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct NewTodo {
    #[validate(length(min = 1, max = 60, message = "Title must be 1 to 60 characters"))]
    pub title: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub date: Option<Timestamp>,
    #[validate(length(max = 1000, message = "Description is too long"))]
    pub description: Option<String>,
    pub is_completed: bool,
}

impl NewTodo {
    /// Materialize the stored record with a server-assigned id and timestamp.
    pub fn into_todo(self, id: TodoId, created_at: Timestamp) -> Todo {
        Todo {
            id,
            title: self.title,
            start_time: self.start_time,
            end_time: self.end_time,
            date: self.date,
            description: self.description,
            is_completed: self.is_completed,
            created_at,
        }
    }
}

/// A validated partial update.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct TodoPatch {
    #[validate(length(min = 1, max = 60, message = "Title must be 1 to 60 characters"))]
    pub title: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub date: Option<Timestamp>,
    #[validate(length(max = 1000, message = "Description is too long"))]
    pub description: Option<String>,
    pub is_completed: Option<bool>,
}

impl TodoPatch {
    /// Overwrite the fields present in this patch.
    pub fn apply_to(&self, todo: &mut Todo) {
        if let Some(title) = &self.title {
            todo.title.clone_from(title);
        }
        if let Some(start_time) = &self.start_time {
            todo.start_time = Some(start_time.clone());
        }
        if let Some(end_time) = &self.end_time {
            todo.end_time = Some(end_time.clone());
        }
        if let Some(date) = self.date {
            todo.date = Some(date);
        }
        if let Some(description) = &self.description {
            todo.description = Some(description.clone());
        }
        if let Some(is_completed) = self.is_completed {
            todo.is_completed = is_completed;
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl CreateTodo {
    /// Normalize and validate into a [`NewTodo`].
    pub fn normalize(&self) -> Result<NewTodo, CoreError> {
        let new = NewTodo {
            title: self.title.trim().to_string(),
            start_time: normalize_time_of_day(self.start_time.as_deref())?,
            end_time: normalize_time_of_day(self.end_time.as_deref())?,
            date: normalize_optional_date(self.date.as_deref())?,
            description: non_blank(self.description.as_deref()),
            is_completed: self.is_completed,
        };
        new.validate().map_err(validation_error)?;
        Ok(new)
    }
}

impl UpdateTodo {
    /// Normalize and validate into a [`TodoPatch`].
    ///
    /// A present-but-blank title is rejected rather than ignored.
    pub fn normalize(&self) -> Result<TodoPatch, CoreError> {
        let patch = TodoPatch {
            title: self.title.as_deref().map(|t| t.trim().to_string()),
            start_time: normalize_time_of_day(self.start_time.as_deref())?,
            end_time: normalize_time_of_day(self.end_time.as_deref())?,
            date: normalize_optional_date(self.date.as_deref())?,
            description: non_blank(self.description.as_deref()),
            is_completed: self.is_completed,
        };
        patch.validate().map_err(validation_error)?;
        Ok(patch)
    }
}

fn validation_error(errors: validator::ValidationErrors) -> CoreError {
    CoreError::Validation(errors.to_string())
}

fn normalize_optional_date(value: Option<&str>) -> Result<Option<Timestamp>, CoreError> {
    non_blank(value)
        .map(|date| normalize_date_input(&date))
        .transpose()
}

/// Collapse empty or whitespace-only optional text to `None`.
///
/// Forms submit `""` for fields the user left blank.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Normalize an optional `HH:MM` time of day. Blank input is `None`.
pub fn normalize_time_of_day(value: Option<&str>) -> Result<Option<String>, CoreError> {
    let Some(value) = non_blank(value) else {
        return Ok(None);
    };
    let time = NaiveTime::parse_from_str(&value, TIME_OF_DAY_FORMAT)
        .map_err(|_| CoreError::Validation(format!("Invalid time '{value}', expected HH:MM")))?;
    Ok(Some(time.format(TIME_OF_DAY_FORMAT).to_string()))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Utc;

    use super::*;

    fn create(title: &str) -> CreateTodo {
        CreateTodo {
            title: title.to_string(),
            ..CreateTodo::default()
        }
    }

    #[test]
    fn create_trims_title() {
        let new = create("  Pay rent ").normalize().unwrap();
        assert_eq!(new.title, "Pay rent");
        assert!(!new.is_completed);
    }

    #[test]
    fn blank_title_rejected() {
        assert_matches!(create("").normalize(), Err(CoreError::Validation(_)));
        assert_matches!(create("   ").normalize(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn title_length_counts_characters() {
        assert!(create(&"é".repeat(TITLE_MAX_LEN)).normalize().is_ok());
        assert_matches!(
            create(&"a".repeat(TITLE_MAX_LEN + 1)).normalize(),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn description_length_bounded() {
        let mut input = create("Write report");
        input.description = Some("x".repeat(DESCRIPTION_MAX_LEN + 1));
        assert_matches!(input.normalize(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn create_normalizes_optional_fields() {
        let input = CreateTodo {
            title: "Pay rent".into(),
            start_time: Some("9:00".into()),
            end_time: Some("".into()),
            date: Some("2024-03-01".into()),
            description: Some("  ".into()),
            is_completed: false,
        };
        let new = input.normalize().unwrap();
        assert_eq!(new.start_time.as_deref(), Some("09:00"));
        assert_eq!(new.end_time, None);
        assert_eq!(new.description, None);
        assert_eq!(
            new.date.map(|d| d.to_rfc3339()).as_deref(),
            Some("2024-03-01T00:00:00+00:00")
        );
    }

    #[test]
    fn invalid_time_rejected() {
        let mut input = create("Standup");
        input.start_time = Some("25:00".into());
        assert_matches!(input.normalize(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn update_rejects_blank_title() {
        let input = UpdateTodo {
            title: Some(" ".into()),
            ..UpdateTodo::default()
        };
        assert_matches!(input.normalize(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn patch_applies_only_present_fields() {
        let mut todo = create("Pay rent")
            .normalize()
            .unwrap()
            .into_todo(crate::types::new_todo_id(), Utc::now());
        let before = todo.clone();

        let patch = UpdateTodo::completion(true).normalize().unwrap();
        patch.apply_to(&mut todo);

        assert!(todo.is_completed);
        assert_eq!(todo.title, before.title);
        assert_eq!(todo.created_at, before.created_at);
    }

    #[test]
    fn empty_update_is_empty_patch() {
        assert!(UpdateTodo::default().normalize().unwrap().is_empty());
        assert!(!UpdateTodo::completion(false).normalize().unwrap().is_empty());
    }

    #[test]
    fn todo_accepts_underscore_id_alias() {
        let json = serde_json::json!({
            "_id": "0190c6d2-7f3a-7cc0-8000-000000000001",
            "title": "Pay rent",
            "startTime": null,
            "endTime": null,
            "date": null,
            "description": null,
            "isCompleted": false,
            "createdAt": "2024-03-01T08:00:00Z",
        });
        let todo: Todo = serde_json::from_value(json).unwrap();
        assert_eq!(todo.title, "Pay rent");
    }

    #[test]
    fn todo_serializes_camel_case() {
        let todo = create("Pay rent")
            .normalize()
            .unwrap()
            .into_todo(crate::types::new_todo_id(), Utc::now());
        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json["isCompleted"], false);
        assert!(json.get("createdAt").is_some());
        assert!(json["id"].is_string());
    }
}
