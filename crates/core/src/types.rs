/// Todo identities are UUIDv7, rendered to clients as opaque strings.
pub type TodoId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Generate a fresh, time-ordered todo identity.
pub fn new_todo_id() -> TodoId {
    uuid::Uuid::now_v7()
}
