//! Domain rules for dayplan with no I/O: identities, the error taxonomy,
//! calendar-day bucketing, todo field normalization, dashboard counters,
//! and search/pagination helpers.
//!
//! Shared by the persistence layer, the HTTP API and the client cache.

pub mod dashboard;
pub mod dates;
pub mod error;
pub mod search;
pub mod todo;
pub mod types;
