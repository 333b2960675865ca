//! Row structs for the database tables.
//!
//! Each submodule contains a `FromRow` struct matching the table's columns
//! and the conversion into the domain type from `dayplan_core`.

pub mod todo;
