//! Client-side data access and cache for the dayplan API.
//!
//! [`api::TodoApi`] is the transport seam ([`api::HttpTodoApi`] speaks the
//! JSON envelope over `reqwest`). [`client::TodoClient`] keeps query results
//! in a [`cache::QueryCache`] and applies updates and deletes optimistically,
//! rolling back when the server rejects them.

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod optimistic;

pub use api::{HttpTodoApi, TodoApi};
pub use cache::{CachedData, QueryCache, QueryKey};
pub use client::TodoClient;
pub use config::ClientConfig;
pub use error::ClientError;
