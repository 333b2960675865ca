//! Typed access to the dayplan HTTP API.
//!
//! [`TodoApi`] is the seam the client cache talks to; [`HttpTodoApi`] is the
//! `reqwest` implementation that speaks the `{ success, data, error }`
//! envelope.

use async_trait::async_trait;
use chrono::NaiveDate;
use dayplan_core::dashboard::Dashboard;
use dayplan_core::dates::DATE_FORMAT;
use dayplan_core::search::Page;
use dayplan_core::todo::{CreateTodo, Todo, UpdateTodo};
use dayplan_core::types::TodoId;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::ClientError;

/// Operations the server exposes for todos.
#[async_trait]
pub trait TodoApi: Send + Sync {
    /// One newest-first page, optionally filtered by `query`, strictly after
    /// `cursor`.
    async fn list(
        &self,
        query: Option<&str>,
        cursor: Option<TodoId>,
        limit: i64,
    ) -> Result<Page<Todo>, ClientError>;

    async fn get(&self, id: TodoId) -> Result<Todo, ClientError>;

    async fn create(&self, input: &CreateTodo) -> Result<Todo, ClientError>;

    async fn update(&self, id: TodoId, input: &UpdateTodo) -> Result<Todo, ClientError>;

    async fn delete(&self, id: TodoId) -> Result<(), ClientError>;

    /// Dashboard for `date`, or for the server's local date when `None`.
    async fn dashboard(&self, date: Option<NaiveDate>) -> Result<Dashboard, ClientError>;
}

/// `{ success, data?, error? }` as received.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

/// HTTP client for a dayplan server.
pub struct HttpTodoApi {
    client: reqwest::Client,
    api_url: String,
}

impl HttpTodoApi {
    /// * `api_url` - Base URL including the `/api` prefix, e.g.
    ///   `http://localhost:3000/api`.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_url)
    }

    /// Reuse an existing [`reqwest::Client`] (and its connection pool).
    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn todo_url(&self, id: TodoId) -> String {
        format!("{}/todos/{id}", self.api_url)
    }

    // ---- private helpers ----

    /// Map a non-2xx response to [`ClientError::Api`], preferring the
    /// envelope's `error` message over the raw body.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        let message = serde_json::from_str::<Envelope<serde_json::Value>>(&body)
            .ok()
            .and_then(|envelope| envelope.error)
            .unwrap_or(body);

        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Unwrap `data` from a successful envelope.
    async fn parse_data<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let response = Self::ensure_success(response).await?;
        let status = response.status().as_u16();
        let envelope = response.json::<Envelope<T>>().await?;

        match envelope {
            Envelope {
                success: true,
                data: Some(data),
                ..
            } => Ok(data),
            Envelope { error, .. } => Err(ClientError::Api {
                status,
                message: error.unwrap_or_else(|| "Response carried no data".to_string()),
            }),
        }
    }
}

#[async_trait]
impl TodoApi for HttpTodoApi {
    async fn list(
        &self,
        query: Option<&str>,
        cursor: Option<TodoId>,
        limit: i64,
    ) -> Result<Page<Todo>, ClientError> {
        let mut params: Vec<(&str, String)> = vec![("limit", limit.to_string())];
        if let Some(query) = query {
            params.push(("q", query.to_string()));
        }
        if let Some(cursor) = cursor {
            params.push(("cursor", cursor.to_string()));
        }

        let response = self
            .client
            .get(format!("{}/todos", self.api_url))
            .query(&params)
            .send()
            .await?;

        // The list envelope carries `data`, `nextCursor` and `hasMore` side
        // by side, which is exactly the shape of `Page`.
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<Page<Todo>>().await?)
    }

    async fn get(&self, id: TodoId) -> Result<Todo, ClientError> {
        let response = self.client.get(self.todo_url(id)).send().await?;
        Self::parse_data(response).await
    }

    async fn create(&self, input: &CreateTodo) -> Result<Todo, ClientError> {
        let response = self
            .client
            .post(format!("{}/todos", self.api_url))
            .json(input)
            .send()
            .await?;
        Self::parse_data(response).await
    }

    async fn update(&self, id: TodoId, input: &UpdateTodo) -> Result<Todo, ClientError> {
        let response = self
            .client
            .put(self.todo_url(id))
            .json(input)
            .send()
            .await?;
        Self::parse_data(response).await
    }

    async fn delete(&self, id: TodoId) -> Result<(), ClientError> {
        let response = self.client.delete(self.todo_url(id)).send().await?;
        Self::parse_data::<serde_json::Value>(response).await?;
        Ok(())
    }

    async fn dashboard(&self, date: Option<NaiveDate>) -> Result<Dashboard, ClientError> {
        let mut request = self.client.get(format!("{}/todos/dashboard", self.api_url));
        if let Some(date) = date {
            request = request.query(&[("date", date.format(DATE_FORMAT).to_string())]);
        }
        Self::parse_data(request.send().await?).await
    }
}
