use dayplan_core::search::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};

use crate::error::ClientError;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the API, including the `/api` prefix.
    pub api_url: String,
    /// Todos requested per page.
    pub page_size: i64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3000/api".into(),
            page_size: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var             | Default                     |
    /// |---------------------|-----------------------------|
    /// | `DAYPLAN_API_URL`   | `http://localhost:3000/api` |
    /// | `DAYPLAN_PAGE_SIZE` | `10`                        |
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_values(
            std::env::var("DAYPLAN_API_URL").ok().as_deref(),
            std::env::var("DAYPLAN_PAGE_SIZE").ok().as_deref(),
        )
    }

    fn from_values(api_url: Option<&str>, page_size: Option<&str>) -> Result<Self, ClientError> {
        let defaults = Self::default();

        let api_url = api_url
            .map(|url| url.trim().trim_end_matches('/'))
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .unwrap_or(defaults.api_url);

        let page_size = match page_size {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|n| (1..=MAX_PAGE_LIMIT).contains(n))
                .ok_or_else(|| {
                    ClientError::Config(format!(
                        "DAYPLAN_PAGE_SIZE must be between 1 and {MAX_PAGE_LIMIT}, got '{raw}'"
                    ))
                })?,
            None => defaults.page_size,
        };

        Ok(Self { api_url, page_size })
    }
}
