use dayplan_core::error::CoreError;

/// Errors surfaced by the dayplan client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, TLS, body decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-2xx status or `success: false`.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// The envelope's `error` message, or the raw body.
        message: String,
    },

    /// Input rejected locally before anything was sent.
    #[error(transparent)]
    Validation(#[from] CoreError),

    /// The fetch was superseded by a newer fetch or a mutation.
    #[error("Fetch cancelled")]
    Cancelled,

    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// HTTP status reported by the server, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Request(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
