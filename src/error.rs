//! Error types for ollama-relay

use thiserror::Error;

/// Result type alias using [`RelayError`]
pub type Result<T> = std::result::Result<T, RelayError>;

/// Main error type for ollama-relay
#[derive(Debug, Error)]
pub enum RelayError {
    /// Inbound request failed validation
    #[error("{0}")]
    InvalidRequest(String),

    /// Backend replied with an explicit failure status
    #[error("Ollama API error: {status} - {body}")]
    BackendApi { status: u16, body: String },

    /// HTTP transport error talking to the backend
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration parse error
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParse {
        path: std::path::PathBuf,
        message: String,
    },

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl RelayError {
    /// HTTP status the caller sees for this error.
    ///
    /// Validation failures map to 400, backend API failures relay the exact
    /// upstream status, everything else is a 500.
    pub fn status_code(&self) -> u16 {
        match self {
            RelayError::InvalidRequest(_) => 400,
            RelayError::BackendApi { status, .. } => *status,
            _ => 500,
        }
    }
}

impl From<String> for RelayError {
    fn from(s: String) -> Self {
        RelayError::Other(s)
    }
}

impl From<&str> for RelayError {
    fn from(s: &str) -> Self {
        RelayError::Other(s.to_string())
    }
}
