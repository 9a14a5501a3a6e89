//! Error types for adapters.

use thiserror::Error;

/// Errors that can occur when fetching data from an upstream indexer.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The indexer answered with a non-success status.
    #[error("upstream returned status {status}: {message}")]
    Http { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// The adapter could not be constructed from the given settings.
    #[error("Invalid adapter configuration: {0}")]
    Config(String),
}

impl AdapterError {
    /// HTTP status reported by the upstream, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            AdapterError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(feature = "celenium")]
impl From<reqwest::Error> for AdapterError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AdapterError::Timeout
        } else if err.is_connect() {
            AdapterError::Connection(err.to_string())
        } else if err.is_decode() {
            AdapterError::Parse(err.to_string())
        } else if let Some(status) = err.status() {
            AdapterError::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            AdapterError::Connection(err.to_string())
        }
    }
}
