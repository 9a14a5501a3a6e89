//! Engine error types.

use thiserror::Error;

use crate::source::SourceError;

/// Failures surfaced by [`HealthEngine`](crate::HealthEngine) operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The namespace or message fetch failed. Fatal to an analysis.
    #[error("upstream unavailable: {message}")]
    UpstreamUnavailable {
        /// HTTP status, when the upstream answered at all.
        status: Option<u16>,
        message: String,
    },

    /// The indexer does not know the namespace.
    #[error("namespace {0} not found")]
    NotFound(String),

    /// The operation needs a completed analysis.
    #[error("no namespace has been analyzed")]
    NoSession,

    /// A newer analysis (or a reset) started while this call was in flight.
    #[error("superseded by a newer request")]
    Superseded,
}

impl EngineError {
    /// HTTP status reported by the upstream, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            EngineError::UpstreamUnavailable { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<SourceError> for EngineError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Unavailable { status, message } => {
                EngineError::UpstreamUnavailable { status, message }
            }
            SourceError::Malformed(message) => EngineError::UpstreamUnavailable {
                status: None,
                message,
            },
        }
    }
}
