//! Upstream access for the health engine.
//!
//! This module provides a trait-based abstraction over where namespace
//! activity comes from: the live indexer, or an offline fixture file.

mod file;
mod http;

pub use file::{FileSource, Fixture};
pub use http::CeleniumSource;

use std::fmt::Debug;

use async_trait::async_trait;
use thiserror::Error;

use nshealth_adapters::AdapterError;
use nshealth_types::{Message, NamespaceSummary, RollupInfo};

/// Errors reported by a [`NamespaceSource`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    /// The upstream could not be reached or answered with a failure.
    #[error("source unavailable: {message}")]
    Unavailable {
        status: Option<u16>,
        message: String,
    },

    /// The upstream answered with data that could not be understood.
    #[error("malformed source data: {0}")]
    Malformed(String),
}

impl SourceError {
    /// Create an `Unavailable` error without a status code.
    pub fn unavailable(message: impl Into<String>) -> Self {
        SourceError::Unavailable {
            status: None,
            message: message.into(),
        }
    }

    /// HTTP status reported by the upstream, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            SourceError::Unavailable { status, .. } => *status,
            SourceError::Malformed(_) => None,
        }
    }
}

impl From<AdapterError> for SourceError {
    fn from(err: AdapterError) -> Self {
        match err {
            AdapterError::Parse(message) => SourceError::Malformed(message),
            other => SourceError::Unavailable {
                status: other.status(),
                message: other.to_string(),
            },
        }
    }
}

/// Read-only access to one indexer's view of namespaces.
///
/// The three operations mirror the indexer's REST endpoints. Implementations
/// return data in the indexer's order and perform no scoring.
///
/// # Example
///
/// ```
/// use nshealth::{FileSource, Fixture, NamespaceSource};
/// use nshealth::types::NamespaceSummary;
///
/// # tokio_test::block_on(async {
/// let fixture = Fixture::new(NamespaceSummary::builder("00ab").blobs_count(4).build());
/// let source = FileSource::from_fixture(fixture);
///
/// let summary = source.namespace("00ab").await.unwrap();
/// assert_eq!(summary.map(|s| s.blobs_count), Some(4));
/// # });
/// ```
#[async_trait]
pub trait NamespaceSource: Send + Sync + Debug {
    /// Fetch the summary for a namespace.
    ///
    /// Returns `Ok(None)` when the namespace is unknown to the source.
    async fn namespace(&self, namespace_id: &str) -> Result<Option<NamespaceSummary>, SourceError>;

    /// Fetch one page of messages, possibly empty.
    async fn messages(
        &self,
        namespace_id: &str,
        version: u32,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<Message>, SourceError>;

    /// Fetch rollup registry entries that post to a namespace.
    async fn rollups(
        &self,
        namespace_id: &str,
        version: u32,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<RollupInfo>, SourceError>;

    /// Returns a human-readable description of the source.
    fn description(&self) -> &str;
}
