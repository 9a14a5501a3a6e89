//! File-based data source.
//!
//! Serves a recorded namespace from a JSON fixture, for offline analysis and
//! reproducible runs.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use nshealth_types::{Message, NamespaceSummary, RollupInfo};

use super::{NamespaceSource, SourceError};

/// A recorded namespace: its summary, its messages and its rollups.
///
/// Messages are stored in the order the indexer would list them; pages are
/// served by slicing this list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub namespace: NamespaceSummary,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub rollups: Vec<RollupInfo>,
}

impl Fixture {
    /// A fixture with no messages or rollups.
    pub fn new(namespace: NamespaceSummary) -> Self {
        Self {
            namespace,
            messages: Vec::new(),
            rollups: Vec::new(),
        }
    }

    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    pub fn with_rollups(mut self, rollups: Vec<RollupInfo>) -> Self {
        self.rollups = rollups;
        self
    }

    fn matches(&self, namespace_id: &str, version: u32) -> bool {
        self.namespace.namespace_id == namespace_id && self.namespace.version == version
    }
}

#[derive(Debug)]
enum Backing {
    /// Re-read on every call so edits show up on refresh.
    Path(PathBuf),
    Memory(Fixture),
}

/// A data source that reads a namespace fixture from a JSON file.
#[derive(Debug)]
pub struct FileSource {
    backing: Backing,
    description: String,
}

impl FileSource {
    /// Create a new file source for the given path.
    ///
    /// The file is not read until the first request.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            backing: Backing::Path(path),
            description,
        }
    }

    /// Serve an in-memory fixture.
    pub fn from_fixture(fixture: Fixture) -> Self {
        let description = format!("fixture: {}", fixture.namespace.namespace_id);
        Self {
            backing: Backing::Memory(fixture),
            description,
        }
    }

    /// Read and parse the fixture.
    pub async fn load(&self) -> Result<Fixture, SourceError> {
        match &self.backing {
            Backing::Memory(fixture) => Ok(fixture.clone()),
            Backing::Path(path) => {
                let content = fs::read_to_string(path)
                    .await
                    .map_err(|e| SourceError::unavailable(format!("Read error: {}", e)))?;
                serde_json::from_str(&content)
                    .map_err(|e| SourceError::Malformed(format!("Parse error: {}", e)))
            }
        }
    }
}

/// Slice one page out of a stored list.
fn page<T: Clone>(items: &[T], offset: u64, limit: u32) -> Vec<T> {
    let start = usize::try_from(offset).unwrap_or(usize::MAX).min(items.len());
    let end = start.saturating_add(limit as usize).min(items.len());
    items[start..end].to_vec()
}

#[async_trait]
impl NamespaceSource for FileSource {
    async fn namespace(&self, namespace_id: &str) -> Result<Option<NamespaceSummary>, SourceError> {
        let fixture = self.load().await?;
        if fixture.namespace.namespace_id == namespace_id {
            Ok(Some(fixture.namespace))
        } else {
            Ok(None)
        }
    }

    async fn messages(
        &self,
        namespace_id: &str,
        version: u32,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<Message>, SourceError> {
        let fixture = self.load().await?;
        if !fixture.matches(namespace_id, version) {
            return Ok(Vec::new());
        }
        let messages = page(&fixture.messages, offset, limit);
        debug!(source = %self.description, offset, returned = messages.len(), "served page");
        Ok(messages)
    }

    async fn rollups(
        &self,
        namespace_id: &str,
        version: u32,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<RollupInfo>, SourceError> {
        let fixture = self.load().await?;
        if !fixture.matches(namespace_id, version) {
            return Ok(Vec::new());
        }
        Ok(page(&fixture.rollups, offset, limit))
    }

    fn description(&self) -> &str {
        &self.description
    }
}
