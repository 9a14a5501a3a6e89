//! Live indexer source.

use async_trait::async_trait;

use nshealth_adapters::celenium::CeleniumClient;
use nshealth_types::{Message, NamespaceSummary, RollupInfo};

use super::{NamespaceSource, SourceError};

/// A source backed by the Celenium REST API.
#[derive(Debug, Clone)]
pub struct CeleniumSource {
    client: CeleniumClient,
    description: String,
}

impl CeleniumSource {
    pub fn new(client: CeleniumClient) -> Self {
        let description = format!("celenium: {}", client.endpoint());
        Self {
            client,
            description,
        }
    }

    /// Returns the underlying client.
    pub fn client(&self) -> &CeleniumClient {
        &self.client
    }
}

#[async_trait]
impl NamespaceSource for CeleniumSource {
    async fn namespace(&self, namespace_id: &str) -> Result<Option<NamespaceSummary>, SourceError> {
        Ok(self.client.fetch_namespace(namespace_id).await?)
    }

    async fn messages(
        &self,
        namespace_id: &str,
        version: u32,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<Message>, SourceError> {
        Ok(self
            .client
            .fetch_messages(namespace_id, version, offset, limit)
            .await?)
    }

    async fn rollups(
        &self,
        namespace_id: &str,
        version: u32,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<RollupInfo>, SourceError> {
        Ok(self
            .client
            .fetch_rollups(namespace_id, version, offset, limit)
            .await?)
    }

    fn description(&self) -> &str {
        &self.description
    }
}
