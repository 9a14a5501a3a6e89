//! Celenium adapter using the public indexer REST API.
//!
//! Celenium indexes Celestia blocks and exposes namespace aggregates,
//! per-namespace message listings and a rollup registry.
//!
//! ## Endpoints Used
//!
//! - `GET /namespace/{id}`: array with zero or one namespace summary
//! - `GET /namespace/{id}/{version}/messages?limit=&offset=`: message page
//! - `GET /namespace/{id}/{version}/rollups?limit=&offset=`: rollup registry
//!
//! The API does not report a total count for paged listings.
//!
//! ## Example
//!
//! ```rust,no_run
//! use nshealth_adapters::celenium::CeleniumClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CeleniumClient::builder()
//!         .endpoint("https://api-mainnet.celenium.io/v1")
//!         .build()?;
//!
//!     let id = "0000000000000000000000000000000000000000736f76";
//!     if let Some(summary) = client.fetch_namespace(id).await? {
//!         let page = client.fetch_messages(id, summary.version, 0, 10).await?;
//!         println!("{}: {} messages on first page", summary.display_name(), page.len());
//!     }
//!
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use nshealth_types::{Message, NamespaceSummary, RollupInfo};

use crate::AdapterError;

/// Public mainnet endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api-mainnet.celenium.io/v1";

/// Largest page the API will serve.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Celenium client for namespace data.
#[derive(Debug, Clone)]
pub struct CeleniumClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl CeleniumClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> CeleniumClientBuilder {
        CeleniumClientBuilder::default()
    }

    /// The base URL requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch the summary for a namespace.
    ///
    /// Returns `Ok(None)` when the indexer answers with an empty list.
    pub async fn fetch_namespace(
        &self,
        namespace_id: &str,
    ) -> Result<Option<NamespaceSummary>, AdapterError> {
        let path = format!("namespace/{}", namespace_id);
        let summaries: Vec<NamespaceSummary> = self.get_list(&path, &[]).await?;
        Ok(summaries.into_iter().next())
    }

    /// Fetch one page of messages, ordered as the indexer returns them.
    pub async fn fetch_messages(
        &self,
        namespace_id: &str,
        version: u32,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<Message>, AdapterError> {
        let path = format!("namespace/{}/{}/messages", namespace_id, version);
        self.get_list(&path, &page_query(offset, limit)).await
    }

    /// Fetch rollup registry entries that post to a namespace.
    pub async fn fetch_rollups(
        &self,
        namespace_id: &str,
        version: u32,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<RollupInfo>, AdapterError> {
        let path = format!("namespace/{}/{}/rollups", namespace_id, version);
        self.get_list(&path, &page_query(offset, limit)).await
    }

    /// GET a JSON array, treating a `null` body as empty.
    async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, AdapterError> {
        let url = format!("{}/{}", self.endpoint, path);
        debug!(%url, ?query, "celenium request");

        let mut request = self.client.get(&url).query(query);
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AdapterError::Http {
                status: status.as_u16(),
                message: "rate limited".to_string(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdapterError::Http {
                status: status.as_u16(),
                message: error_message(&body, status),
            });
        }

        let bytes = response.bytes().await?;
        let items: Option<Vec<T>> =
            serde_json::from_slice(&bytes).map_err(|e| AdapterError::Parse(e.to_string()))?;

        Ok(items.unwrap_or_default())
    }
}

/// Builder for CeleniumClient.
#[derive(Debug, Default)]
pub struct CeleniumClientBuilder {
    endpoint: Option<String>,
    api_key: Option<String>,
    timeout: Option<Duration>,
}

impl CeleniumClientBuilder {
    /// Set the API base URL (e.g., "https://api-mocha.celenium.io/v1").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the API key sent in the `apikey` header.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<CeleniumClient, AdapterError> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdapterError::Config(e.to_string()))?;

        let endpoint = self
            .endpoint
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string();

        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(AdapterError::Config(format!(
                "endpoint must be an http(s) URL, got '{}'",
                endpoint
            )));
        }

        Ok(CeleniumClient {
            client,
            endpoint,
            api_key: self.api_key.filter(|k| !k.is_empty()),
        })
    }
}

fn page_query(offset: u64, limit: u32) -> [(&'static str, String); 2] {
    [
        ("limit", limit.min(MAX_PAGE_SIZE).to_string()),
        ("offset", offset.to_string()),
    ]
}

// Celenium error bodies look like {"message": "..."}; fall back to the reason phrase.
fn error_message(body: &str, status: StatusCode) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        })
}
