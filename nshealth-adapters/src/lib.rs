//! # nshealth-adapters
//!
//! Upstream adapters for fetching namespace activity from chain indexers.
//!
//! Adapters talk to a remote, read-only data source and convert its responses
//! into the shared [`nshealth_types`] schema. They perform no scoring.
//!
//! ## Supported Indexers
//!
//! - **Celenium** (`celenium` feature) - Namespace summaries, message pages
//!   and the rollup registry via the public REST API
//!
//! ## Quick Start (Celenium)
//!
//! ```rust,no_run
//! use nshealth_adapters::celenium::CeleniumClient;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CeleniumClient::builder()
//!         .timeout(Duration::from_secs(5))
//!         .build()?;
//!
//!     let summary = client
//!         .fetch_namespace("0000000000000000000000000000000000000000736f76")
//!         .await?;
//!
//!     println!("found: {}", summary.is_some());
//!     Ok(())
//! }
//! ```

pub mod error;

#[cfg(feature = "celenium")]
pub mod celenium;

pub use error::AdapterError;

// Re-export types for convenience
pub use nshealth_types::{Message, NamespaceSummary, RollupInfo};
