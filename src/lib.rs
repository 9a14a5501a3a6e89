//! # nshealth
//!
//! Health scoring for Celestia data-availability namespaces.
//!
//! This crate fetches a namespace's summary and a sample of its recent
//! messages from an indexer, derives five normalized sub-metrics, combines
//! them into one score on a 0-10 scale and classifies it into a status tier.
//! It keeps a session history of scores for trend display and pages through
//! the namespace's messages on demand.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         HealthEngine                         │
//! │  ┌──────────┐   summary + sample   ┌───────────────────────┐ │
//! │  │  source  │─────────────────────▶│ data::metrics         │ │
//! │  │ (input)  │                      │ data::score           │ │
//! │  └────┬─────┘                      │ data::history         │ │
//! │       │       message pages        │ data::pagination      │ │
//! │       └───────────────────────────▶└───────────────────────┘ │
//! └──────────────────────────────────────────────────────────────┘
//!      ▲
//!      └── CeleniumSource | FileSource
//! ```
//!
//! - **[`source`]**: Upstream abstraction ([`NamespaceSource`] trait) with
//!   the live indexer and offline fixture implementations
//! - **[`data`]**: The scoring pipeline - metrics, aggregation, status tiers,
//!   history and pagination
//! - **[`engine`]**: The [`HealthEngine`] state machine that sequences fetches
//!   and owns the session
//! - **[`settings`]**: Layered configuration
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Score a namespace on mainnet
//! nshealth 0000000000000000000000000000000000000000736f76
//!
//! # Score it three more times, a minute apart, and print JSON
//! nshealth 0000000000000000000000000000000000000000736f76 --refresh 3 --interval 1m --json
//!
//! # Score a recorded fixture offline
//! nshealth 0000000000000000000000000000000000000000736f76 --file fixture.json
//! ```
//!
//! ### As a library with the live indexer
//!
//! ```no_run
//! use std::sync::Arc;
//! use nshealth::{CeleniumSource, EngineSettings, HealthEngine};
//! use nshealth::adapters::celenium::CeleniumClient;
//!
//! # tokio_test::block_on(async {
//! let client = CeleniumClient::builder().build().unwrap();
//! let source = Arc::new(CeleniumSource::new(client));
//! let engine = HealthEngine::new(source, EngineSettings::default());
//!
//! let report = engine
//!     .analyze("0000000000000000000000000000000000000000736f76")
//!     .await
//!     .unwrap();
//! println!("{} ({})", report.score, report.status);
//! # });
//! ```
//!
//! ### Scoring without an engine
//!
//! ```
//! use nshealth::data::{aggregate, metrics, HealthStatus};
//! use nshealth::types::NamespaceSummary;
//!
//! let summary = NamespaceSummary::builder("00ab").blobs_count(100).pfb_count(50).build();
//! let metrics = metrics::calculate(&summary, &[]);
//!
//! assert_eq!(metrics.pfb_ratio, 10.0);
//! assert_eq!(metrics.message_frequency, 10.0);
//! // (10 + 0 + 10 + 10 + 0) / 5
//! let score = aggregate(&metrics);
//! assert_eq!(score, 6.0);
//! assert_eq!(HealthStatus::from_score(score), HealthStatus::Good);
//! ```

pub mod data;
pub mod engine;
pub mod error;
pub mod settings;
pub mod source;

pub use nshealth_adapters as adapters;
pub use nshealth_types as types;

// Re-export main types for convenience
pub use data::{HealthHistory, HealthStatus, MessagePage, PageRequest, PaginationState};
pub use engine::{EngineSettings, EngineState, HealthEngine, HealthReport, Notice};
pub use error::EngineError;
pub use settings::Settings;
pub use source::{CeleniumSource, FileSource, Fixture, NamespaceSource, SourceError};
