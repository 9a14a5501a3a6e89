//! # nshealth-types
//!
//! Core types for namespace health analysis. This crate defines the shared
//! schema between the upstream chain indexer (namespace summaries, message
//! records, rollup registry entries) and the health scoring engine (sub-metric
//! breakdowns and session history points).
//!
//! ## Design Goals
//!
//! - **Upstream-compatible**: field names match the indexer's JSON so records
//!   deserialize without an intermediate layer
//! - **Optional serialization**: enable the `serde` feature when reading or
//!   writing JSON
//! - **Tolerant of partial records**: every field the indexer may omit is an
//!   `Option`, so consumers can exclude rather than default missing data
//! - **Ergonomic builders**: fluent API for constructing summaries and
//!   messages in tests and fixtures
//!
//! ## Features
//!
//! - `serde`: JSON serialization via serde (includes chrono's serde support)
//!
//! ## Example
//!
//! ```rust
//! use nshealth_types::{Message, NamespaceSummary};
//!
//! let summary = NamespaceSummary::builder("0000000000000000000000000000000000000000736f76")
//!     .name("sov")
//!     .blobs_count(120)
//!     .pfb_count(100)
//!     .last_message_time_ms(1_717_200_000_000)
//!     .build();
//!
//! let message = Message::builder(1)
//!     .height(1_500_000)
//!     .time_ms(1_717_100_000_000)
//!     .size(2048)
//!     .version(0)
//!     .build();
//!
//! assert_eq!(summary.name, "sov");
//! assert_eq!(message.size, Some(2048));
//! ```

mod health;
mod message;
mod namespace;
mod rollup;

pub use health::*;
pub use message::*;
pub use namespace::*;
pub use rollup::*;

/// Lower bound of every sub-metric and of the composite score.
pub const SCORE_MIN: f64 = 0.0;

/// Upper bound of every sub-metric and of the composite score.
pub const SCORE_MAX: f64 = 10.0;

/// Treat an explicit JSON `null` the same as a missing field.
#[cfg(feature = "serde")]
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + serde::Deserialize<'de>,
{
    use serde::Deserialize;
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
