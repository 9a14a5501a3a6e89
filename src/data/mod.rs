//! Health scoring pipeline and session bookkeeping.
//!
//! This module turns a namespace summary and a message sample into a scored,
//! tiered health assessment, and tracks the per-session state around it.
//!
//! ## Submodules
//!
//! - [`metrics`]: The five sub-metrics computed from summary + sample
//! - [`score`]: Composite score ([`aggregate`]) and tiers ([`HealthStatus`])
//! - [`history`]: Append-only session log of scores ([`HealthHistory`])
//! - [`pagination`]: Message paging with total-count estimation
//! - [`units`]: Duration parsing and byte-size formatting
//!
//! ## Data Flow
//!
//! ```text
//! NamespaceSummary + [Message]
//!        │
//!        ▼
//! metrics::calculate()  ──▶ HealthMetrics
//!        │
//!        ▼
//! score::aggregate()    ──▶ composite score ──▶ HealthStatus::from_score()
//!        │
//!        └──▶ HealthHistory::record() (session trend)
//! ```

pub mod history;
pub mod metrics;
pub mod pagination;
pub mod score;
pub mod units;

pub use history::HealthHistory;
pub use metrics::{calculate, SampleCoverage};
pub use pagination::{estimate_total, MessagePage, PageRequest, PaginationState};
pub use score::{aggregate, HealthStatus};
