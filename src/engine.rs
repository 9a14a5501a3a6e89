//! Analysis orchestration.
//!
//! [`HealthEngine`] sequences the upstream fetches for one namespace
//! (summary, then a message sample, then the rollup registry), runs the
//! scoring pipeline and keeps the session's history and pagination.
//!
//! ```text
//!            analyze()                  summary + sample ok
//!   Idle ───────────────▶ Loading ─────────────────────────▶ Ready
//!    ▲                       │                                │ │
//!    │ reset()               │ NotFound / UpstreamUnavailable │ │ refresh()
//!    │                       ▼                                │ │ load_message_page()
//!    └──────────────────── Error ◀────────────────────────────┘ ▼
//! ```
//!
//! Operations take `&self` and may overlap. Every `analyze` (and `reset`)
//! bumps a generation counter; a call that finds the counter moved on when
//! its fetch completes returns [`EngineError::Superseded`] and writes
//! nothing, so the newest request always wins. An `analyze` that has
//! already published its score when it is overtaken returns that report
//! without rollups instead.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

use nshealth_types::{
    HealthMetrics, HistoricalHealthPoint, Message, NamespaceSummary, RollupInfo,
};

use crate::data::pagination::{
    self, MessagePage, PageRequest, PaginationState, DEFAULT_PAGE_SIZE,
};
use crate::data::{aggregate, metrics, HealthHistory, HealthStatus, SampleCoverage};
use crate::error::EngineError;
use crate::source::NamespaceSource;

/// Tunables for an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// Size of the message sample fetched by `analyze`.
    pub page_size: u32,
    /// Number of rollup registry entries to fetch.
    pub rollup_limit: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            rollup_limit: 10,
        }
    }
}

/// Lifecycle of the current analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EngineState {
    Idle,
    Loading,
    Ready,
    Error,
}

/// A degraded-but-recovered condition attached to a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// The rollup registry could not be fetched; rollups are empty.
    RollupFetchFailed { message: String },
    /// Some sampled messages lacked a size or version and were left out of
    /// the statistics that need them.
    MalformedSample {
        missing_size: usize,
        missing_version: usize,
    },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::RollupFetchFailed { message } => {
                write!(f, "rollups unavailable: {}", message)
            }
            Notice::MalformedSample {
                missing_size,
                missing_version,
            } => write!(
                f,
                "{} message(s) without size, {} without version excluded from statistics",
                missing_size, missing_version
            ),
        }
    }
}

/// The result of scoring one namespace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub namespace: NamespaceSummary,
    pub score: f64,
    pub status: HealthStatus,
    pub metrics: HealthMetrics,
    /// Session history at the time of this report, oldest first.
    pub history: Vec<HistoricalHealthPoint>,
    pub rollups: Vec<RollupInfo>,
    pub notices: Vec<Notice>,
    /// Number of messages the metrics were computed from.
    pub sample_size: usize,
    pub computed_at: DateTime<Utc>,
}

impl HealthReport {
    /// Whether the report carries any recovered condition.
    pub fn is_degraded(&self) -> bool {
        !self.notices.is_empty()
    }
}

/// Summary and sample the current report was computed from.
#[derive(Debug, Clone)]
struct Session {
    summary: NamespaceSummary,
    sample: Vec<Message>,
}

#[derive(Debug)]
struct Inner {
    generation: u64,
    state: EngineState,
    namespace_id: Option<String>,
    session: Option<Session>,
    report: Option<HealthReport>,
    history: HealthHistory,
    pagination: PaginationState,
    rollups: Vec<RollupInfo>,
    last_error: Option<EngineError>,
}

impl Inner {
    fn new() -> Self {
        Self {
            generation: 0,
            state: EngineState::Idle,
            namespace_id: None,
            session: None,
            report: None,
            history: HealthHistory::new(),
            pagination: PaginationState::new(),
            rollups: Vec::new(),
            last_error: None,
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// Drop the session after a fatal failure. History is kept.
    fn fail(&mut self, err: EngineError) -> EngineError {
        self.state = EngineState::Error;
        self.session = None;
        self.report = None;
        self.rollups.clear();
        self.pagination.reset();
        self.last_error = Some(err.clone());
        err
    }

    /// Score a summary + sample, record it and publish the report.
    fn commit(
        &mut self,
        summary: NamespaceSummary,
        sample: Vec<Message>,
        carried: Vec<Notice>,
    ) -> HealthReport {
        let metrics = metrics::calculate(&summary, &sample);
        let score = aggregate(&metrics);
        let status = HealthStatus::from_score(score);
        self.history.record(score, metrics);

        let mut notices = carried;
        let coverage = SampleCoverage::of(&sample);
        if coverage.is_partial() {
            notices.push(Notice::MalformedSample {
                missing_size: coverage.unsized_count(),
                missing_version: coverage.unversioned_count(),
            });
        }

        let report = HealthReport {
            namespace: summary.clone(),
            score,
            status,
            metrics,
            history: self.history.points().to_vec(),
            rollups: self.rollups.clone(),
            notices,
            sample_size: sample.len(),
            computed_at: Utc::now(),
        };

        self.session = Some(Session { summary, sample });
        self.report = Some(report.clone());
        self.state = EngineState::Ready;
        report
    }
}

/// Scores namespaces and keeps the per-session bookkeeping around them.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use nshealth::{EngineSettings, EngineState, FileSource, Fixture, HealthEngine};
/// use nshealth::types::{Message, NamespaceSummary};
///
/// # tokio_test::block_on(async {
/// let summary = NamespaceSummary::builder("00ab").blobs_count(20).pfb_count(20).build();
/// let fixture = Fixture::new(summary).with_messages(vec![Message::builder(1).build()]);
/// let engine = HealthEngine::new(
///     Arc::new(FileSource::from_fixture(fixture)),
///     EngineSettings::default(),
/// );
///
/// let report = engine.analyze("00ab").await.unwrap();
/// assert_eq!(engine.state(), EngineState::Ready);
/// assert_eq!(report.history.len(), 1);
/// # });
/// ```
#[derive(Debug)]
pub struct HealthEngine {
    source: Arc<dyn NamespaceSource>,
    settings: EngineSettings,
    inner: Mutex<Inner>,
}

impl HealthEngine {
    pub fn new(source: Arc<dyn NamespaceSource>, settings: EngineSettings) -> Self {
        Self {
            source,
            settings,
            inner: Mutex::new(Inner::new()),
        }
    }

    pub fn settings(&self) -> EngineSettings {
        self.settings
    }

    /// Description of the upstream source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Analyze a namespace from scratch.
    ///
    /// Fetches the summary and a first page of messages (both fatal on
    /// failure), scores them and records a history point, then fetches the
    /// rollup registry. A rollup failure leaves the rollups empty and adds a
    /// [`Notice::RollupFetchFailed`] instead of failing the call.
    ///
    /// Analyzing a namespace other than the current one starts a new
    /// history; analyzing the same one again appends to it.
    pub async fn analyze(&self, namespace_id: &str) -> Result<HealthReport, EngineError> {
        let generation = {
            let mut inner = self.inner.lock();
            inner.generation += 1;
            if inner.namespace_id.as_deref() != Some(namespace_id) {
                inner.history.reset();
                inner.namespace_id = Some(namespace_id.to_string());
            }
            inner.state = EngineState::Loading;
            inner.session = None;
            inner.report = None;
            inner.pagination.reset();
            inner.rollups.clear();
            inner.last_error = None;
            inner.generation
        };
        info!(
            namespace_id,
            generation,
            source = self.source.description(),
            "analyzing namespace"
        );

        let fetched = self.source.namespace(namespace_id).await;
        let summary = {
            let mut inner = self.inner.lock();
            if !inner.is_current(generation) {
                return Err(stale(namespace_id, generation));
            }
            match fetched {
                Ok(Some(summary)) => summary,
                Ok(None) => {
                    return Err(inner.fail(EngineError::NotFound(namespace_id.to_string())))
                }
                Err(e) => return Err(inner.fail(e.into())),
            }
        };
        debug!(
            namespace_id,
            blobs = summary.blobs_count,
            pfbs = summary.pfb_count,
            version = summary.version,
            "fetched namespace summary"
        );

        let request = PageRequest::first(self.settings.page_size);
        let fetched =
            pagination::fetch_page(self.source.as_ref(), namespace_id, summary.version, request)
                .await;
        let version = summary.version;
        let scored = {
            let mut inner = self.inner.lock();
            if !inner.is_current(generation) {
                return Err(stale(namespace_id, generation));
            }
            let sample = match fetched {
                Ok(sample) => sample,
                Err(e) => return Err(inner.fail(e.into())),
            };
            inner.pagination.apply(request, sample.clone(), summary.pfb_count);
            inner.commit(summary, sample, Vec::new())
        };
        info!(
            namespace_id,
            score = scored.score,
            status = %scored.status,
            sample = scored.sample_size,
            "namespace scored"
        );

        let fetched = self
            .source
            .rollups(namespace_id, version, 0, self.settings.rollup_limit)
            .await;
        let mut inner = self.inner.lock();
        if !inner.is_current(generation) {
            // The score is already in the history; report it, minus rollups.
            warn!(namespace_id, generation, "analysis overtaken after scoring, dropping rollups");
            return Ok(scored);
        }
        let Some(report) = inner.report.as_mut() else {
            return Err(EngineError::NoSession);
        };
        match fetched {
            Ok(rollups) => {
                debug!(namespace_id, count = rollups.len(), "fetched rollups");
                report.rollups = rollups.clone();
                let report = report.clone();
                inner.rollups = rollups;
                Ok(report)
            }
            Err(e) => {
                warn!(namespace_id, error = %e, "rollup fetch failed, continuing without them");
                report.notices.insert(
                    0,
                    Notice::RollupFetchFailed {
                        message: e.to_string(),
                    },
                );
                Ok(report.clone())
            }
        }
    }

    /// Re-score the current namespace against a freshly fetched summary.
    ///
    /// The cached message sample and rollups are reused; only the summary is
    /// fetched again. Appends a history point. Fails with
    /// [`EngineError::NoSession`] unless the engine is Ready.
    pub async fn refresh(&self) -> Result<HealthReport, EngineError> {
        let (generation, namespace_id) = {
            let inner = self.inner.lock();
            match (&inner.state, &inner.session, &inner.namespace_id) {
                (EngineState::Ready, Some(_), Some(id)) => (inner.generation, id.clone()),
                _ => return Err(EngineError::NoSession),
            }
        };
        debug!(namespace_id = %namespace_id, "refreshing namespace summary");

        let fetched = self.source.namespace(&namespace_id).await;
        let mut inner = self.inner.lock();
        if !inner.is_current(generation) {
            return Err(stale(&namespace_id, generation));
        }
        let summary = match fetched {
            Ok(Some(summary)) => summary,
            Ok(None) => return Err(inner.fail(EngineError::NotFound(namespace_id))),
            Err(e) => return Err(inner.fail(e.into())),
        };

        let Some(session) = inner.session.take() else {
            return Err(EngineError::NoSession);
        };
        let carried: Vec<Notice> = inner
            .report
            .iter()
            .flat_map(|r| r.notices.iter())
            .filter(|n| matches!(n, Notice::RollupFetchFailed { .. }))
            .cloned()
            .collect();

        let report = inner.commit(summary, session.sample, carried);
        info!(
            namespace_id = %namespace_id,
            score = report.score,
            status = %report.status,
            points = report.history.len(),
            "namespace refreshed"
        );
        Ok(report)
    }

    /// Load another page of messages for the current namespace.
    ///
    /// Updates the pagination state only: metrics, history and engine state
    /// are untouched, and an upstream failure is returned to the caller
    /// without moving the engine to Error.
    pub async fn load_message_page(
        &self,
        offset: u64,
        limit: u32,
    ) -> Result<MessagePage, EngineError> {
        let (generation, namespace_id, version) = {
            let inner = self.inner.lock();
            match (&inner.state, &inner.session, &inner.namespace_id) {
                (EngineState::Ready, Some(session), Some(id)) => {
                    (inner.generation, id.clone(), session.summary.version)
                }
                _ => return Err(EngineError::NoSession),
            }
        };

        let request = PageRequest::new(offset, limit);
        let fetched =
            pagination::fetch_page(self.source.as_ref(), &namespace_id, version, request).await;

        let mut inner = self.inner.lock();
        if !inner.is_current(generation) {
            return Err(stale(&namespace_id, generation));
        }
        let messages = fetched.map_err(|e| {
            warn!(namespace_id = %namespace_id, offset, error = %e, "message page fetch failed");
            EngineError::from(e)
        })?;
        let pfb_count = match &inner.session {
            Some(session) => session.summary.pfb_count,
            None => return Err(EngineError::NoSession),
        };
        Ok(inner.pagination.apply(request, messages, pfb_count))
    }

    /// Start over: back to Idle with history, pagination and report cleared.
    ///
    /// Any call still in flight becomes superseded.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        let generation = inner.generation + 1;
        *inner = Inner::new();
        inner.generation = generation;
        info!(generation, "engine reset");
    }

    pub fn state(&self) -> EngineState {
        self.inner.lock().state
    }

    /// The current report, present only while Ready.
    pub fn report(&self) -> Option<HealthReport> {
        self.inner.lock().report.clone()
    }

    /// Snapshot of the session history.
    pub fn history(&self) -> HealthHistory {
        self.inner.lock().history.clone()
    }

    /// Snapshot of the current message page.
    pub fn pagination(&self) -> MessagePage {
        self.inner.lock().pagination.page()
    }

    pub fn rollups(&self) -> Vec<RollupInfo> {
        self.inner.lock().rollups.clone()
    }

    /// The failure that moved the engine to Error, if it is there.
    pub fn last_error(&self) -> Option<EngineError> {
        self.inner.lock().last_error.clone()
    }

    /// The namespace of the current session.
    pub fn namespace_id(&self) -> Option<String> {
        self.inner.lock().namespace_id.clone()
    }
}

fn stale(namespace_id: &str, generation: u64) -> EngineError {
    warn!(namespace_id, generation, "discarding stale result");
    EngineError::Superseded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{FileSource, Fixture};

    const NS: &str = "00000000000000000000000000000000000000000000abcd";
    const HOUR: i64 = 3_600_000;
    const T0: i64 = 1_717_200_000_000;

    fn engine(fixture: Fixture) -> HealthEngine {
        HealthEngine::new(
            Arc::new(FileSource::from_fixture(fixture)),
            EngineSettings::default(),
        )
    }

    fn fixture() -> Fixture {
        let summary = NamespaceSummary::builder(NS)
            .blobs_count(100)
            .pfb_count(50)
            .last_message_time_ms(T0 + 4 * HOUR)
            .build();
        let messages = (0..5)
            .map(|i| {
                Message::builder(i)
                    .time_ms(T0 + i as i64 * HOUR)
                    .size(1024)
                    .version(0)
                    .build()
            })
            .collect();
        Fixture::new(summary).with_messages(messages)
    }

    #[test]
    fn test_new_engine_is_idle() {
        let engine = engine(fixture());
        assert_eq!(engine.state(), EngineState::Idle);
        assert!(engine.report().is_none());
        assert!(engine.history().is_empty());
        assert!(engine.namespace_id().is_none());
        assert_eq!(engine.settings().page_size, DEFAULT_PAGE_SIZE);
    }

    #[tokio::test]
    async fn test_analyze_scores_and_records() {
        let engine = engine(fixture());
        let report = engine.analyze(NS).await.unwrap();

        assert_eq!(engine.state(), EngineState::Ready);
        assert_eq!(report.sample_size, 5);
        assert_eq!(report.metrics.pfb_ratio, 10.0);
        assert_eq!(report.metrics.message_frequency, 10.0);
        assert_eq!(report.metrics.size_stability, 10.0);
        assert_eq!(report.metrics.version_consistency, 9.0);
        assert_eq!(report.status, HealthStatus::from_score(report.score));
        assert!(report.notices.is_empty());
        assert_eq!(engine.history().len(), 1);
        assert_eq!(engine.pagination().estimated_total, 5);
        assert_eq!(engine.namespace_id().as_deref(), Some(NS));
    }

    #[tokio::test]
    async fn test_partial_sample_adds_notice() {
        let mut fx = fixture();
        fx.messages.push(Message::builder(9).time_ms(T0 + 5 * HOUR).build());
        let engine = engine(fx);

        let report = engine.analyze(NS).await.unwrap();
        assert_eq!(
            report.notices,
            vec![Notice::MalformedSample {
                missing_size: 1,
                missing_version: 1
            }]
        );
        assert!(report.is_degraded());
    }

    #[tokio::test]
    async fn test_unknown_namespace_is_not_found() {
        let engine = engine(fixture());
        let err = engine.analyze("ffff").await.unwrap_err();

        assert_eq!(err, EngineError::NotFound("ffff".to_string()));
        assert_eq!(engine.state(), EngineState::Error);
        assert_eq!(engine.last_error(), Some(err));
        assert!(engine.report().is_none());
    }

    #[tokio::test]
    async fn test_operations_need_a_session() {
        let engine = engine(fixture());
        assert_eq!(engine.refresh().await.unwrap_err(), EngineError::NoSession);
        assert_eq!(
            engine.load_message_page(0, 10).await.unwrap_err(),
            EngineError::NoSession
        );
    }

    #[tokio::test]
    async fn test_reset_returns_to_idle() {
        let engine = engine(fixture());
        engine.analyze(NS).await.unwrap();
        engine.reset();

        assert_eq!(engine.state(), EngineState::Idle);
        assert!(engine.history().is_empty());
        assert!(engine.report().is_none());
        assert_eq!(engine.pagination(), PaginationState::new().page());
    }
}
