//! Health breakdown types produced by the scoring engine.

use chrono::{DateTime, Utc};

use crate::{SCORE_MAX, SCORE_MIN};

/// The five sub-metrics that make up a namespace health score.
///
/// Every field lies in `[0, 10]`. A fresh value is produced on every
/// computation; the engine never adjusts one in place.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct HealthMetrics {
    /// Blobs committed per PayForBlob submission.
    pub pfb_ratio: f64,

    /// Blob throughput relative to a baseline daily cadence.
    pub activity_ratio: f64,

    /// Regularity of the gaps between consecutive messages.
    pub message_frequency: f64,

    /// Penalty for mixing share versions.
    pub version_consistency: f64,

    /// Penalty for widely varying blob sizes.
    pub size_stability: f64,
}

impl HealthMetrics {
    /// Display labels, in the same order as [`HealthMetrics::values`].
    pub const LABELS: [&'static str; 5] = [
        "PFB Ratio",
        "Activity",
        "Message Frequency",
        "Version Consistency",
        "Size Stability",
    ];

    /// Create metrics from raw values, clamping each into `[0, 10]`.
    pub fn new(
        pfb_ratio: f64,
        activity_ratio: f64,
        message_frequency: f64,
        version_consistency: f64,
        size_stability: f64,
    ) -> Self {
        Self {
            pfb_ratio: clamp_score(pfb_ratio),
            activity_ratio: clamp_score(activity_ratio),
            message_frequency: clamp_score(message_frequency),
            version_consistency: clamp_score(version_consistency),
            size_stability: clamp_score(size_stability),
        }
    }

    /// The five values in declaration order.
    pub fn values(&self) -> [f64; 5] {
        [
            self.pfb_ratio,
            self.activity_ratio,
            self.message_frequency,
            self.version_consistency,
            self.size_stability,
        ]
    }

    /// Iterate over `(label, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> {
        Self::LABELS.into_iter().zip(self.values())
    }
}

/// Clamp a score into `[0, 10]`, mapping non-finite values to 0.
pub fn clamp_score(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(SCORE_MIN, SCORE_MAX)
    } else {
        SCORE_MIN
    }
}

/// One entry of the per-session health log.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct HistoricalHealthPoint {
    /// When the score was computed.
    pub timestamp: DateTime<Utc>,

    /// Composite score at that time.
    pub health_score: f64,

    /// Breakdown that produced the score.
    pub metrics: HealthMetrics,
}
