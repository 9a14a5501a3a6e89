//! Composite score and status tiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use nshealth_types::{clamp_score, HealthMetrics};

/// Combine the five sub-metrics into one score in `[0, 10]`.
///
/// Unweighted mean, rounded to one decimal place.
pub fn aggregate(metrics: &HealthMetrics) -> f64 {
    let values = metrics.values();
    let mean = values.iter().map(|v| clamp_score(*v)).sum::<f64>() / values.len() as f64;
    clamp_score((mean * 10.0).round() / 10.0)
}

/// Health tier for a composite score.
///
/// Ordered from worst to best so tiers compare naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HealthStatus {
    Critical,
    Poor,
    Fair,
    Good,
    Excellent,
}

impl HealthStatus {
    /// All tiers, worst first.
    pub const ALL: [HealthStatus; 5] = [
        HealthStatus::Critical,
        HealthStatus::Poor,
        HealthStatus::Fair,
        HealthStatus::Good,
        HealthStatus::Excellent,
    ];

    /// Classify a composite score. A score on a boundary belongs to the
    /// higher tier; NaN is Critical.
    pub fn from_score(score: f64) -> Self {
        if score >= 8.0 {
            HealthStatus::Excellent
        } else if score >= 6.0 {
            HealthStatus::Good
        } else if score >= 4.0 {
            HealthStatus::Fair
        } else if score >= 2.0 {
            HealthStatus::Poor
        } else {
            HealthStatus::Critical
        }
    }

    /// Lowest score that maps to this tier.
    pub fn lower_bound(&self) -> f64 {
        match self {
            HealthStatus::Excellent => 8.0,
            HealthStatus::Good => 6.0,
            HealthStatus::Fair => 4.0,
            HealthStatus::Poor => 2.0,
            HealthStatus::Critical => 0.0,
        }
    }

    /// Returns the display label.
    pub fn label(&self) -> &'static str {
        match self {
            HealthStatus::Excellent => "Excellent",
            HealthStatus::Good => "Good",
            HealthStatus::Fair => "Fair",
            HealthStatus::Poor => "Poor",
            HealthStatus::Critical => "Critical",
        }
    }

    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            HealthStatus::Excellent => "A",
            HealthStatus::Good => "B",
            HealthStatus::Fair => "C",
            HealthStatus::Poor => "D",
            HealthStatus::Critical => "F",
        }
    }

    /// Hex colour used by dashboards for this tier.
    pub fn color(&self) -> &'static str {
        match self {
            HealthStatus::Excellent => "#4CAF50",
            HealthStatus::Good => "#8BC34A",
            HealthStatus::Fair => "#FFC107",
            HealthStatus::Poor => "#FF9800",
            HealthStatus::Critical => "#F44336",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
