//! Session health history for trend display.

use chrono::{DateTime, Utc};

use nshealth_types::{HealthMetrics, HistoricalHealthPoint};

/// Append-only log of health scores for the namespace under analysis.
///
/// Every computation is recorded, including ones identical to the previous
/// point: the log is a session trend, not a change log. It only shrinks on
/// [`HealthHistory::reset`].
#[derive(Debug, Clone, Default)]
pub struct HealthHistory {
    points: Vec<HistoricalHealthPoint>,
}

impl HealthHistory {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a score computed now.
    pub fn record(&mut self, score: f64, metrics: HealthMetrics) -> &HistoricalHealthPoint {
        self.record_at(Utc::now(), score, metrics)
    }

    /// Record a score computed at a specific time.
    pub fn record_at(
        &mut self,
        timestamp: DateTime<Utc>,
        score: f64,
        metrics: HealthMetrics,
    ) -> &HistoricalHealthPoint {
        self.points.push(HistoricalHealthPoint {
            timestamp,
            health_score: score,
            metrics,
        });
        &self.points[self.points.len() - 1]
    }

    /// Drop all points (new namespace or explicit start-over).
    pub fn reset(&mut self) {
        self.points.clear();
    }

    /// Points in insertion order.
    pub fn points(&self) -> &[HistoricalHealthPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The most recent point.
    pub fn latest(&self) -> Option<&HistoricalHealthPoint> {
        self.points.last()
    }

    /// Score change between the two most recent points.
    ///
    /// Returns None if there's not enough history.
    pub fn trend(&self) -> Option<f64> {
        let [.., previous, current] = self.points.as_slice() else {
            return None;
        };
        Some(current.health_score - previous.health_score)
    }

    /// Get sparkline data for scores (normalized to 0-7 for 8 bar levels).
    ///
    /// One bar per point, scaled over the min..max of the absolute scores.
    /// Returns an empty Vec if there's no history.
    pub fn sparkline(&self) -> Vec<u8> {
        if self.points.is_empty() {
            return Vec::new();
        }

        let scores: Vec<f64> = self.points.iter().map(|p| p.health_score).collect();
        let max = scores.iter().copied().fold(f64::MIN, f64::max);
        let min = scores.iter().copied().fold(f64::MAX, f64::min);
        let range = max - min;

        scores
            .iter()
            .map(|&v| {
                if range <= f64::EPSILON {
                    // Flat history sits at the level of its absolute score.
                    ((v / 10.0) * 7.0).round().clamp(0.0, 7.0) as u8
                } else {
                    (((v - min) / range) * 7.0).round().clamp(0.0, 7.0) as u8
                }
            })
            .collect()
    }
}
