//! Sub-metric computation from a namespace summary and a message sample.
//!
//! The sample is whatever page of messages the caller has at hand, not the
//! namespace's full history. Every sub-metric is clamped into `[0, 10]`.
//! Messages missing a field are left out of the statistic that needs it,
//! never counted as zero.

use std::collections::BTreeSet;

use nshealth_types::{clamp_score, HealthMetrics, Message, NamespaceSummary, SCORE_MAX};

const MS_PER_HOUR: f64 = 60.0 * 60.0 * 1000.0;
const MS_PER_DAY: f64 = 24.0 * MS_PER_HOUR;

/// Blobs per day that earns a full activity score.
pub const BASELINE_BLOBS_PER_DAY: f64 = 5.0;

/// Time constant of the cadence decay: a gap deviation of one hour
/// scores `10 / e`.
pub const FREQUENCY_DECAY_MS: f64 = MS_PER_HOUR;

/// How much of a sample was usable for each per-message statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SampleCoverage {
    pub messages: usize,
    /// Messages that declared a size.
    pub sized: usize,
    /// Messages that declared a version.
    pub versioned: usize,
}

impl SampleCoverage {
    /// Measure a sample.
    pub fn of(messages: &[Message]) -> Self {
        Self {
            messages: messages.len(),
            sized: messages.iter().filter(|m| m.size.is_some()).count(),
            versioned: messages.iter().filter(|m| m.version.is_some()).count(),
        }
    }

    pub fn unsized_count(&self) -> usize {
        self.messages - self.sized
    }

    pub fn unversioned_count(&self) -> usize {
        self.messages - self.versioned
    }

    /// Whether any message had to be excluded from a statistic.
    pub fn is_partial(&self) -> bool {
        self.sized < self.messages || self.versioned < self.messages
    }
}

/// Compute all five sub-metrics.
pub fn calculate(summary: &NamespaceSummary, messages: &[Message]) -> HealthMetrics {
    HealthMetrics::new(
        pfb_ratio(summary),
        activity_ratio(summary, messages),
        message_frequency(messages),
        version_consistency(messages),
        size_stability(messages),
    )
}

/// Blobs per submission, scaled so one blob per PFB or better saturates.
///
/// Zero submissions score 0.
pub fn pfb_ratio(summary: &NamespaceSummary) -> f64 {
    match summary.blobs_per_pfb() {
        Some(ratio) => clamp_score(ratio * SCORE_MAX),
        None => 0.0,
    }
}

/// Blob throughput between the oldest sampled message and the namespace's
/// last activity, against [`BASELINE_BLOBS_PER_DAY`].
pub fn activity_ratio(summary: &NamespaceSummary, messages: &[Message]) -> f64 {
    let Some(first_ms) = messages.iter().map(Message::timestamp_ms).min() else {
        return 0.0;
    };

    let last_ms = summary.last_message_time.timestamp_millis();
    let span_days = (last_ms - first_ms) as f64 / MS_PER_DAY;
    if span_days <= 0.0 {
        return 0.0;
    }

    let per_day = summary.blobs_count as f64 / span_days;
    clamp_score(per_day / BASELINE_BLOBS_PER_DAY * SCORE_MAX)
}

/// Regularity of posting cadence.
///
/// Fewer than two messages means no gaps to judge, which scores the maximum.
pub fn message_frequency(messages: &[Message]) -> f64 {
    let mut times: Vec<i64> = messages.iter().map(Message::timestamp_ms).collect();
    times.sort_unstable();

    let gaps: Vec<f64> = times.windows(2).map(|w| (w[1] - w[0]) as f64).collect();

    match std_dev(&gaps) {
        Some(sd) if sd > 0.0 => clamp_score(SCORE_MAX * (-sd / FREQUENCY_DECAY_MS).exp()),
        _ => SCORE_MAX,
    }
}

/// 10 minus the number of distinct declared versions.
pub fn version_consistency(messages: &[Message]) -> f64 {
    let distinct: BTreeSet<u32> = messages.iter().filter_map(|m| m.version).collect();
    clamp_score(SCORE_MAX - distinct.len() as f64)
}

/// 10 minus ten times the coefficient of variation of declared sizes.
///
/// No sized messages, or a mean size of zero, scores 0.
pub fn size_stability(messages: &[Message]) -> f64 {
    let sizes: Vec<f64> = messages.iter().filter_map(|m| m.size).map(|s| s as f64).collect();

    let Some(avg) = mean(&sizes) else {
        return 0.0;
    };
    if avg <= 0.0 {
        return 0.0;
    }

    match std_dev(&sizes) {
        Some(sd) => clamp_score(SCORE_MAX - (sd / avg) * SCORE_MAX),
        None => 0.0,
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Population standard deviation.
fn std_dev(values: &[f64]) -> Option<f64> {
    let avg = mean(values)?;
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: i64 = 3_600_000;
    const DAY: i64 = 24 * HOUR;
    const T0: i64 = 1_717_200_000_000;

    fn summary(blobs: u64, pfbs: u64, last_ms: i64) -> NamespaceSummary {
        NamespaceSummary::builder("00")
            .blobs_count(blobs)
            .pfb_count(pfbs)
            .last_message_time_ms(last_ms)
            .build()
    }

    fn msg_at(id: u64, ms: i64) -> Message {
        Message::builder(id).time_ms(ms).build()
    }

    #[test]
    fn test_empty_sample_defaults() {
        let s = summary(100, 80, T0);
        let m = calculate(&s, &[]);

        assert_eq!(m.message_frequency, 10.0);
        assert_eq!(m.activity_ratio, 0.0);
        assert_eq!(m.size_stability, 0.0);
        assert_eq!(m.version_consistency, 10.0);
        assert_eq!(m.pfb_ratio, 10.0);
    }

    #[test]
    fn test_pfb_ratio_saturates() {
        assert_eq!(pfb_ratio(&summary(100, 50, T0)), 10.0);
        assert_eq!(pfb_ratio(&summary(100, 100, T0)), 10.0);
        assert_eq!(pfb_ratio(&summary(0, 0, T0)), 0.0);
        assert_eq!(pfb_ratio(&summary(100, 0, T0)), 0.0);
    }

    #[test]
    fn test_pfb_ratio_below_one_blob_per_submission() {
        let r = pfb_ratio(&summary(25, 100, T0));
        assert!((r - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_activity_ratio_baseline() {
        // 50 blobs over 10 days = 5/day = full score
        let s = summary(50, 50, T0 + 10 * DAY);
        assert!((activity_ratio(&s, &[msg_at(1, T0)]) - 10.0).abs() < 1e-9);

        // 10 blobs over 10 days = 1/day
        let s = summary(10, 10, T0 + 10 * DAY);
        assert!((activity_ratio(&s, &[msg_at(1, T0)]) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_activity_ratio_uses_oldest_message() {
        let s = summary(20, 20, T0 + 4 * DAY);
        let sample = [msg_at(2, T0 + 2 * DAY), msg_at(1, T0), msg_at(3, T0 + 3 * DAY)];
        // 20 blobs over 4 days = 5/day
        assert!((activity_ratio(&s, &sample) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_activity_ratio_zero_or_negative_span() {
        let s = summary(100, 100, T0);
        assert_eq!(activity_ratio(&s, &[msg_at(1, T0)]), 0.0);
        assert_eq!(activity_ratio(&s, &[msg_at(1, T0 + HOUR)]), 0.0);
    }

    #[test]
    fn test_constant_gaps_score_maximum() {
        let sample: Vec<Message> = (0..5).map(|i| msg_at(i, T0 + i as i64 * HOUR)).collect();
        assert_eq!(message_frequency(&sample), 10.0);
    }

    #[test]
    fn test_frequency_ignores_sample_order() {
        let ordered: Vec<Message> = [0, HOUR, 3 * HOUR, 4 * HOUR]
            .iter()
            .enumerate()
            .map(|(i, off)| msg_at(i as u64, T0 + off))
            .collect();
        let mut reversed = ordered.clone();
        reversed.reverse();

        assert_eq!(message_frequency(&ordered), message_frequency(&reversed));
    }

    #[test]
    fn test_irregular_gaps_decay() {
        // gaps 1h and 3h: sd = 1h, score = 10/e
        let sample = [msg_at(1, T0), msg_at(2, T0 + HOUR), msg_at(3, T0 + 4 * HOUR)];
        let score = message_frequency(&sample);
        assert!((score - 10.0 / std::f64::consts::E).abs() < 1e-9);
    }

    #[test]
    fn test_single_message_frequency() {
        assert_eq!(message_frequency(&[msg_at(1, T0)]), 10.0);
    }

    #[test]
    fn test_version_consistency_counts_distinct() {
        let sample = [
            Message::builder(1).version(0).build(),
            Message::builder(2).version(0).build(),
            Message::builder(3).version(1).build(),
            Message::builder(4).build(),
        ];
        assert_eq!(version_consistency(&sample), 8.0);
    }

    #[test]
    fn test_version_consistency_floors_at_zero() {
        let sample: Vec<Message> = (0..12)
            .map(|v| Message::builder(v).version(v as u32).build())
            .collect();
        assert_eq!(version_consistency(&sample), 0.0);
    }

    #[test]
    fn test_size_stability_uniform_sizes() {
        let sample: Vec<Message> = (0..4)
            .map(|i| Message::builder(i).size(512).build())
            .collect();
        assert_eq!(size_stability(&sample), 10.0);
    }

    #[test]
    fn test_size_stability_excludes_unsized() {
        let with_gaps = [
            Message::builder(1).size(100).build(),
            Message::builder(2).build(),
            Message::builder(3).size(300).build(),
        ];
        // sizes 100, 300: mean 200, sd 100, cv 0.5
        assert!((size_stability(&with_gaps) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_size_stability_undefined_cases() {
        assert_eq!(size_stability(&[Message::builder(1).build()]), 0.0);
        assert_eq!(size_stability(&[Message::builder(1).size(0).build()]), 0.0);
    }

    #[test]
    fn test_size_stability_floors_at_zero() {
        let sample = [
            Message::builder(1).size(1).build(),
            Message::builder(2).size(1).build(),
            Message::builder(3).size(1).build(),
            Message::builder(4).size(10_000).build(),
        ];
        assert_eq!(size_stability(&sample), 0.0);
    }

    #[test]
    fn test_all_metrics_within_bounds() {
        let s = summary(1_000_000, 1, T0 + 1);
        let sample = [
            Message::builder(1).time_ms(T0).size(1).version(0).build(),
            Message::builder(2).time_ms(T0 + 90 * DAY).size(9_999).version(7).build(),
        ];
        for (label, value) in calculate(&s, &sample).iter() {
            assert!((0.0..=10.0).contains(&value), "{label} out of range: {value}");
        }
    }

    #[test]
    fn test_sample_coverage() {
        let sample = [
            Message::builder(1).size(10).version(0).build(),
            Message::builder(2).size(10).build(),
            Message::builder(3).build(),
        ];
        let coverage = SampleCoverage::of(&sample);
        assert_eq!(coverage.messages, 3);
        assert_eq!(coverage.unsized_count(), 1);
        assert_eq!(coverage.unversioned_count(), 2);
        assert!(coverage.is_partial());
        assert!(!SampleCoverage::of(&[]).is_partial());
    }
}
