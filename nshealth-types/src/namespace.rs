//! Namespace summary - the indexer's aggregate view of one namespace.

use chrono::{DateTime, Utc};

/// Aggregate counters for a namespace, as reported by the indexer.
///
/// A summary is fetched once per analysis (and again on refresh) and is
/// never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NamespaceSummary {
    /// Indexer-internal row id.
    #[cfg_attr(feature = "serde", serde(default))]
    pub id: u64,

    /// Fixed-length hex identifier of the namespace.
    pub namespace_id: String,

    /// Human-readable name (may be empty).
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,

    /// Total payload size posted to the namespace, in bytes.
    #[cfg_attr(feature = "serde", serde(default))]
    pub size: u64,

    /// Cumulative number of blobs posted.
    #[cfg_attr(feature = "serde", serde(default))]
    pub blobs_count: u64,

    /// Cumulative number of PayForBlob submissions.
    #[cfg_attr(feature = "serde", serde(default))]
    pub pfb_count: u64,

    /// Block height of the most recent activity.
    #[cfg_attr(feature = "serde", serde(default))]
    pub last_height: u64,

    /// Timestamp of the most recent activity.
    pub last_message_time: DateTime<Utc>,

    /// Namespace version tag.
    #[cfg_attr(feature = "serde", serde(default))]
    pub version: u32,

    /// Whether the namespace is reserved by the protocol.
    #[cfg_attr(feature = "serde", serde(default))]
    pub reserved: bool,

    #[cfg_attr(feature = "serde", serde(default))]
    pub hash: String,
}

impl NamespaceSummary {
    /// Create a builder for a summary of the given namespace.
    pub fn builder(namespace_id: impl Into<String>) -> NamespaceSummaryBuilder {
        NamespaceSummaryBuilder::new(namespace_id)
    }

    /// Name to show for this namespace, falling back to the hex id.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.namespace_id
        } else {
            &self.name
        }
    }

    /// Average number of blobs per PayForBlob submission.
    ///
    /// Returns `None` when no submissions have been recorded.
    pub fn blobs_per_pfb(&self) -> Option<f64> {
        if self.pfb_count == 0 {
            None
        } else {
            Some(self.blobs_count as f64 / self.pfb_count as f64)
        }
    }
}

/// Builder for `NamespaceSummary`.
#[derive(Debug)]
pub struct NamespaceSummaryBuilder {
    summary: NamespaceSummary,
}

impl NamespaceSummaryBuilder {
    /// Create a new builder with zeroed counters.
    pub fn new(namespace_id: impl Into<String>) -> Self {
        Self {
            summary: NamespaceSummary {
                namespace_id: namespace_id.into(),
                ..Default::default()
            },
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.summary.name = name.into();
        self
    }

    /// Set the total payload size in bytes.
    pub fn size(mut self, size: u64) -> Self {
        self.summary.size = size;
        self
    }

    pub fn blobs_count(mut self, count: u64) -> Self {
        self.summary.blobs_count = count;
        self
    }

    pub fn pfb_count(mut self, count: u64) -> Self {
        self.summary.pfb_count = count;
        self
    }

    pub fn last_height(mut self, height: u64) -> Self {
        self.summary.last_height = height;
        self
    }

    /// Set the last activity time.
    pub fn last_message_time(mut self, time: DateTime<Utc>) -> Self {
        self.summary.last_message_time = time;
        self
    }

    /// Set the last activity time from milliseconds since the Unix epoch.
    pub fn last_message_time_ms(self, millis: i64) -> Self {
        self.last_message_time(DateTime::from_timestamp_millis(millis).unwrap_or_default())
    }

    pub fn version(mut self, version: u32) -> Self {
        self.summary.version = version;
        self
    }

    pub fn reserved(mut self, reserved: bool) -> Self {
        self.summary.reserved = reserved;
        self
    }

    /// Build the summary.
    pub fn build(self) -> NamespaceSummary {
        self.summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_falls_back_to_id() {
        let unnamed = NamespaceSummary::builder("00ff").build();
        assert_eq!(unnamed.display_name(), "00ff");

        let named = NamespaceSummary::builder("00ff").name("rollup-a").build();
        assert_eq!(named.display_name(), "rollup-a");
    }

    #[test]
    fn blobs_per_pfb_requires_submissions() {
        let empty = NamespaceSummary::builder("00").blobs_count(10).build();
        assert_eq!(empty.blobs_per_pfb(), None);

        let busy = NamespaceSummary::builder("00")
            .blobs_count(100)
            .pfb_count(50)
            .build();
        assert_eq!(busy.blobs_per_pfb(), Some(2.0));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize_indexer_payload() {
        let json = r#"{
            "id": 42,
            "size": 1048576,
            "blobs_count": 300,
            "version": 0,
            "namespace_id": "0000000000000000000000000000000000000000736f76",
            "hash": "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAABzb3Y=",
            "pfb_count": 250,
            "last_height": 1864021,
            "last_message_time": "2024-06-01T12:00:00Z",
            "name": "sov",
            "reserved": false
        }"#;

        let summary: NamespaceSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.blobs_count, 300);
        assert_eq!(summary.pfb_count, 250);
        assert_eq!(summary.last_message_time.timestamp(), 1_717_243_200);
        assert_eq!(summary.display_name(), "sov");
    }
}
