//! Message records - individual PayForBlob activity within a namespace.

use chrono::{DateTime, Utc};

/// A single message posted to a namespace.
///
/// Everything beyond id, height, time and type is optional: the indexer
/// omits payload, transaction, size and version details for some message
/// kinds, and consumers are expected to skip such records in the statistics
/// that need them rather than treat the gap as zero.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    pub id: u64,

    /// Block height the message was included at.
    pub height: u64,

    /// Block time the message was included at.
    pub time: DateTime<Utc>,

    /// Message type, e.g. `MsgPayForBlobs`.
    #[cfg_attr(feature = "serde", serde(rename = "type", default))]
    pub msg_type: String,

    /// Blob payload details.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub data: Option<PayloadMeta>,

    /// Enclosing transaction details.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub tx: Option<TxMeta>,

    /// Declared blob size in bytes.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub size: Option<u64>,

    /// Declared share version.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub version: Option<u32>,
}

impl Message {
    /// Create a builder for a message with the given id.
    pub fn builder(id: u64) -> MessageBuilder {
        MessageBuilder::new(id)
    }

    /// Inclusion time in milliseconds since the Unix epoch.
    pub fn timestamp_ms(&self) -> i64 {
        self.time.timestamp_millis()
    }

    /// Total bytes across all blobs carried by this message, if known.
    pub fn blob_bytes(&self) -> Option<u64> {
        self.data
            .as_ref()
            .filter(|d| !d.blob_sizes.is_empty())
            .map(|d| d.blob_sizes.iter().sum())
    }

    /// Returns false only when the transaction is known to have failed.
    pub fn is_successful(&self) -> bool {
        self.tx
            .as_ref()
            .and_then(|tx| tx.status.as_deref())
            .map_or(true, |status| status.eq_ignore_ascii_case("success"))
    }
}

/// Blob payload metadata attached to a PayForBlob message.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PayloadMeta {
    #[cfg_attr(
        feature = "serde",
        serde(rename = "BlobSizes", default, deserialize_with = "crate::null_as_default")
    )]
    pub blob_sizes: Vec<u64>,

    #[cfg_attr(
        feature = "serde",
        serde(rename = "ShareCommitments", default, deserialize_with = "crate::null_as_default")
    )]
    pub share_commitments: Vec<String>,

    #[cfg_attr(
        feature = "serde",
        serde(rename = "ShareVersions", default, deserialize_with = "crate::null_as_default")
    )]
    pub share_versions: Vec<u32>,

    #[cfg_attr(feature = "serde", serde(rename = "Signer", default))]
    pub signer: Option<String>,
}

/// Transaction metadata for the transaction that carried a message.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TxMeta {
    #[cfg_attr(feature = "serde", serde(default))]
    pub status: Option<String>,

    #[cfg_attr(feature = "serde", serde(default))]
    pub gas_used: Option<u64>,

    #[cfg_attr(feature = "serde", serde(default))]
    pub gas_wanted: Option<u64>,

    /// Fee as a decimal string in the chain's base denomination.
    #[cfg_attr(feature = "serde", serde(default))]
    pub fee: Option<String>,

    #[cfg_attr(feature = "serde", serde(default))]
    pub hash: Option<String>,
}

/// Builder for `Message`.
#[derive(Debug)]
pub struct MessageBuilder {
    message: Message,
}

impl MessageBuilder {
    /// Create a new builder for a `MsgPayForBlobs` message.
    pub fn new(id: u64) -> Self {
        Self {
            message: Message {
                id,
                msg_type: "MsgPayForBlobs".to_string(),
                ..Default::default()
            },
        }
    }

    pub fn height(mut self, height: u64) -> Self {
        self.message.height = height;
        self
    }

    /// Set the inclusion time.
    pub fn time(mut self, time: DateTime<Utc>) -> Self {
        self.message.time = time;
        self
    }

    /// Set the inclusion time from milliseconds since the Unix epoch.
    pub fn time_ms(self, millis: i64) -> Self {
        self.time(DateTime::from_timestamp_millis(millis).unwrap_or_default())
    }

    pub fn msg_type(mut self, msg_type: impl Into<String>) -> Self {
        self.message.msg_type = msg_type.into();
        self
    }

    /// Set the declared size in bytes.
    pub fn size(mut self, size: u64) -> Self {
        self.message.size = Some(size);
        self
    }

    /// Set the declared share version.
    pub fn version(mut self, version: u32) -> Self {
        self.message.version = Some(version);
        self
    }

    /// Attach blob sizes (creates payload metadata if absent).
    pub fn blob_sizes(mut self, sizes: impl IntoIterator<Item = u64>) -> Self {
        let data = self.message.data.get_or_insert_with(PayloadMeta::default);
        data.blob_sizes = sizes.into_iter().collect();
        self
    }

    /// Attach a transaction status (creates transaction metadata if absent).
    pub fn tx_status(mut self, status: impl Into<String>) -> Self {
        let tx = self.message.tx.get_or_insert_with(TxMeta::default);
        tx.status = Some(status.into());
        self
    }

    /// Build the message.
    pub fn build(self) -> Message {
        self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_leaves_optional_fields_absent() {
        let msg = Message::builder(7).height(10).time_ms(1_000).build();
        assert_eq!(msg.msg_type, "MsgPayForBlobs");
        assert_eq!(msg.timestamp_ms(), 1_000);
        assert!(msg.size.is_none());
        assert!(msg.version.is_none());
        assert!(msg.data.is_none());
        assert!(msg.tx.is_none());
    }

    #[test]
    fn blob_bytes_sums_payload_sizes() {
        let msg = Message::builder(1).blob_sizes([100, 250]).build();
        assert_eq!(msg.blob_bytes(), Some(350));

        let bare = Message::builder(2).build();
        assert_eq!(bare.blob_bytes(), None);
    }

    #[test]
    fn unknown_status_counts_as_successful() {
        assert!(Message::builder(1).build().is_successful());
        assert!(Message::builder(1).tx_status("success").build().is_successful());
        assert!(!Message::builder(1).tx_status("failed").build().is_successful());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize_partial_indexer_record() {
        let json = r#"{
            "id": 9001,
            "height": 1864000,
            "time": "2024-06-01T11:00:00Z",
            "position": 3,
            "type": "MsgPayForBlobs",
            "data": {
                "BlobSizes": [512, 1024],
                "Namespaces": ["AAAAAAAAAAAAAAAAAAAAAAAAAAAAAABzb3Y="],
                "Signer": "celestia1xyz"
            },
            "tx": {
                "id": 1,
                "status": "success",
                "gas_used": 80000,
                "gas_wanted": 100000,
                "fee": "2000",
                "hash": "ABCD"
            },
            "namespace": { "namespace_id": "736f76" }
        }"#;

        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.msg_type, "MsgPayForBlobs");
        assert_eq!(msg.blob_bytes(), Some(1536));
        assert_eq!(msg.tx.as_ref().and_then(|t| t.gas_used), Some(80000));
        assert!(msg.size.is_none());
        assert!(msg.version.is_none());
    }
}
