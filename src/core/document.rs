use bytes::Bytes;
use serde_json::Value;

use crate::error::{GcdbError, Result};
use crate::storage::format::RecordHeader;

/// A record decoded from the data file.
///
/// `offset` addresses the record header, not the payload; `next_offset` is
/// where the following record begins, so a caller can resume a scan from an
/// emitted document.
#[derive(Debug, Clone)]
pub struct Document {
    pub payload: Bytes,
    pub offset: u32,
    pub next_offset: u32,
    tombstone: bool,
    stamp: u64,
}

impl Document {
    pub(crate) fn from_parts(
        payload: Bytes,
        offset: u32,
        next_offset: u32,
        header: RecordHeader,
    ) -> Self {
        Self {
            payload,
            offset,
            next_offset,
            tombstone: header.tombstone,
            stamp: header.stamp,
        }
    }

    pub fn is_tombstoned(&self) -> bool {
        self.tombstone
    }

    /// Whether a scan holding `snapshot_version` should emit this record.
    ///
    /// A tombstoned record carries the pre-increment counter value as its
    /// stamp, so `stamp < snapshot_version` exactly means the deletion
    /// happened before the snapshot was taken.
    pub(crate) fn visible_at(&self, snapshot_version: u64) -> bool {
        !self.tombstone || self.stamp >= snapshot_version
    }

    /// The embedded `_id` of this document's payload.
    pub fn id(&self) -> Result<i64> {
        document_id(&self.payload)
    }
}

/// Extract the integer `_id` field every stored document must carry.
pub fn document_id(payload: &[u8]) -> Result<i64> {
    let value: Value = serde_json::from_slice(payload)?;
    value
        .get("_id")
        .and_then(Value::as_i64)
        .ok_or(GcdbError::MissingId)
}
