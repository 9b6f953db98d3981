//! Binary codec for the data file header and record headers.
//!
//! All multi-byte integers are big-endian. The codec is pure: it never
//! touches the mapping, only fixed-size byte buffers.

use crate::constants::*;

pub const TOMBSTONE_LIVE: u8 = 0;
pub const TOMBSTONE_DELETED: u8 = 1;

const SENTINEL_FRESH: u8 = 0;
const SENTINEL_INITIALIZED: u8 = 1;

/// The 13-byte header at the start of the data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub initialized: bool,
    pub write_offset: u32,
    pub version: u64,
}

impl FileHeader {
    /// Header written to a freshly grown file.
    pub fn fresh() -> Self {
        Self {
            initialized: true,
            write_offset: DATA_START,
            version: 1,
        }
    }

    pub fn serialize(&self) -> [u8; FILE_HEADER_SIZE] {
        let mut buf = [0u8; FILE_HEADER_SIZE];
        buf[INIT_SENTINEL_AT as usize] = if self.initialized {
            SENTINEL_INITIALIZED
        } else {
            SENTINEL_FRESH
        };
        buf[WRITE_OFFSET_AT as usize..VERSION_AT as usize]
            .copy_from_slice(&self.write_offset.to_be_bytes());
        buf[VERSION_AT as usize..].copy_from_slice(&self.version.to_be_bytes());
        buf
    }

    pub fn parse(buf: &[u8]) -> Option<Self> {
        if buf.len() < FILE_HEADER_SIZE {
            return None;
        }
        let write_offset = u32::from_be_bytes(
            buf[WRITE_OFFSET_AT as usize..VERSION_AT as usize]
                .try_into()
                .ok()?,
        );
        let version = u64::from_be_bytes(
            buf[VERSION_AT as usize..FILE_HEADER_SIZE].try_into().ok()?,
        );
        Some(Self {
            initialized: buf[INIT_SENTINEL_AT as usize] != SENTINEL_FRESH,
            write_offset,
            version,
        })
    }
}

/// The 13-byte header preceding each record's payload.
///
/// `stamp` holds the file version counter as sampled at deletion time and
/// is zero while the record is live. The payload length is immutable once
/// written; only the tombstone byte and stamp are ever rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub tombstone: bool,
    pub stamp: u64,
    pub payload_len: u32,
}

impl RecordHeader {
    pub fn live(payload_len: u32) -> Self {
        Self {
            tombstone: false,
            stamp: 0,
            payload_len,
        }
    }

    pub fn serialize(&self) -> [u8; RECORD_HEADER_SIZE] {
        let mut buf = [0u8; RECORD_HEADER_SIZE];
        buf[0] = if self.tombstone {
            TOMBSTONE_DELETED
        } else {
            TOMBSTONE_LIVE
        };
        buf[1..9].copy_from_slice(&self.stamp.to_be_bytes());
        buf[9..].copy_from_slice(&self.payload_len.to_be_bytes());
        buf
    }

    pub fn parse(buf: &[u8]) -> Option<Self> {
        if buf.len() < RECORD_HEADER_SIZE {
            return None;
        }
        Some(Self {
            tombstone: buf[0] == TOMBSTONE_DELETED,
            stamp: u64::from_be_bytes(buf[1..9].try_into().ok()?),
            payload_len: u32::from_be_bytes(buf[9..RECORD_HEADER_SIZE].try_into().ok()?),
        })
    }
}

/// Offsets of a record's payload and of the following record, if the whole
/// record fits below `end`. `None` means the record extends past `end` and
/// is corrupt from the caller's point of view.
pub fn record_span(offset: u32, payload_len: u32, end: u32) -> Option<(u32, u32)> {
    let payload_at = offset.checked_add(RECORD_HEADER_SIZE as u32)?;
    let next = payload_at.checked_add(payload_len)?;
    if next > end {
        return None;
    }
    Some((payload_at, next))
}
