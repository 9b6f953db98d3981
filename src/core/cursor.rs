use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use crate::constants::DATA_START;

/// Server-side resume tokens for paginated collection scans.
///
/// Ids are handed out from 1 and never reused. Cursors have no TTL and no
/// close operation; they live for the process lifetime.
pub struct CursorRegistry {
    next_id: AtomicU64,
    offsets: DashMap<u64, u32>,
}

impl CursorRegistry {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            offsets: DashMap::new(),
        }
    }

    /// Allocate a cursor positioned at the start of the collection.
    pub fn open(&self) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.offsets.insert(id, DATA_START);
        id
    }

    pub fn advance(&self, cursor: u64, offset: u32) {
        self.offsets.insert(cursor, offset);
    }

    pub fn peek(&self, cursor: u64) -> Option<u32> {
        self.offsets.get(&cursor).map(|entry| *entry.value())
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

impl Default for CursorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
