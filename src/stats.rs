use std::sync::atomic::{AtomicU64, Ordering};

/// Central statistics hub. Counters are monotonically nondecreasing and
/// never drive control flow.
#[derive(Debug, Default)]
pub struct Statistics {
    // Operation counters
    pub total_inserts: AtomicU64,
    pub total_deletes: AtomicU64,
    pub total_updates: AtomicU64,
    pub total_lookups: AtomicU64,

    // Scan metrics
    pub scans_started: AtomicU64,
    pub pages_served: AtomicU64,

    // Storage metrics
    pub bytes_appended: AtomicU64,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an insert and the bytes it appended (header + payload).
    pub fn record_insert(&self, bytes: u64) {
        self.total_inserts.fetch_add(1, Ordering::Relaxed);
        self.bytes_appended.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn record_delete(&self) {
        self.total_deletes.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an update and the bytes its re-insert appended.
    pub fn record_update(&self, bytes: u64) {
        self.total_updates.fetch_add(1, Ordering::Relaxed);
        self.bytes_appended.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn record_lookup(&self) {
        self.total_lookups.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_scan(&self) {
        self.scans_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_page(&self) {
        self.pages_served.fetch_add(1, Ordering::Relaxed);
    }
}
