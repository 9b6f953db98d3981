//! The concurrency envelope: one write lock serializing all mutations, one
//! cursor lock serializing paginated scans, and a metadata lock that only
//! matters when the active data file is swapped.

use parking_lot::{Mutex, MutexGuard};

/// Process-wide locks. When more than one is taken, the order is metadata,
/// then write, then cursor.
pub struct Locks {
    pub metadata: Mutex<()>,
    pub write: Mutex<()>,
    pub cursor: Mutex<()>,
}

/// Holds every lock; nothing else can mutate, scan, or page while this
/// guard lives.
pub struct StopTheWorldGuard<'a> {
    _metadata: MutexGuard<'a, ()>,
    _write: MutexGuard<'a, ()>,
    _cursor: MutexGuard<'a, ()>,
}

impl Locks {
    pub fn new() -> Self {
        Self {
            metadata: Mutex::new(()),
            write: Mutex::new(()),
            cursor: Mutex::new(()),
        }
    }

    /// Acquire every lock in order. Used when swapping the active data file
    /// reference.
    pub fn stop_the_world(&self) -> StopTheWorldGuard<'_> {
        StopTheWorldGuard {
            _metadata: self.metadata.lock(),
            _write: self.write.lock(),
            _cursor: self.cursor.lock(),
        }
    }
}

impl Default for Locks {
    fn default() -> Self {
        Self::new()
    }
}
