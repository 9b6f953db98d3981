use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::constants::SCAN_CHANNEL_CAPACITY;
use crate::core::document::Document;
use crate::error::Result;
use crate::storage::MappedDataFile;

/// The `(write_offset, version)` pair fixed at scan start. Both values must
/// be sampled while no delete is in flight, i.e. under the write lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub end: u32,
    pub version: u64,
}

/// Lazy, finite, single-pass iterator over live documents.
///
/// A producer thread walks records in increasing offset order and feeds a
/// bounded channel; the iterator drains it. Records inserted after the
/// snapshot are never visited (they sit at or past `snapshot.end`), and
/// records deleted after the snapshot still look live to this scan.
///
/// Dropping the scanner cancels the producer. Cancellation is best-effort:
/// one more item may already be queued when the stop signal is observed.
pub struct Scanner {
    items: Receiver<Result<Document>>,
    stop: Sender<()>,
}

impl Scanner {
    pub(crate) fn spawn(file: Arc<MappedDataFile>, from: u32, snapshot: Snapshot) -> Self {
        let (tx, rx) = bounded(SCAN_CHANNEL_CAPACITY);
        let (stop_tx, stop_rx) = bounded(1);
        thread::spawn(move || produce(&file, from, snapshot, &tx, &stop_rx));
        Self {
            items: rx,
            stop: stop_tx,
        }
    }
}

impl Iterator for Scanner {
    type Item = Result<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.recv().ok()
    }
}

impl Drop for Scanner {
    fn drop(&mut self) {
        let _ = self.stop.try_send(());
    }
}

fn produce(
    file: &MappedDataFile,
    from: u32,
    snapshot: Snapshot,
    tx: &Sender<Result<Document>>,
    stop: &Receiver<()>,
) {
    let mut offset = from;
    while offset < snapshot.end {
        if stop.try_recv().is_ok() {
            tracing::debug!(offset, "collection scan cancelled");
            return;
        }
        match file.read_record_at(offset, snapshot.end) {
            Ok(doc) => {
                offset = doc.next_offset;
                if !doc.visible_at(snapshot.version) {
                    continue;
                }
                if tx.send(Ok(doc)).is_err() {
                    // Consumer is gone.
                    return;
                }
            }
            Err(err) => {
                // Corruption is fatal for this scan; surface it and stop.
                let _ = tx.send(Err(err));
                return;
            }
        }
    }
}
