use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use memmap2::MmapMut;
use parking_lot::RwLock;

use crate::constants::*;
use crate::core::cursor::CursorRegistry;
use crate::core::document::document_id;
use crate::core::index::PrimaryIndex;
use crate::core::scan::{Scanner, Snapshot};
use crate::error::{GcdbError, Result};
use crate::locks::Locks;
use crate::stats::Statistics;
use crate::storage::format::{RecordHeader, TOMBSTONE_DELETED};
use crate::storage::{filesystem, MappedDataFile};

/// Configuration options for an [`Engine`].
///
/// Use [`EngineBuilder`] for a more ergonomic way to configure the engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Directory holding the `data.<N>` files.
    pub data_dir: PathBuf,

    /// Size a fresh data file is grown to. The mapping is sized once;
    /// appends past it fail rather than remap.
    pub file_capacity: usize,

    /// TCP listen address for the front end.
    pub listen_addr: String,

    /// Whether point lookups consult the primary-key index or fall back to
    /// collection scans. Writes maintain the index either way.
    pub indexed_reads: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            file_capacity: DEFAULT_FILE_CAPACITY,
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            indexed_reads: true,
        }
    }
}

/// Builder for creating an [`Engine`] with custom configuration.
///
/// # Example
///
/// ```no_run
/// use gcdb::Engine;
///
/// # fn main() -> gcdb::Result<()> {
/// let engine = Engine::builder()
///     .data_dir("/var/lib/gcdb")
///     .file_capacity(256 * 1024 * 1024)
///     .open()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct EngineBuilder {
    config: EngineConfig,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the directory data files live in. Created if missing.
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.data_dir = dir.into();
        self
    }

    /// Set the capacity a fresh data file is grown to.
    pub fn file_capacity(mut self, capacity: usize) -> Self {
        self.config.file_capacity = capacity;
        self
    }

    /// Set the TCP listen address of the front end.
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Choose the initial read path for point lookups.
    pub fn indexed_reads(mut self, enabled: bool) -> Self {
        self.config.indexed_reads = enabled;
        self
    }

    /// Open the engine with this configuration.
    pub fn open(self) -> Result<Engine> {
        Engine::open(self.config)
    }
}

/// The storage engine: one memory-mapped data file, the primary-key index
/// kept in lock-step with writes, and the cursor registry for paginated
/// reads.
///
/// # Concurrency
///
/// All mutations hold the global write lock for their full duration.
/// Point lookups and collection scans take no write lock; scans observe a
/// snapshot fixed at scan start. The paginated read path serializes on the
/// cursor lock.
pub struct Engine {
    file: RwLock<Arc<MappedDataFile>>,
    index: PrimaryIndex,
    cursors: CursorRegistry,
    locks: Locks,
    stats: Arc<Statistics>,
    indexed_reads: AtomicBool,
    config: EngineConfig,
}

impl Engine {
    /// Open (or create) the data file under `config.data_dir`, map it, and
    /// build the primary-key index from a full collection scan.
    pub fn open(config: EngineConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        let file = filesystem::ensure_current_data_file(&config.data_dir, config.file_capacity)?;
        let map = unsafe { MmapMut::map_mut(&file)? };
        let data_file = MappedDataFile::new(map)?;

        let engine = Self {
            file: RwLock::new(Arc::new(data_file)),
            index: PrimaryIndex::new(),
            cursors: CursorRegistry::new(),
            locks: Locks::new(),
            stats: Arc::new(Statistics::new()),
            indexed_reads: AtomicBool::new(config.indexed_reads),
            config,
        };
        engine.build_index()?;
        Ok(engine)
    }

    /// Create a builder for configuring an engine.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    /// Number of live documents, per the primary-key index.
    pub fn document_count(&self) -> usize {
        self.index.len()
    }

    /// The file version counter. Bumped once per delete, never decreasing.
    pub fn current_version(&self) -> u64 {
        self.current_file().current_version()
    }

    pub fn indexed_reads(&self) -> bool {
        self.indexed_reads.load(Ordering::Relaxed)
    }

    /// Switch the read path used for point lookup and delete/update
    /// targeting. The index itself is always maintained.
    pub fn set_indexed_reads(&self, enabled: bool) {
        self.indexed_reads.store(enabled, Ordering::Relaxed);
    }

    fn current_file(&self) -> Arc<MappedDataFile> {
        Arc::clone(&self.file.read())
    }

    /// Replace the active data file. Stops the world so no write, scan, or
    /// cursor operation straddles the swap.
    pub fn install_data_file(&self, data_file: MappedDataFile) {
        let _world = self.locks.stop_the_world();
        *self.file.write() = Arc::new(data_file);
    }

    /// Populate the index from a full scan. Runs before the listener
    /// accepts connections; a payload that fails `_id` extraction is fatal.
    fn build_index(&self) -> Result<()> {
        tracing::info!("building primary-key index on _id");
        let mut documents = 0usize;
        for doc in self.scan(DATA_START) {
            let doc = doc?;
            self.index.insert_or_replace(doc.id()?, doc.offset);
            documents += 1;
        }
        tracing::info!(documents, "index build complete");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Read paths
    // -------------------------------------------------------------------------

    /// Start a snapshot-consistent scan of live documents at `from`.
    pub fn scan(&self, from: u32) -> Scanner {
        let file = self.current_file();
        let snapshot = self.sample_snapshot(&file);
        self.stats.record_scan();
        Scanner::spawn(file, from, snapshot)
    }

    /// Sample the `(write_offset, version)` pair under the write lock so a
    /// concurrent delete cannot land between the two reads. The lock is
    /// released before the caller starts scanning.
    fn sample_snapshot(&self, file: &MappedDataFile) -> Snapshot {
        let _write = self.locks.write.lock();
        Snapshot {
            end: file.write_offset(),
            version: file.current_version(),
        }
    }

    /// Scan variant for callers already holding the write lock, which makes
    /// the unlocked snapshot sample exact.
    fn scan_locked(&self, file: &Arc<MappedDataFile>, from: u32) -> Scanner {
        let snapshot = Snapshot {
            end: file.write_offset(),
            version: file.current_version(),
        };
        self.stats.record_scan();
        Scanner::spawn(Arc::clone(file), from, snapshot)
    }

    /// Fetch a document's payload by id.
    ///
    /// Takes no lock: either a lock-free index probe plus a single record
    /// read, or a collection scan comparing decoded `_id`s, depending on
    /// the read-path toggle.
    pub fn find_by_id(&self, id: i64) -> Result<Bytes> {
        self.stats.record_lookup();
        if self.indexed_reads() {
            let offset = self.index.lookup(id).ok_or(GcdbError::NotFound(id))?;
            let file = self.current_file();
            let doc = file.read_record_at(offset, file.write_offset())?;
            if doc.is_tombstoned() {
                // Deleted between the index probe and the record read.
                return Err(GcdbError::NotFound(id));
            }
            return Ok(doc.payload);
        }

        for doc in self.scan(DATA_START) {
            let doc = doc?;
            if doc.id()? == id {
                return Ok(doc.payload);
            }
        }
        Err(GcdbError::NotFound(id))
    }

    /// Open a cursor over the whole collection. Returns its id; the first
    /// `get_more` starts at the beginning of the data region.
    pub fn find_all(&self) -> u64 {
        let _cursor = self.locks.cursor.lock();
        self.cursors.open()
    }

    /// Serve the next page of at most [`SCAN_PAGE_SIZE`] documents for an
    /// open cursor, advancing it past the last document served. An empty
    /// page is `CursorExhausted` and leaves the cursor where it was.
    ///
    /// The snapshot is sampled before the cursor lock is taken: this path
    /// must never wait on the write lock while holding the cursor lock, or
    /// it would invert the metadata/write/cursor order stop-the-world
    /// relies on.
    pub fn get_more(&self, cursor: u64) -> Result<Vec<Bytes>> {
        let file = self.current_file();
        let snapshot = self.sample_snapshot(&file);

        let _cursor_guard = self.locks.cursor.lock();
        let from = self
            .cursors
            .peek(cursor)
            .ok_or(GcdbError::UnknownCursor(cursor))?;

        self.stats.record_scan();
        let scanner = Scanner::spawn(Arc::clone(&file), from, snapshot);

        let mut page = Vec::with_capacity(SCAN_PAGE_SIZE);
        let mut resume_at = from;
        for doc in scanner.take(SCAN_PAGE_SIZE) {
            let doc = doc?;
            resume_at = doc.next_offset;
            page.push(doc.payload);
        }
        if page.is_empty() {
            return Err(GcdbError::CursorExhausted);
        }
        self.cursors.advance(cursor, resume_at);
        self.stats.record_page();
        Ok(page)
    }

    // -------------------------------------------------------------------------
    // Write pipeline
    // -------------------------------------------------------------------------

    /// Insert a document. The payload must be a JSON object with an integer
    /// `_id` that is not already present; the bytes are stored exactly as
    /// supplied. Does not bump the version counter.
    pub fn insert(&self, payload: &[u8]) -> Result<i64> {
        let id = document_id(payload)?;

        let _write = self.locks.write.lock();
        if self.index.contains(id) {
            return Err(GcdbError::DuplicateId(id));
        }
        let file = self.current_file();
        let offset = self.append_record(&file, payload)?;
        self.index.insert_or_replace(id, offset);
        self.stats
            .record_insert((RECORD_HEADER_SIZE + payload.len()) as u64);
        Ok(id)
    }

    /// Tombstone a document. Locates the record (index or scan, per the
    /// read-path toggle), stamps it with the pre-increment version, then
    /// bumps the counter so scans snapshotted afterwards skip it.
    pub fn delete(&self, id: i64) -> Result<()> {
        let _write = self.locks.write.lock();
        let file = self.current_file();
        let offset = self
            .locate_locked(&file, id)?
            .ok_or(GcdbError::NotFound(id))?;
        self.tombstone_at(&file, id, offset)?;
        self.stats.record_delete();
        Ok(())
    }

    /// Replace a document's payload under a single write-lock acquisition:
    /// a delete followed by an insert at the append frontier. No upsert;
    /// the new payload must carry the target `_id`.
    pub fn update(&self, id: i64, payload: &[u8]) -> Result<()> {
        let found = document_id(payload)?;
        if found != id {
            return Err(GcdbError::IdMismatch {
                expected: id,
                found,
            });
        }

        let _write = self.locks.write.lock();
        let file = self.current_file();
        let offset = self
            .locate_locked(&file, id)?
            .ok_or(GcdbError::NotFound(id))?;

        // Reserve space up front so a full file leaves the old document
        // untouched.
        if file.remaining() < RECORD_HEADER_SIZE + payload.len() {
            return Err(GcdbError::OutOfSpace);
        }

        self.tombstone_at(&file, id, offset)?;
        let new_offset = self.append_record(&file, payload)?;
        self.index.insert_or_replace(id, new_offset);
        self.stats
            .record_update((RECORD_HEADER_SIZE + payload.len()) as u64);
        Ok(())
    }

    /// Sync the mapping back to the data file.
    pub fn flush(&self) -> Result<()> {
        self.current_file().flush()
    }

    /// Find the record offset for `id`. Caller holds the write lock.
    fn locate_locked(&self, file: &Arc<MappedDataFile>, id: i64) -> Result<Option<u32>> {
        if self.indexed_reads() {
            return Ok(self.index.lookup(id));
        }
        for doc in self.scan_locked(file, DATA_START) {
            let doc = doc?;
            if doc.id()? == id {
                return Ok(Some(doc.offset));
            }
        }
        Ok(None)
    }

    /// Append a live record (header, then payload). Caller holds the write
    /// lock. The space check up front keeps a failed append from leaving a
    /// headerless gap below the write offset, and bounds the length below
    /// what the header's u32 can express.
    fn append_record(&self, file: &MappedDataFile, payload: &[u8]) -> Result<u32> {
        if file.remaining() < RECORD_HEADER_SIZE + payload.len() {
            return Err(GcdbError::OutOfSpace);
        }
        let header = RecordHeader::live(payload.len() as u32);
        let offset = file.append(&header.serialize())?;
        file.append(payload)?;
        Ok(offset)
    }

    /// Stamp a record with the pre-increment version, flip its tombstone,
    /// bump the counter, and drop the index entry. Caller holds the write
    /// lock. The stamp lands before the flag: a lock-free reader that
    /// observes the tombstone must also observe a complete stamp.
    fn tombstone_at(&self, file: &MappedDataFile, id: i64, offset: u32) -> Result<()> {
        let stamp = file.current_version();
        file.write_at(offset + 1, &stamp.to_be_bytes())?;
        file.write_at(offset, &[TOMBSTONE_DELETED])?;
        file.increment_version()?;
        self.index.remove(id);
        Ok(())
    }
}
