use std::cell::UnsafeCell;
use std::io;
use std::ptr;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use bytes::Bytes;
use memmap2::MmapMut;

use crate::constants::*;
use crate::core::document::Document;
use crate::error::{GcdbError, Result};
use crate::storage::format::{record_span, FileHeader, RecordHeader};

/// Memory-mapped append-only data file.
///
/// The in-memory `write_offset` and `version` are authoritative; both are
/// mirrored into the file header after every mutation. The offset header is
/// written *after* the appended bytes land so a reader can never observe an
/// offset that covers unwritten bytes.
///
/// # Concurrency
///
/// All mutating calls (`append`, `write_at`, `increment_version`) must be
/// serialized by the engine's write lock. Readers copy byte ranges below a
/// sampled write offset without any lock; the only in-place rewrites a
/// reader can race with are the tombstone byte and deletion stamp of an
/// existing record.
pub struct MappedDataFile {
    map: UnsafeCell<MmapMut>,
    len: usize,
    write_offset: AtomicU32,
    version: AtomicU64,
}

unsafe impl Send for MappedDataFile {}
unsafe impl Sync for MappedDataFile {}

impl MappedDataFile {
    /// Adopt a mapping, initializing the file header if the init sentinel
    /// is still zero.
    pub fn new(map: MmapMut) -> Result<Self> {
        let len = map.len();
        if len < FILE_HEADER_SIZE {
            return Err(GcdbError::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("mapping of {} bytes is smaller than the file header", len),
            )));
        }
        if len > u32::MAX as usize {
            return Err(GcdbError::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                "mapping exceeds the 4 GiB the record format can address",
            )));
        }

        let file = Self {
            map: UnsafeCell::new(map),
            len,
            write_offset: AtomicU32::new(DATA_START),
            version: AtomicU64::new(1),
        };

        let header = FileHeader::parse(&file.read_at(0, FILE_HEADER_SIZE)?).ok_or_else(|| {
            GcdbError::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                "short file header read",
            ))
        })?;
        if header.initialized {
            if header.write_offset < DATA_START || header.write_offset as usize > len {
                return Err(GcdbError::Io(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("file header carries write offset {}", header.write_offset),
                )));
            }
            file.write_offset.store(header.write_offset, Ordering::Release);
            file.version.store(header.version, Ordering::Release);
        } else {
            file.write_at(0, &FileHeader::fresh().serialize())?;
            file.flush()?;
        }
        Ok(file)
    }

    /// Mapping length in bytes.
    pub fn capacity(&self) -> usize {
        self.len
    }

    pub fn write_offset(&self) -> u32 {
        self.write_offset.load(Ordering::Acquire)
    }

    pub fn current_version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Bytes still available for appends.
    pub fn remaining(&self) -> usize {
        self.len - self.write_offset() as usize
    }

    fn base(&self) -> *mut u8 {
        unsafe { (*self.map.get()).as_ptr() as *mut u8 }
    }

    /// Copy `n` bytes starting at `offset` out of the mapping.
    pub fn read_at(&self, offset: u32, n: usize) -> Result<Bytes> {
        let start = offset as usize;
        let end = start.checked_add(n).ok_or(GcdbError::CorruptRecord {
            offset,
            end: self.len as u32,
        })?;
        if end > self.len {
            return Err(GcdbError::CorruptRecord {
                offset,
                end: self.len as u32,
            });
        }
        let mut buf = vec![0u8; n];
        unsafe {
            ptr::copy_nonoverlapping(self.base().add(start), buf.as_mut_ptr(), n);
        }
        Ok(Bytes::from(buf))
    }

    /// In-place overwrite; does not move the write offset. Callers hold the
    /// write lock.
    pub fn write_at(&self, offset: u32, data: &[u8]) -> Result<()> {
        let start = offset as usize;
        let end = start.checked_add(data.len()).ok_or(GcdbError::OutOfSpace)?;
        if end > self.len {
            return Err(GcdbError::OutOfSpace);
        }
        unsafe {
            ptr::copy_nonoverlapping(data.as_ptr(), self.base().add(start), data.len());
        }
        Ok(())
    }

    /// Append at the write offset, advance it, and persist the offset
    /// header. Returns the offset the bytes landed at. Callers hold the
    /// write lock.
    pub fn append(&self, data: &[u8]) -> Result<u32> {
        let offset = self.write_offset();
        let next = (offset as usize)
            .checked_add(data.len())
            .filter(|&end| end <= self.len)
            .ok_or(GcdbError::OutOfSpace)? as u32;

        self.write_at(offset, data)?;
        self.write_offset.store(next, Ordering::Release);
        self.write_at(WRITE_OFFSET_AT, &next.to_be_bytes())?;
        Ok(offset)
    }

    /// Bump the version counter and persist the version header. Callers
    /// hold the write lock.
    pub fn increment_version(&self) -> Result<u64> {
        let version = self.version.fetch_add(1, Ordering::AcqRel) + 1;
        self.write_at(VERSION_AT, &version.to_be_bytes())?;
        Ok(version)
    }

    /// Decode the record at `offset`, treating `end` as the extent of valid
    /// data. Fails with `CorruptRecord` if the header or payload crosses it.
    pub fn read_record_at(&self, offset: u32, end: u32) -> Result<Document> {
        let corrupt = || GcdbError::CorruptRecord { offset, end };
        let header_end = offset
            .checked_add(RECORD_HEADER_SIZE as u32)
            .filter(|&at| at <= end)
            .ok_or_else(corrupt)?;

        let header = RecordHeader::parse(&self.read_at(offset, RECORD_HEADER_SIZE)?)
            .ok_or_else(corrupt)?;
        let (payload_at, next_offset) =
            record_span(offset, header.payload_len, end).ok_or_else(corrupt)?;
        debug_assert_eq!(payload_at, header_end);

        let payload = self.read_at(payload_at, header.payload_len as usize)?;
        Ok(Document::from_parts(payload, offset, next_offset, header))
    }

    /// Ask the OS to sync the mapping back to the file.
    pub fn flush(&self) -> Result<()> {
        unsafe { (*self.map.get()).flush() }?;
        Ok(())
    }
}
