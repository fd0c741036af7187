//! Write Cache
//!
//! A fixed-capacity buffer that absorbs appended records so that many small
//! writes reach the disk as one large sequential write. A parallel index
//! (address → buffer position) serves read-through: without it a reader
//! could miss a record that exists only in the buffer and read stale disk
//! contents instead.
//!
//! The cache assumes an append-only store: records are laid into the buffer
//! strictly in address order and the whole buffered range is flushed at once.
//! Flush orchestration (writing the range at the tracked disk offset, then
//! `reset`) belongs to the buffer strategy, which owns the disk handle.

use std::collections::HashMap;

use bytes::BytesMut;

use crate::addr::Address;

/// Assumed average record size, used to pre-size the index.
const INDEX_SIZING_RECORD_BYTES: usize = 1024;

/// In-memory buffer batching appended records before a sequential disk write.
pub struct WriteCache {
    /// The single long-lived buffer, reused across flushes.
    buf: BytesMut,

    /// Total capacity in bytes. `buf` is never grown past this.
    capacity: usize,

    /// Read-through index: address → position of the record in `buf`.
    ///
    /// Invariant: the keys are exactly the records physically resident in
    /// `buf[0..buf.len()]`. Cleared atomically with the buffer on `reset`.
    index: HashMap<Address, usize>,
}

impl WriteCache {
    /// Create a write cache with the given byte capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            capacity,
            index: HashMap::with_capacity(capacity / INDEX_SIZING_RECORD_BYTES),
        }
    }

    /// The current write position (number of buffered bytes).
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    /// The total capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes still available before the cache would overflow.
    pub fn remaining(&self) -> usize {
        self.capacity - self.buf.len()
    }

    /// True iff a record of `len` bytes fits without a flush.
    pub fn fits(&self, len: usize) -> bool {
        len <= self.remaining()
    }

    /// True iff nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Append a record and index it under its address.
    ///
    /// The caller must have established capacity first (flushing if needed);
    /// a record larger than the total capacity never enters the cache.
    pub fn write(&mut self, addr: Address, record: &[u8]) {
        debug_assert!(self.fits(record.len()));

        let position = self.buf.len();
        self.buf.extend_from_slice(record);
        self.index.insert(addr, position);
    }

    /// Read a record back out of the buffer.
    ///
    /// Returns a view that is valid only until the next `reset`; the caller
    /// must copy before releasing the critical section. `None` means the
    /// record is not resident here (not an error — fall through to disk).
    pub fn read(&self, addr: Address, len: u32) -> Option<&[u8]> {
        let position = *self.index.get(&addr)?;
        Some(&self.buf[position..position + len as usize])
    }

    /// The full buffered range, in disk layout order, for the flush.
    pub fn buffered(&self) -> &[u8] {
        &self.buf
    }

    /// Discard all buffered records: buffer and index are cleared together
    /// so the residency invariant holds at every point outside this call.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.index.clear();
    }
}
