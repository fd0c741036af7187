//! WORM Store
//!
//! The disk-backed buffer strategy that composes addressing, the write-back
//! cache, the optional read cache, the disk manager, and the root block
//! commit protocol behind one allocate/write/read/force/truncate contract.
//!
//! ## Concurrency Model
//!
//! One instance-wide critical section (`parking_lot::Mutex`) covers the
//! write path, the cache-consulting portion of the read path, and the
//! root-block/truncate operations. Disk reads that fall through to the
//! physical file still block while holding it — a deliberate
//! simplicity/safety trade: weaker read concurrency in exchange for
//! eliminating cache-tear races under concurrent read/write load.
//!
//! ## Read Path
//!
//! Read cache, then write cache, then disk — first hit wins. The read cache
//! is populated only on a disk hit under the configured size ceiling, never
//! from writes (the write cache already serves freshly written records).

use std::fs;
use std::path::Path;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use parking_lot::Mutex;

use crate::addr::{Address, AddressCodec};
use crate::cache::{ReadCache, WriteCache};
use crate::config::Config;
use crate::disk::DiskManager;
use crate::error::{Result, StoreError};
use crate::rootblock::{
    self, ForcePolicy, RootBlock, RootBlockSlot, FILE_PREAMBLE_BYTES, HEADER_SIZE,
    ROOT_BLOCK_BYTES,
};

use super::counters::{Counters, CountersSnapshot};

/// Lifecycle state of a store instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    /// Reads and writes allowed (writes also require a writable open mode).
    Open,

    /// Sealed: reads only; future writes are rejected. The write cache was
    /// discarded without flushing — sealing implies the caller already
    /// guaranteed durability through an explicit force/commit beforehand.
    ClosedForWrites,

    /// No operations; resources released. Terminal.
    Closed,
}

/// Mutable store state guarded by the instance-wide lock.
struct Inner {
    state: StoreState,

    /// The offset at which the next record will be appended.
    /// Monotonically non-decreasing; relative to the user data region.
    next_offset: u64,

    /// The user offset at which the write cache contents will land on disk
    /// at the next flush. Trails `next_offset` by exactly the #of bytes
    /// currently buffered.
    write_cache_offset: u64,

    /// Total file size.
    extent: u64,

    /// `extent - HEADER_SIZE`: the space available for records.
    user_extent: u64,

    /// Upper bound on extent growth (0 = unbounded).
    maximum_extent: u64,

    /// Write-back cache; `None` when disabled, read-only, or sealed.
    write_cache: Option<WriteCache>,

    /// Recently-read-record cache; `None` when disabled.
    read_cache: Option<ReadCache>,

    /// The slot holding the most recent commit.
    current_slot: RootBlockSlot,

    /// The most recently committed root block.
    current_root: RootBlock,

    counters: Counters,
}

/// Record-oriented append-only store over a single file.
///
/// Records are written once, addressed by compact integer handles, and
/// never updated or deleted individually. Crash consistency comes from the
/// two alternating root block slots: a commit is the atomic publication of
/// a new root block, and recovery adopts the most recent valid slot.
///
/// The instance assumes exclusive ownership of its backing file; no
/// OS-level lock is taken.
pub struct WormStore {
    config: Config,
    codec: AddressCodec,
    disk: DiskManager,
    inner: Mutex<Inner>,
}

impl WormStore {
    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Open or create a store per the given configuration.
    ///
    /// Creating a new store writes the file preamble and two identical
    /// counter-zero root blocks, then forces, so even a never-committed
    /// store recovers cleanly. Reopening validates the preamble, adopts the
    /// persisted address bit split, and restores `next_offset` from the
    /// most recent valid root block.
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;

        let exists = config.path.exists();

        if !exists && config.read_only {
            return Err(StoreError::Config(format!(
                "cannot create a new store read-only: {}",
                config.path.display()
            )));
        }

        let disk = DiskManager::open(&config.path, config.read_only, !exists)?;

        let (codec, root, slot, extent) = if exists {
            Self::recover(&config, &disk)?
        } else {
            Self::initialize(&config, &disk)?
        };

        let next_offset = root.next_offset;
        let user_extent = extent - HEADER_SIZE;

        if next_offset > user_extent {
            return Err(StoreError::Corrupt(format!(
                "committed next offset {} exceeds user extent {}",
                next_offset, user_extent
            )));
        }

        let write_cache = if config.write_cache_enabled && !config.read_only {
            tracing::info!(
                "enabling write cache: capacity={}",
                config.write_cache_capacity
            );
            Some(WriteCache::new(config.write_cache_capacity))
        } else {
            None
        };

        let read_cache = if config.read_cache_capacity > 0 {
            tracing::info!(
                "enabling read cache: capacity={}, max_record_size={}",
                config.read_cache_capacity,
                config.read_cache_max_record_size
            );
            Some(ReadCache::new(config.read_cache_capacity))
        } else {
            None
        };

        let inner = Inner {
            state: StoreState::Open,
            next_offset,
            write_cache_offset: next_offset,
            extent,
            user_extent,
            maximum_extent: config.maximum_extent,
            write_cache,
            read_cache,
            current_slot: slot,
            current_root: root,
            counters: Counters::default(),
        };

        Ok(Self {
            config,
            codec,
            disk,
            inner: Mutex::new(inner),
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses the default config with the specified backing file.
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().path(path).build();
        Self::open(config)
    }

    /// Seal the store: future writes are rejected, reads continue.
    ///
    /// The write cache is discarded without flushing — anything unflushed
    /// is lost, since sealing implies the caller already forced durability.
    /// The file is not reopened read-only, to avoid disturbing concurrent
    /// readers.
    pub fn close_for_writes(&self) -> Result<()> {
        let mut inner = self.inner.lock();

        if inner.state == StoreState::Closed {
            return Err(StoreError::Closed);
        }

        inner.state = StoreState::ClosedForWrites;
        inner.write_cache = None;

        Ok(())
    }

    /// Close the store: releases both caches and the file channel.
    ///
    /// Pending writes are NOT flushed; call `force` first if they matter.
    /// No operation is valid afterwards.
    pub fn close(&self) -> Result<()> {
        let mut inner = self.inner.lock();

        if inner.state == StoreState::Closed {
            return Err(StoreError::Closed);
        }

        inner.state = StoreState::Closed;
        inner.write_cache = None;

        if let Some(rc) = inner.read_cache.take() {
            tracing::debug!(
                "read cache at close: tests={}, hits={}, inserts={}",
                rc.test_count(),
                rc.hit_count(),
                rc.insert_count()
            );
        }

        self.disk.close();

        Ok(())
    }

    /// Delete the backing file of a closed store.
    pub fn delete_resources(&self) -> Result<()> {
        let inner = self.inner.lock();

        if inner.state != StoreState::Closed {
            return Err(StoreError::InvalidState(
                "cannot delete resources while the store is open".to_string(),
            ));
        }

        fs::remove_file(&self.config.path)?;

        Ok(())
    }

    // =========================================================================
    // Record Operations
    // =========================================================================

    /// Append a record, returning the address that reads it back.
    ///
    /// The record is absorbed by the write cache when it fits (flushing the
    /// cache first if it would overflow); a record larger than the total
    /// cache capacity bypasses the cache and is written directly to disk.
    /// Either way the returned address is immediately readable and
    /// `next_offset` advances monotonically.
    pub fn write(&self, record: &[u8]) -> Result<Address> {
        if record.is_empty() {
            return Err(StoreError::EmptyRecord);
        }

        let begin = Instant::now();

        let mut inner = self.inner.lock();

        self.check_writable(&inner)?;

        if record.len() as u64 > self.codec.max_length() {
            return Err(StoreError::AddressOverflow {
                offset: inner.next_offset,
                length: record.len() as u64,
                offset_bits: self.codec.offset_bits(),
                length_bits: self.codec.length_bits(),
            });
        }

        let nbytes = record.len() as u32;
        let offset = inner.next_offset;

        // The address that will recover this record.
        let addr = self.codec.encode(offset, nbytes)?;

        // Flush the write cache if this record would cause it to overflow.
        let needs_flush = inner
            .write_cache
            .as_ref()
            .is_some_and(|wc| !wc.fits(record.len()));

        if needs_flush {
            inner.flush_write_cache(&self.disk)?;
        }

        let cache_fits = matches!(
            &inner.write_cache,
            Some(wc) if record.len() <= wc.capacity()
        );

        if cache_fits {
            if let Some(wc) = inner.write_cache.as_mut() {
                wc.write(addr, record);
            }
            inner.counters.ncache_write += 1;
        } else {
            // Too big for the cache (or the cache is disabled): write the
            // record directly on the disk.
            inner.write_on_disk(&self.disk, record, offset)?;
        }

        inner.next_offset += nbytes as u64;

        inner.counters.nwrites += 1;
        inner.counters.bytes_written += nbytes as u64;
        inner.counters.max_write_size = inner.counters.max_write_size.max(nbytes as u64);
        inner.counters.elapsed_write_nanos += begin.elapsed().as_nanos() as u64;

        Ok(addr)
    }

    /// Read the record identified by `addr`.
    ///
    /// Checks the read cache, then the write cache, then the disk, in that
    /// order. The returned bytes are an owned copy; cache hits share the
    /// cached allocation.
    pub fn read(&self, addr: Address) -> Result<Bytes> {
        let begin = Instant::now();

        let (offset, nbytes) = self.codec.decode(addr)?;

        let mut inner = self.inner.lock();

        if inner.state == StoreState::Closed {
            return Err(StoreError::Closed);
        }

        if offset + nbytes as u64 > inner.next_offset {
            return Err(StoreError::InvalidAddress(format!(
                "address names bytes [{}, {}) but only {} bytes have been written",
                offset,
                offset + nbytes as u64,
                inner.next_offset
            )));
        }

        // Step 1: read cache.
        let cached = inner.read_cache.as_mut().and_then(|rc| rc.get(addr));
        if let Some(bytes) = cached {
            inner.finish_read(begin, nbytes);
            return Ok(bytes);
        }

        // Step 2: write cache. The view is only valid until the next flush,
        // so copy while still holding the lock.
        let buffered = inner
            .write_cache
            .as_ref()
            .and_then(|wc| wc.read(addr, nbytes))
            .map(Bytes::copy_from_slice);
        if let Some(bytes) = buffered {
            inner.counters.ncache_read += 1;
            inner.finish_read(begin, nbytes);
            return Ok(bytes);
        }

        // Step 3: read through to the disk.
        let begin_disk = Instant::now();

        let bytes = self.disk.read_at(offset + HEADER_SIZE, nbytes as usize)?;

        inner.counters.ndisk_read += 1;
        inner.counters.bytes_read_from_disk += nbytes as u64;
        inner.counters.elapsed_disk_read_nanos += begin_disk.elapsed().as_nanos() as u64;

        // Populate the read cache on a disk hit, gated by the size ceiling.
        if (nbytes as usize) < self.config.read_cache_max_record_size {
            if let Some(rc) = inner.read_cache.as_mut() {
                rc.put(addr, bytes.clone());
            }
        }

        inner.finish_read(begin, nbytes);

        Ok(bytes)
    }

    /// Flush the write cache and force the file to stable storage.
    ///
    /// Synchronous and blocking; when it returns, every previously written
    /// record is durable. `metadata` additionally forces file metadata.
    pub fn force(&self, metadata: bool) -> Result<()> {
        let mut inner = self.inner.lock();

        if inner.state == StoreState::Closed {
            return Err(StoreError::Closed);
        }

        inner.flush_write_cache(&self.disk)?;

        self.disk.force(metadata)?;

        inner.counters.nforce += 1;

        Ok(())
    }

    // =========================================================================
    // Extent Management
    // =========================================================================

    /// Grow or shrink the file's declared extent.
    ///
    /// Rejected if the new user extent would be smaller than the next free
    /// offset (that would destroy already-allocated data); the extent is
    /// left unchanged in that case. On success pending writes are flushed
    /// and the file is forced, because the extent itself is durable state.
    pub fn truncate(&self, new_extent: u64) -> Result<()> {
        let mut inner = self.inner.lock();

        self.check_writable(&inner)?;

        let new_user_extent = new_extent.checked_sub(HEADER_SIZE).ok_or_else(|| {
            StoreError::Truncate(format!(
                "new extent {} is smaller than the store header ({} bytes)",
                new_extent, HEADER_SIZE
            ))
        })?;

        if new_user_extent < inner.next_offset {
            return Err(StoreError::Truncate(format!(
                "new user extent {} would destroy allocated data (next offset is {})",
                new_user_extent, inner.next_offset
            )));
        }

        if new_user_extent == inner.user_extent {
            return Ok(());
        }

        inner.flush_write_cache(&self.disk)?;

        self.disk.set_len(new_extent)?;

        // The file length changed; force data and metadata so the new
        // extent cannot be lost.
        self.disk.force(true)?;

        tracing::debug!(
            "truncated store file: extent {} -> {}",
            inner.extent,
            new_extent
        );

        inner.extent = new_extent;
        inner.user_extent = new_user_extent;
        inner.counters.ntruncate += 1;

        Ok(())
    }

    // =========================================================================
    // Commit Protocol
    // =========================================================================

    /// Publish a new durable state by writing a root block.
    ///
    /// The block is written to the slot alternate to the current one, so a
    /// crash mid-write never destroys the last committed state. Depending
    /// on `policy` the write cache is flushed and the file forced before
    /// this method returns. Returns the slot that was written, which
    /// becomes the current slot.
    pub fn write_root_block(&self, block: &RootBlock, policy: ForcePolicy) -> Result<RootBlockSlot> {
        let mut inner = self.inner.lock();

        self.check_writable(&inner)?;

        let target = inner.current_slot.alternate();

        let buf = block.to_bytes(target);

        self.disk.write_at(target.file_offset(), &buf)?;

        match policy {
            ForcePolicy::None => {}
            ForcePolicy::ForceData => {
                inner.flush_write_cache(&self.disk)?;
                self.disk.force(false)?;
            }
            ForcePolicy::ForceDataAndMetadata => {
                inner.flush_write_cache(&self.disk)?;
                self.disk.force(true)?;
            }
        }

        tracing::debug!(
            "wrote root block: slot={:?}, commit_counter={}, next_offset={}",
            target,
            block.commit_counter,
            block.next_offset
        );

        inner.current_slot = target;
        inner.current_root = block.clone();
        inner.counters.nwrite_root_block += 1;

        Ok(target)
    }

    /// The most recently committed root block (the initial counter-zero
    /// block if nothing has been committed yet).
    pub fn root_block(&self) -> RootBlock {
        self.inner.lock().current_root.clone()
    }

    // =========================================================================
    // Observability
    // =========================================================================

    /// A read-only snapshot of all store statistics.
    pub fn counters(&self) -> CountersSnapshot {
        let inner = self.inner.lock();

        let mut snapshot = inner.counters.snapshot(self.disk.counters());

        if let Some(rc) = &inner.read_cache {
            snapshot.read_cache_test_count = rc.test_count();
            snapshot.read_cache_hit_count = rc.hit_count();
            snapshot.read_cache_insert_count = rc.insert_count();
            snapshot.read_cache_len = rc.len() as u64;
        }

        snapshot.write_cache_capacity = inner
            .write_cache
            .as_ref()
            .map(|wc| wc.capacity() as u64)
            .unwrap_or(0);
        snapshot.read_cache_capacity = self.config.read_cache_capacity as u64;

        snapshot
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The offset at which the next record will be appended.
    pub fn next_offset(&self) -> u64 {
        self.inner.lock().next_offset
    }

    /// Total size of the backing file in bytes.
    pub fn extent(&self) -> u64 {
        self.inner.lock().extent
    }

    /// Extent minus the fixed header: the space available for records.
    pub fn user_extent(&self) -> u64 {
        self.inner.lock().user_extent
    }

    /// The lifecycle state of this instance.
    pub fn state(&self) -> StoreState {
        self.inner.lock().state
    }

    /// True until `close` is called.
    pub fn is_open(&self) -> bool {
        self.inner.lock().state != StoreState::Closed
    }

    /// True iff writes are rejected (read-only open mode or sealed).
    pub fn is_read_only(&self) -> bool {
        self.config.read_only || self.inner.lock().state == StoreState::ClosedForWrites
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Size of the fixed file header excluded from all user offsets.
    pub const fn header_size() -> u64 {
        HEADER_SIZE
    }

    /// The address bit split in effect for this store.
    pub fn offset_bits(&self) -> u8 {
        self.codec.offset_bits()
    }

    /// The largest record length this store can address.
    pub fn max_record_length(&self) -> u64 {
        self.codec.max_length()
    }

    /// The configuration this store was opened with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Lay down a brand-new store file: preamble, two identical counter-zero
    /// root blocks, initial extent, forced to disk.
    fn initialize(
        config: &Config,
        disk: &DiskManager,
    ) -> Result<(AddressCodec, RootBlock, RootBlockSlot, u64)> {
        let codec = AddressCodec::new(config.offset_bits)?;

        let extent = config.initial_extent.max(HEADER_SIZE);

        disk.set_len(extent)?;

        disk.write_at(0, &rootblock::pack_preamble(config.offset_bits))?;

        let root = RootBlock {
            commit_counter: 0,
            next_offset: 0,
            extent,
            root_addr: Address::NULL,
            commit_time_millis: unix_millis(),
        };

        disk.write_at(
            RootBlockSlot::Zero.file_offset(),
            &root.to_bytes(RootBlockSlot::Zero),
        )?;
        disk.write_at(
            RootBlockSlot::One.file_offset(),
            &root.to_bytes(RootBlockSlot::One),
        )?;

        disk.force(true)?;

        tracing::info!(
            "created store: path={}, extent={}, offset_bits={}",
            config.path.display(),
            extent,
            config.offset_bits
        );

        Ok((codec, root, RootBlockSlot::Zero, extent))
    }

    /// Recover an existing store: validate the preamble, adopt the persisted
    /// address bit split, and pick the current root block slot.
    fn recover(
        config: &Config,
        disk: &DiskManager,
    ) -> Result<(AddressCodec, RootBlock, RootBlockSlot, u64)> {
        let extent = disk.len()?;

        if extent < HEADER_SIZE {
            return Err(StoreError::Corrupt(format!(
                "file is {} bytes; the store header alone is {}",
                extent, HEADER_SIZE
            )));
        }

        let preamble = disk.read_at(0, FILE_PREAMBLE_BYTES as usize)?;
        let offset_bits = rootblock::parse_preamble(&preamble)?;

        // The bit split is part of the file format; the file wins over
        // whatever the configuration asked for.
        let codec = AddressCodec::new(offset_bits)?;

        let slot0 = Self::read_root_slot(disk, RootBlockSlot::Zero);
        let slot1 = Self::read_root_slot(disk, RootBlockSlot::One);

        let (root, slot) = rootblock::choose_current(slot0, slot1).ok_or_else(|| {
            StoreError::Corrupt("no valid root block in either slot".to_string())
        })?;

        tracing::info!(
            "recovered store: path={}, slot={:?}, commit_counter={}, next_offset={}",
            config.path.display(),
            slot,
            root.commit_counter,
            root.next_offset
        );

        Ok((codec, root, slot, extent))
    }

    /// Read and parse one root block slot; a torn or unreadable slot is
    /// simply not a candidate for recovery.
    fn read_root_slot(disk: &DiskManager, slot: RootBlockSlot) -> Option<RootBlock> {
        let buf = disk
            .read_at(slot.file_offset(), ROOT_BLOCK_BYTES as usize)
            .ok()?;

        match RootBlock::from_bytes(&buf) {
            Ok((block, stored_slot)) if stored_slot == slot => Some(block),
            Ok(_) => {
                tracing::warn!("root block in slot {:?} carries the wrong slot tag", slot);
                None
            }
            Err(e) => {
                tracing::warn!("root block in slot {:?} is invalid: {}", slot, e);
                None
            }
        }
    }

    fn check_writable(&self, inner: &Inner) -> Result<()> {
        match inner.state {
            StoreState::Closed => Err(StoreError::Closed),
            StoreState::ClosedForWrites => Err(StoreError::ReadOnly),
            StoreState::Open => {
                if self.config.read_only {
                    Err(StoreError::ReadOnly)
                } else {
                    Ok(())
                }
            }
        }
    }
}

impl Inner {
    /// Write the whole write cache through to the disk and reset it.
    ///
    /// No-op when nothing is buffered. On failure the buffer is left
    /// intact so the error surfaces without losing buffered records.
    fn flush_write_cache(&mut self, disk: &DiskManager) -> Result<()> {
        // Take the cache out so the buffered range can be borrowed while
        // the disk write mutates the rest of this state.
        let Some(mut wc) = self.write_cache.take() else {
            return Ok(());
        };

        let result = if wc.is_empty() {
            Ok(())
        } else {
            let offset = self.write_cache_offset;
            let result = self.write_on_disk(disk, wc.buffered(), offset);
            if result.is_ok() {
                wc.reset();
                self.counters.ncache_flush += 1;
            }
            result
        };

        self.write_cache = Some(wc);

        result
    }

    /// Write `data` on the disk at user offset `offset` (synchronous).
    ///
    /// Grows the file first if the write would exceed the user extent.
    /// Advances the tracked disk-write offset on success.
    fn write_on_disk(&mut self, disk: &DiskManager, data: &[u8], offset: u64) -> Result<()> {
        debug_assert_eq!(offset, self.write_cache_offset);

        let begin = Instant::now();

        let nbytes = data.len() as u64;

        let end = offset + nbytes;
        if end > self.user_extent {
            self.overflow(disk, end - self.user_extent)?;
        }

        disk.write_at(offset + HEADER_SIZE, data)?;

        self.write_cache_offset += nbytes;

        self.counters.ndisk_write += 1;
        self.counters.bytes_written_on_disk += nbytes;
        self.counters.elapsed_disk_write_nanos += begin.elapsed().as_nanos() as u64;

        Ok(())
    }

    /// Grow the file to make room for `needed` more user bytes.
    ///
    /// Grows by at least half the current extent to amortize length
    /// changes, clamped to the configured maximum extent.
    fn overflow(&mut self, disk: &DiskManager, needed: u64) -> Result<()> {
        let required = self.extent + needed;

        let mut new_extent = required.max(self.extent + self.extent / 2);

        if self.maximum_extent > 0 {
            new_extent = new_extent.min(self.maximum_extent);

            if new_extent < required {
                return Err(StoreError::StoreFull {
                    needed,
                    maximum_extent: self.maximum_extent,
                });
            }
        }

        disk.set_len(new_extent)?;

        tracing::debug!(
            "extended store file: extent {} -> {}",
            self.extent,
            new_extent
        );

        self.extent = new_extent;
        self.user_extent = new_extent - HEADER_SIZE;

        Ok(())
    }

    /// Book a completed read request into the counters.
    fn finish_read(&mut self, begin: Instant, nbytes: u32) {
        self.counters.nreads += 1;
        self.counters.bytes_read += nbytes as u64;
        self.counters.max_read_size = self.counters.max_read_size.max(nbytes as u64);
        self.counters.elapsed_read_nanos += begin.elapsed().as_nanos() as u64;
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// =============================================================================
// Tests (channel-loss behavior needs the private disk handle)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    fn scratch_store(dir: &TempDir) -> WormStore {
        let config = Config::builder()
            .path(dir.path().join("store.dat"))
            .initial_extent(HEADER_SIZE + 4096)
            .build();
        WormStore::open(config).unwrap()
    }

    #[test]
    fn test_reader_survives_channel_loss() {
        let dir = TempDir::new().unwrap();
        let store = scratch_store(&dir);

        let addr = store.write(b"resilient").unwrap();
        store.force(false).unwrap();

        store.disk.close_channel();

        // The read falls through to disk, finds the channel gone, reopens
        // transparently, and succeeds.
        let bytes = store.read(addr).unwrap();
        assert_eq!(&bytes[..], b"resilient");
        assert_eq!(store.counters().nreopen, 1);
    }

    #[test]
    fn test_writer_fails_permanently_after_channel_loss() {
        let dir = TempDir::new().unwrap();
        let store = WormStore::open(
            Config::builder()
                .path(dir.path().join("store.dat"))
                .write_cache_enabled(false)
                .build(),
        )
        .unwrap();

        store.write(b"before").unwrap();

        store.disk.close_channel();

        // Writers never reopen: the write fails and keeps failing.
        let err = store.write(b"after").unwrap_err();
        assert!(matches!(err, StoreError::ChannelLost));

        let err = store.write(b"after again").unwrap_err();
        assert!(matches!(err, StoreError::ChannelLost));

        assert_eq!(store.counters().nreopen, 0);
    }

    #[test]
    fn test_buffered_writer_fails_at_flush_after_channel_loss() {
        let dir = TempDir::new().unwrap();
        let store = scratch_store(&dir);

        store.write(b"buffered").unwrap();

        store.disk.close_channel();

        // The record sits in the write cache; the loss surfaces when the
        // flush tries to reach the disk.
        let err = store.force(false).unwrap_err();
        assert!(matches!(err, StoreError::ChannelLost));
    }

    #[test]
    fn test_no_reopen_after_close() {
        let dir = TempDir::new().unwrap();
        let store = scratch_store(&dir);

        let addr = store.write(b"gone").unwrap();
        store.force(false).unwrap();
        store.close().unwrap();

        let err = store.read(addr).unwrap_err();
        assert!(matches!(err, StoreError::Closed));
    }
}
