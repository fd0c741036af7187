//! Disk I/O Manager
//!
//! Owns the open file handle and performs all physical I/O.
//!
//! ## Responsibilities
//! - Positioned reads that loop until the full range is obtained
//! - Positioned writes that loop across OS short writes, with a bounded
//!   retry ceiling
//! - Durability barriers (`force`) and file length changes
//! - Transparent reopen of a lost channel — for readers only
//!
//! ## Reader/Writer Asymmetry
//! If a read finds the channel gone and the manager is still logically open,
//! the file is reopened and the read retried (bounded attempts). A write
//! never does this: an interrupted writer could otherwise resume and lay
//! down a second, inconsistent copy of in-flight state. The asymmetry is a
//! correctness policy, not an optimization.

use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind};
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use bytes::Bytes;
use parking_lot::RwLock;

use crate::error::{Result, StoreError};

/// Reopen attempts granted to a reader that keeps finding the channel gone.
const MAX_READ_ATTEMPTS: u32 = 3;

/// A positioned write failing to make complete progress for this many
/// syscalls is a fatal failure.
const MAX_WRITE_ATTEMPTS: u32 = 10_000;

/// Retry counts at which the write loop escalates its logging.
const WRITE_RETRY_WARN: u32 = 100;
const WRITE_RETRY_ERROR: u32 = 1_000;

/// Physical I/O counters, sampled into the store's statistics snapshot.
///
/// Atomics so the manager can count without borrowing the store's lock.
#[derive(Debug, Default)]
pub struct DiskCounters {
    /// #of positioned read syscalls issued.
    pub nreads: AtomicU64,

    /// #of positioned write syscalls issued.
    pub nwrites: AtomicU64,

    /// #of bytes read from the file.
    pub bytes_read: AtomicU64,

    /// #of bytes written to the file.
    pub bytes_written: AtomicU64,

    /// #of times the channel was transparently reopened for a reader.
    pub nreopen: AtomicU64,

    /// #of durability barriers issued.
    pub nforce: AtomicU64,

    /// #of file length changes (extensions and truncations).
    pub nextend: AtomicU64,
}

/// Owns the file handle; performs retry-safe positioned I/O.
pub struct DiskManager {
    /// Backing file path, kept for transparent reopen.
    path: PathBuf,

    /// Mode the file was opened in; reopen uses the same mode.
    read_only: bool,

    /// Whether the manager is logically open. A lost channel is only
    /// reopened while this is set; `close()` clears it first so a closed
    /// store can never resurrect its file handle.
    open: AtomicBool,

    /// The channel. `None` after an asynchronous close or `close()`.
    file: RwLock<Option<File>>,

    /// Physical I/O statistics.
    counters: DiskCounters,
}

impl DiskManager {
    /// Open (or create) the backing file.
    pub fn open(path: &Path, read_only: bool, create: bool) -> Result<Self> {
        let file = Self::open_file(path, read_only, create)?;

        Ok(Self {
            path: path.to_path_buf(),
            read_only,
            open: AtomicBool::new(true),
            file: RwLock::new(Some(file)),
            counters: DiskCounters::default(),
        })
    }

    /// Positioned read of exactly `len` bytes at `pos`.
    ///
    /// A single positioned-read call is not guaranteed to return the full
    /// range, so the read loops until the buffer is filled. Premature EOF is
    /// a hard failure. A missing channel triggers a bounded reopen-and-retry
    /// while the manager is logically open.
    pub fn read_at(&self, pos: u64, len: usize) -> Result<Bytes> {
        let mut buf = vec![0u8; len];

        for attempt in 0..MAX_READ_ATTEMPTS {
            {
                let guard = self.file.read();

                if let Some(file) = guard.as_ref() {
                    self.fill_from(file, pos, &mut buf)?;
                    return Ok(Bytes::from(buf));
                }
            }

            // Channel gone. Reopen (readers only) and retry, unless the
            // manager has been closed in the meantime.
            if attempt + 1 < MAX_READ_ATTEMPTS {
                self.reopen()?;
            }
        }

        Err(StoreError::Io(io::Error::new(
            ErrorKind::NotConnected,
            format!("channel lost reading {} bytes at {}", len, pos),
        )))
    }

    /// Positioned write of the whole buffer at `pos`.
    ///
    /// Loops across OS short writes, accumulating bytes actually written,
    /// until the buffer is fully on the file or the retry ceiling is hit.
    /// A missing channel is fatal: writers never reopen.
    pub fn write_at(&self, pos: u64, data: &[u8]) -> Result<()> {
        let guard = self.file.read();

        let file = guard.as_ref().ok_or(StoreError::ChannelLost)?;

        let mut written = 0usize;
        let mut attempts = 0u32;

        while written < data.len() {
            attempts += 1;

            if attempts > MAX_WRITE_ATTEMPTS {
                return Err(StoreError::RetriesExhausted {
                    offset: pos,
                    requested: data.len(),
                    written,
                    attempts,
                });
            }

            if attempts == WRITE_RETRY_WARN {
                tracing::warn!(
                    "writing on channel: remaining={}, attempts={}, written={}",
                    data.len() - written,
                    attempts,
                    written
                );
            } else if attempts == WRITE_RETRY_ERROR {
                tracing::error!(
                    "writing on channel: remaining={}, attempts={}, written={}",
                    data.len() - written,
                    attempts,
                    written
                );
            }

            match file.write_at(&data[written..], pos + written as u64) {
                Ok(0) => continue, // no progress; retry up to the ceiling
                Ok(n) => {
                    written += n;
                    self.counters.nwrites.fetch_add(1, Ordering::Relaxed);
                    self.counters
                        .bytes_written
                        .fetch_add(n as u64, Ordering::Relaxed);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }

    /// Force file contents to stable storage; `metadata` additionally
    /// forces file metadata (length, timestamps).
    pub fn force(&self, metadata: bool) -> Result<()> {
        let guard = self.file.read();

        let file = guard.as_ref().ok_or(StoreError::ChannelLost)?;

        if metadata {
            file.sync_all()?;
        } else {
            file.sync_data()?;
        }

        self.counters.nforce.fetch_add(1, Ordering::Relaxed);

        Ok(())
    }

    /// Change the file length (grow or shrink).
    pub fn set_len(&self, len: u64) -> Result<()> {
        let guard = self.file.read();

        let file = guard.as_ref().ok_or(StoreError::ChannelLost)?;

        file.set_len(len)?;

        self.counters.nextend.fetch_add(1, Ordering::Relaxed);

        Ok(())
    }

    /// The physical length of the backing file.
    pub fn len(&self) -> Result<u64> {
        let guard = self.file.read();

        let file = guard.as_ref().ok_or(StoreError::ChannelLost)?;

        Ok(file.metadata()?.len())
    }

    /// Drop the file handle without closing the manager, as an asynchronous
    /// close from an interrupted thread would. A subsequent read reopens the
    /// channel transparently; a subsequent write fails permanently.
    pub fn close_channel(&self) {
        *self.file.write() = None;
    }

    /// Close the manager: clear the logical-open flag first so no reader can
    /// reopen the channel afterwards, then release the handle.
    pub fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
        *self.file.write() = None;
    }

    /// True iff the manager is logically open.
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The physical I/O counters.
    pub fn counters(&self) -> &DiskCounters {
        &self.counters
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn open_file(path: &Path, read_only: bool, create: bool) -> Result<File> {
        let file = OpenOptions::new()
            .read(true)
            .write(!read_only)
            .create(create)
            .open(path)?;

        Ok(file)
    }

    /// Fill `buf` from the file at `pos`, looping across partial reads.
    fn fill_from(&self, file: &File, pos: u64, buf: &mut [u8]) -> Result<()> {
        let len = buf.len();
        let mut filled = 0usize;

        while filled < len {
            match file.read_at(&mut buf[filled..], pos + filled as u64) {
                Ok(0) => {
                    return Err(StoreError::Io(io::Error::new(
                        ErrorKind::UnexpectedEof,
                        format!(
                            "expected to read {} bytes at {} but hit end of file after {}",
                            len, pos, filled
                        ),
                    )));
                }
                Ok(n) => {
                    filled += n;
                    self.counters.nreads.fetch_add(1, Ordering::Relaxed);
                    self.counters
                        .bytes_read
                        .fetch_add(n as u64, Ordering::Relaxed);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }

    /// Reopen the channel for a reader.
    ///
    /// Serialized on the handle lock so concurrent readers do not race to
    /// open the file; whichever arrives second finds the channel restored.
    fn reopen(&self) -> Result<()> {
        if !self.is_open() {
            return Err(StoreError::Closed);
        }

        let mut guard = self.file.write();

        if guard.is_some() {
            // Another reader beat us to it.
            return Ok(());
        }

        let file = Self::open_file(&self.path, self.read_only, false)?;

        tracing::warn!("re-opened store file: {}", self.path.display());

        *guard = Some(file);

        self.counters.nreopen.fetch_add(1, Ordering::Relaxed);

        Ok(())
    }
}
