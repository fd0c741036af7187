//! Store Instrumentation
//!
//! Counters for record access, including operations that read or write
//! through to the underlying file.
//!
//! Store-level counters are plain integers mutated inside the instance-wide
//! critical section; physical I/O counters live as atomics inside the disk
//! manager. `CountersSnapshot` merges both into one read-only, serializable
//! view — the observability hook exposed to collaborators.

use std::sync::atomic::Ordering;

use serde::Serialize;

use crate::disk::DiskCounters;

/// Mutable store-level counters. Updated only while the instance lock is
/// held, so plain integers suffice.
#[derive(Debug, Default)]
pub struct Counters {
    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------
    /// #of read requests.
    pub nreads: u64,

    /// #of read requests satisfied by the write cache.
    pub ncache_read: u64,

    /// #of read requests that read through to the backing file.
    pub ndisk_read: u64,

    /// #of bytes returned to readers.
    pub bytes_read: u64,

    /// #of bytes read from the disk.
    pub bytes_read_from_disk: u64,

    /// The size of the largest record read.
    pub max_read_size: u64,

    /// Total elapsed time for reads.
    pub elapsed_read_nanos: u64,

    /// Total elapsed time reading on the disk.
    pub elapsed_disk_read_nanos: u64,

    // -------------------------------------------------------------------------
    // Writes
    // -------------------------------------------------------------------------
    /// #of write requests.
    pub nwrites: u64,

    /// #of write requests absorbed by the write cache.
    pub ncache_write: u64,

    /// #of times the write cache was flushed to disk.
    pub ncache_flush: u64,

    /// #of user-data write operations that reached the disk (flushes and
    /// direct writes of oversized records).
    pub ndisk_write: u64,

    /// #of bytes accepted from writers.
    pub bytes_written: u64,

    /// #of user-data bytes written on the disk.
    pub bytes_written_on_disk: u64,

    /// The size of the largest record written.
    pub max_write_size: u64,

    /// Total elapsed time for writes.
    pub elapsed_write_nanos: u64,

    /// Total elapsed time writing on the disk.
    pub elapsed_disk_write_nanos: u64,

    // -------------------------------------------------------------------------
    // Other
    // -------------------------------------------------------------------------
    /// #of times `force` was requested.
    pub nforce: u64,

    /// #of explicit extent changes via `truncate`.
    pub ntruncate: u64,

    /// #of root block commits.
    pub nwrite_root_block: u64,
}

/// Read-only, serializable view over all store statistics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CountersSnapshot {
    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------
    pub nreads: u64,
    pub ncache_read: u64,
    pub ndisk_read: u64,
    pub bytes_read: u64,
    pub bytes_read_from_disk: u64,
    pub max_read_size: u64,
    pub elapsed_read_nanos: u64,
    pub elapsed_disk_read_nanos: u64,

    // -------------------------------------------------------------------------
    // Writes
    // -------------------------------------------------------------------------
    pub nwrites: u64,
    pub ncache_write: u64,
    pub ncache_flush: u64,
    pub ndisk_write: u64,
    pub bytes_written: u64,
    pub bytes_written_on_disk: u64,
    pub max_write_size: u64,
    pub elapsed_write_nanos: u64,
    pub elapsed_disk_write_nanos: u64,

    // -------------------------------------------------------------------------
    // Read Cache
    // -------------------------------------------------------------------------
    pub read_cache_test_count: u64,
    pub read_cache_hit_count: u64,
    pub read_cache_insert_count: u64,
    pub read_cache_len: u64,

    // -------------------------------------------------------------------------
    // Physical I/O
    // -------------------------------------------------------------------------
    /// #of positioned read syscalls issued (partial reads count each).
    pub ndisk_read_calls: u64,

    /// #of positioned write syscalls issued (short writes count each).
    pub ndisk_write_calls: u64,

    /// #of times the channel was transparently reopened for a reader.
    pub nreopen: u64,

    /// #of file length changes (overflow growth and truncation).
    pub nextend: u64,

    // -------------------------------------------------------------------------
    // Other
    // -------------------------------------------------------------------------
    pub nforce: u64,
    pub ntruncate: u64,
    pub nwrite_root_block: u64,
    pub write_cache_capacity: u64,
    pub read_cache_capacity: u64,
}

impl Counters {
    /// Merge these counters with the disk-level atomics into a snapshot.
    /// Read-cache fields are filled in by the store, which owns that cache.
    pub fn snapshot(&self, disk: &DiskCounters) -> CountersSnapshot {
        CountersSnapshot {
            nreads: self.nreads,
            ncache_read: self.ncache_read,
            ndisk_read: self.ndisk_read,
            bytes_read: self.bytes_read,
            bytes_read_from_disk: self.bytes_read_from_disk,
            max_read_size: self.max_read_size,
            elapsed_read_nanos: self.elapsed_read_nanos,
            elapsed_disk_read_nanos: self.elapsed_disk_read_nanos,

            nwrites: self.nwrites,
            ncache_write: self.ncache_write,
            ncache_flush: self.ncache_flush,
            ndisk_write: self.ndisk_write,
            bytes_written: self.bytes_written,
            bytes_written_on_disk: self.bytes_written_on_disk,
            max_write_size: self.max_write_size,
            elapsed_write_nanos: self.elapsed_write_nanos,
            elapsed_disk_write_nanos: self.elapsed_disk_write_nanos,

            read_cache_test_count: 0,
            read_cache_hit_count: 0,
            read_cache_insert_count: 0,
            read_cache_len: 0,

            ndisk_read_calls: disk.nreads.load(Ordering::Relaxed),
            ndisk_write_calls: disk.nwrites.load(Ordering::Relaxed),
            nreopen: disk.nreopen.load(Ordering::Relaxed),
            nextend: disk.nextend.load(Ordering::Relaxed),

            nforce: self.nforce,
            ntruncate: self.ntruncate,
            nwrite_root_block: self.nwrite_root_block,
            write_cache_capacity: 0,
            read_cache_capacity: 0,
        }
    }
}

impl CountersSnapshot {
    /// Fraction of reads served out of the write cache.
    pub fn read_hit_rate(&self) -> f64 {
        if self.nreads == 0 {
            0.0
        } else {
            self.ncache_read as f64 / self.nreads as f64
        }
    }

    /// Fraction of writes absorbed by the write cache rather than written
    /// through to the disk. Less than 1.0 only when oversized records
    /// bypass the cache (or the cache is disabled).
    pub fn write_hit_rate(&self) -> f64 {
        if self.nwrites == 0 {
            0.0
        } else {
            self.ncache_write as f64 / self.nwrites as f64
        }
    }

    /// Fraction of read-cache lookups that hit.
    pub fn read_cache_hit_rate(&self) -> f64 {
        if self.read_cache_test_count == 0 {
            0.0
        } else {
            self.read_cache_hit_count as f64 / self.read_cache_test_count as f64
        }
    }

    /// Total read time in seconds.
    pub fn read_secs(&self) -> f64 {
        self.elapsed_read_nanos as f64 / 1_000_000_000.0
    }

    /// Total write time in seconds.
    pub fn write_secs(&self) -> f64 {
        self.elapsed_write_nanos as f64 / 1_000_000_000.0
    }

    /// Read throughput in bytes per second.
    pub fn bytes_read_per_sec(&self) -> f64 {
        let secs = self.read_secs();
        if secs == 0.0 {
            0.0
        } else {
            self.bytes_read as f64 / secs
        }
    }

    /// Write throughput in bytes per second.
    pub fn bytes_written_per_sec(&self) -> f64 {
        let secs = self.write_secs();
        if secs == 0.0 {
            0.0
        } else {
            self.bytes_written as f64 / secs
        }
    }
}
