//! Tests for the disk I/O manager
//!
//! These tests verify:
//! - Positioned writes and full-range positioned reads
//! - Premature EOF handling
//! - Transparent channel reopen for readers
//! - Permanent write failure after channel loss (no reopen for writers)
//! - Lifecycle: no reopen after close

use std::path::PathBuf;

use tempfile::TempDir;
use wormstore::disk::DiskManager;
use wormstore::StoreError;

// =============================================================================
// Helper Functions
// =============================================================================

fn scratch_file() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("disk.dat");
    (dir, path)
}

// =============================================================================
// Positioned I/O Tests
// =============================================================================

#[test]
fn test_write_then_read_at_offset() {
    let (_dir, path) = scratch_file();
    let disk = DiskManager::open(&path, false, true).unwrap();

    disk.write_at(100, b"positioned").unwrap();

    let bytes = disk.read_at(100, 10).unwrap();
    assert_eq!(&bytes[..], b"positioned");
}

#[test]
fn test_read_sub_range() {
    let (_dir, path) = scratch_file();
    let disk = DiskManager::open(&path, false, true).unwrap();

    disk.write_at(0, b"abcdefgh").unwrap();

    let bytes = disk.read_at(2, 4).unwrap();
    assert_eq!(&bytes[..], b"cdef");
}

#[test]
fn test_read_past_end_of_file_fails() {
    let (_dir, path) = scratch_file();
    let disk = DiskManager::open(&path, false, true).unwrap();

    disk.write_at(0, b"short").unwrap();

    let result = disk.read_at(0, 100);
    assert!(matches!(result, Err(StoreError::Io(_))));
}

#[test]
fn test_set_len_and_len() {
    let (_dir, path) = scratch_file();
    let disk = DiskManager::open(&path, false, true).unwrap();

    disk.set_len(4096).unwrap();
    assert_eq!(disk.len().unwrap(), 4096);

    disk.set_len(1024).unwrap();
    assert_eq!(disk.len().unwrap(), 1024);
}

#[test]
fn test_force_succeeds() {
    let (_dir, path) = scratch_file();
    let disk = DiskManager::open(&path, false, true).unwrap();

    disk.write_at(0, b"durable").unwrap();
    disk.force(false).unwrap();
    disk.force(true).unwrap();
}

// =============================================================================
// Channel Loss Tests
// =============================================================================

#[test]
fn test_reader_reopens_lost_channel() {
    let (_dir, path) = scratch_file();
    let disk = DiskManager::open(&path, false, true).unwrap();

    disk.write_at(0, b"survives").unwrap();

    disk.close_channel();

    // The reader transparently reopens the file and retries.
    let bytes = disk.read_at(0, 8).unwrap();
    assert_eq!(&bytes[..], b"survives");
    assert_eq!(
        disk.counters().nreopen.load(std::sync::atomic::Ordering::Relaxed),
        1
    );
}

#[test]
fn test_writer_never_reopens_lost_channel() {
    let (_dir, path) = scratch_file();
    let disk = DiskManager::open(&path, false, true).unwrap();

    disk.write_at(0, b"before").unwrap();

    disk.close_channel();

    // Writers fail permanently; no transparent resume.
    let result = disk.write_at(6, b"after");
    assert!(matches!(result, Err(StoreError::ChannelLost)));

    let result = disk.force(false);
    assert!(matches!(result, Err(StoreError::ChannelLost)));

    assert_eq!(
        disk.counters().nreopen.load(std::sync::atomic::Ordering::Relaxed),
        0
    );
}

#[test]
fn test_reader_recovers_then_writer_still_fails_until_next_reopen() {
    let (_dir, path) = scratch_file();
    let disk = DiskManager::open(&path, false, true).unwrap();

    disk.write_at(0, b"payload!").unwrap();
    disk.close_channel();

    // A read restores the channel for everyone.
    assert_eq!(&disk.read_at(0, 8).unwrap()[..], b"payload!");

    // The restored channel serves writers again; the fatality applies only
    // while the channel is gone.
    disk.write_at(8, b"more").unwrap();
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_closed_manager_does_not_reopen() {
    let (_dir, path) = scratch_file();
    let disk = DiskManager::open(&path, false, true).unwrap();

    disk.write_at(0, b"bytes").unwrap();
    disk.close();

    assert!(!disk.is_open());

    let result = disk.read_at(0, 5);
    assert!(matches!(result, Err(StoreError::Closed)));

    let result = disk.write_at(0, b"nope");
    assert!(matches!(result, Err(StoreError::ChannelLost)));
}

#[test]
fn test_open_missing_file_without_create_fails() {
    let (_dir, path) = scratch_file();

    let result = DiskManager::open(&path, false, false);
    assert!(matches!(result, Err(StoreError::Io(_))));
}
