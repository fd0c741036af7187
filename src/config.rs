//! Configuration for wormstore
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::addr::{MAX_OFFSET_BITS, MIN_OFFSET_BITS};
use crate::error::{Result, StoreError};
use crate::rootblock::HEADER_SIZE;

/// Main configuration for a store instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // File Configuration
    // -------------------------------------------------------------------------
    /// Path of the single backing file. The whole store — header, both root
    /// block slots, and the append-only user data region — lives in this file.
    pub path: PathBuf,

    /// Open the store read-only. Writes, truncation, and root block commits
    /// are rejected; the write cache is never allocated.
    pub read_only: bool,

    /// Initial extent (total file size in bytes) when creating a new store.
    /// Must be at least the header size.
    pub initial_extent: u64,

    /// Maximum extent the file may grow to, in bytes. Zero means unbounded.
    pub maximum_extent: u64,

    // -------------------------------------------------------------------------
    // Addressing Configuration
    // -------------------------------------------------------------------------
    /// Number of bits of an address assigned to the record offset. The
    /// remaining bits hold the record length. Fixed at store creation and
    /// constant for the life of the file.
    pub offset_bits: u8,

    // -------------------------------------------------------------------------
    // Write Cache Configuration
    // -------------------------------------------------------------------------
    /// Whether writes are buffered in the write cache. When disabled every
    /// record is written directly to disk.
    pub write_cache_enabled: bool,

    /// Capacity of the write cache buffer in bytes.
    pub write_cache_capacity: usize,

    // -------------------------------------------------------------------------
    // Read Cache Configuration
    // -------------------------------------------------------------------------
    /// Number of records retained by the read cache. Zero disables the cache.
    pub read_cache_capacity: usize,

    /// Records at or above this size are never entered into the read cache.
    pub read_cache_max_record_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./wormstore.dat"),
            read_only: false,
            initial_extent: 10 * 1024 * 1024, // 10 MB
            maximum_extent: 0,                // unbounded
            offset_bits: 42,                  // 22 length bits (~4 MB records)
            write_cache_enabled: true,
            write_cache_capacity: 512 * 1024, // 512 KiB
            read_cache_capacity: 0,           // disabled
            read_cache_max_record_size: 8 * 1024,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Validate the configuration before opening a store
    pub fn validate(&self) -> Result<()> {
        if !(MIN_OFFSET_BITS..=MAX_OFFSET_BITS).contains(&self.offset_bits) {
            return Err(StoreError::Config(format!(
                "offset_bits must be in [{}, {}], got {}",
                MIN_OFFSET_BITS, MAX_OFFSET_BITS, self.offset_bits
            )));
        }

        if self.initial_extent < HEADER_SIZE {
            return Err(StoreError::Config(format!(
                "initial_extent {} is smaller than the store header ({} bytes)",
                self.initial_extent, HEADER_SIZE
            )));
        }

        if self.maximum_extent != 0 && self.maximum_extent < self.initial_extent {
            return Err(StoreError::Config(format!(
                "maximum_extent {} is smaller than initial_extent {}",
                self.maximum_extent, self.initial_extent
            )));
        }

        if self.write_cache_enabled && self.write_cache_capacity == 0 {
            return Err(StoreError::Config(
                "write cache enabled with zero capacity".to_string(),
            ));
        }

        if self.read_cache_capacity > 0 && self.read_cache_max_record_size == 0 {
            return Err(StoreError::Config(
                "read cache enabled with zero max record size".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the backing file path
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = path.into();
        self
    }

    /// Open the store read-only
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.config.read_only = read_only;
        self
    }

    /// Set the initial extent in bytes
    pub fn initial_extent(mut self, bytes: u64) -> Self {
        self.config.initial_extent = bytes;
        self
    }

    /// Set the maximum extent in bytes (0 = unbounded)
    pub fn maximum_extent(mut self, bytes: u64) -> Self {
        self.config.maximum_extent = bytes;
        self
    }

    /// Set the address offset/length bit split
    pub fn offset_bits(mut self, bits: u8) -> Self {
        self.config.offset_bits = bits;
        self
    }

    /// Enable or disable the write cache
    pub fn write_cache_enabled(mut self, enabled: bool) -> Self {
        self.config.write_cache_enabled = enabled;
        self
    }

    /// Set the write cache capacity in bytes
    pub fn write_cache_capacity(mut self, bytes: usize) -> Self {
        self.config.write_cache_capacity = bytes;
        self
    }

    /// Set the read cache capacity in records (0 = disabled)
    pub fn read_cache_capacity(mut self, records: usize) -> Self {
        self.config.read_cache_capacity = records;
        self
    }

    /// Set the largest record size admitted to the read cache
    pub fn read_cache_max_record_size(mut self, bytes: usize) -> Self {
        self.config.read_cache_max_record_size = bytes;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
