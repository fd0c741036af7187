//! Error types for wormstore
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

/// Unified error type for wormstore operations
#[derive(Debug, Error)]
pub enum StoreError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A positioned write could not complete within the retry ceiling.
    #[error("short write not resolved after {attempts} attempts: {written} of {requested} bytes at offset {offset}")]
    RetriesExhausted {
        offset: u64,
        requested: usize,
        written: usize,
        attempts: u32,
    },

    /// The file channel was closed while a writer held in-flight state.
    /// Writers never reopen the channel; an interrupted writer must not
    /// silently resume.
    #[error("file channel lost; writes cannot resume")]
    ChannelLost,

    // -------------------------------------------------------------------------
    // Validation Errors
    // -------------------------------------------------------------------------
    #[error("record is empty; zero-length records are not allowed")]
    EmptyRecord,

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("store is read-only")]
    ReadOnly,

    #[error("store is closed")]
    Closed,

    #[error("truncate rejected: {0}")]
    Truncate(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    // -------------------------------------------------------------------------
    // Addressing Errors
    // -------------------------------------------------------------------------
    #[error("address overflow: offset={offset}, length={length} exceeds {offset_bits}/{length_bits} bit budget")]
    AddressOverflow {
        offset: u64,
        length: u64,
        offset_bits: u8,
        length_bits: u8,
    },

    // -------------------------------------------------------------------------
    // Capacity Errors
    // -------------------------------------------------------------------------
    #[error("store full: {needed} more bytes required but maximum extent is {maximum_extent}")]
    StoreFull { needed: u64, maximum_extent: u64 },

    // -------------------------------------------------------------------------
    // Format Errors
    // -------------------------------------------------------------------------
    #[error("store file corrupt: {0}")]
    Corrupt(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
