//! # wormstore
//!
//! A record-oriented, append-only storage engine with:
//! - Compact integer addresses packing a record's offset and length
//! - A write-back cache turning small appends into large sequential writes
//! - An optional LRU read cache populated only from disk reads
//! - Crash-atomic commits via two alternating root block slots
//!
//! ## Architecture Overview
//!
//! ```text
//!            write(bytes) ──────────────┐        read(addr)
//!                                       │            │
//! ┌─────────────────────────────────────▼────────────▼────────────────┐
//! │                          WormStore                                │
//! │                  (instance-wide critical section)                 │
//! └──────┬──────────────────────┬──────────────────────┬──────────────┘
//!        │                      │                      │
//!        ▼                      ▼                      ▼
//! ┌─────────────┐        ┌─────────────┐        ┌─────────────┐
//! │ WriteCache  │        │  ReadCache  │        │ RootBlocks  │
//! │ (buffer +   │        │   (LRU)     │        │ (2 slots,   │
//! │  index)     │        │             │        │  alternate) │
//! └──────┬──────┘        └──────▲──────┘        └──────┬──────┘
//!        │ flush                │ miss-fill            │ commit
//!        ▼                      │                      ▼
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        DiskManager                               │
//! │        (retry-safe positioned I/O, reader-only reopen)           │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Writes flow one way (caller → write cache → disk); reads consult the
//! read cache, the write cache, and the disk in that order, first hit wins.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod addr;
pub mod cache;
pub mod disk;
pub mod rootblock;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, StoreError};
pub use config::{Config, ConfigBuilder};
pub use addr::{Address, AddressCodec};
pub use rootblock::{ForcePolicy, RootBlock, RootBlockSlot};
pub use store::{CountersSnapshot, StoreState, WormStore};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of wormstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
