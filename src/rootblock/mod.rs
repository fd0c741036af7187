//! Root Block / Commit Protocol
//!
//! Two fixed-position root block slots inside the file header carry the
//! durable store state: commit counter, next free offset, extent, and the
//! caller's root record address. Commits alternate between the slots, so a
//! crash mid-write to one slot never destroys the other — recovery picks
//! the slot with the most recent valid commit marker and the losing slot is
//! always a prior consistent state, never a half-written one.
//!
//! ## File Layout
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ magic (4) │ version (2) │ offset_bits │ pad  │  0..8
//! ├──────────────────────────────────────────────┤
//! │ root block slot 0 (64 bytes)                 │  8..72
//! ├──────────────────────────────────────────────┤
//! │ root block slot 1 (64 bytes)                 │  72..136
//! ├──────────────────────────────────────────────┤
//! │ user data region (append-only)               │  136..
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Root Block Format (64 bytes)
//! ```text
//! ┌───────────┬─────────┬──────┬─────┬─────────────────┬─────────────┐
//! │ magic (4) │ ver (2) │ slot │ pad │ commit_counter  │ next_offset │
//! ├───────────┴─────────┴──────┴─────┼─────────────────┼─────────────┤
//! │ extent (8) │ root_addr (8)       │ commit_time (8) │ pad (12)    │
//! ├────────────┴─────────────────────┴─────────────────┴─────────────┤
//! │ crc32 over bytes 0..60 (4)                                       │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//! A torn slot fails its CRC and is ignored by recovery.

use crate::addr::Address;
use crate::error::{Result, StoreError};

/// File magic identifying a wormstore backing file.
pub const MAGIC: &[u8; 4] = b"WORM";

/// Store format version.
pub const FORMAT_VERSION: u16 = 1;

/// Magic prefixing each serialized root block.
const ROOT_BLOCK_MAGIC: &[u8; 4] = b"RBLK";

/// Size of the fixed file preamble (magic, version, offset bits, padding).
pub const FILE_PREAMBLE_BYTES: u64 = 8;

/// Size of one serialized root block.
pub const ROOT_BLOCK_BYTES: u64 = 64;

/// File offset of root block slot 0.
pub const OFFSET_ROOT_BLOCK0: u64 = FILE_PREAMBLE_BYTES;

/// File offset of root block slot 1.
pub const OFFSET_ROOT_BLOCK1: u64 = FILE_PREAMBLE_BYTES + ROOT_BLOCK_BYTES;

/// Total header size. User offset 0 is the first byte after the header;
/// all record offsets exclude this region.
pub const HEADER_SIZE: u64 = FILE_PREAMBLE_BYTES + 2 * ROOT_BLOCK_BYTES;

/// Byte range of the serialized block covered by the trailing CRC.
const CRC_RANGE: usize = 60;

/// Which of the two fixed root block slots a block occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootBlockSlot {
    Zero,
    One,
}

impl RootBlockSlot {
    /// The other slot — the target of the next commit.
    pub fn alternate(&self) -> Self {
        match self {
            RootBlockSlot::Zero => RootBlockSlot::One,
            RootBlockSlot::One => RootBlockSlot::Zero,
        }
    }

    /// The fixed file offset of this slot.
    pub fn file_offset(&self) -> u64 {
        match self {
            RootBlockSlot::Zero => OFFSET_ROOT_BLOCK0,
            RootBlockSlot::One => OFFSET_ROOT_BLOCK1,
        }
    }

    fn discriminator(&self) -> u8 {
        match self {
            RootBlockSlot::Zero => 0,
            RootBlockSlot::One => 1,
        }
    }

    fn from_discriminator(byte: u8) -> Result<Self> {
        match byte {
            0 => Ok(RootBlockSlot::Zero),
            1 => Ok(RootBlockSlot::One),
            other => Err(StoreError::Corrupt(format!(
                "invalid root block slot discriminator: {}",
                other
            ))),
        }
    }
}

/// Whether and how far a root block write forces the file to stable storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForcePolicy {
    /// Do not force; the caller sequences durability itself.
    None,

    /// Force file data.
    ForceData,

    /// Force file data and metadata.
    ForceDataAndMetadata,
}

/// Durable store state as published by one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootBlock {
    /// Strictly increasing across commits; recovery prefers the valid slot
    /// with the larger counter.
    pub commit_counter: u64,

    /// The offset at which the next record will be appended.
    pub next_offset: u64,

    /// Total file size at commit time.
    pub extent: u64,

    /// Address of the caller's root record (its entry point into the data),
    /// or the null address before the first commit.
    pub root_addr: Address,

    /// Wall-clock commit time in milliseconds since the epoch.
    pub commit_time_millis: u64,
}

impl RootBlock {
    /// Serialize into a slot-tagged 64-byte block with a trailing CRC.
    pub fn to_bytes(&self, slot: RootBlockSlot) -> [u8; ROOT_BLOCK_BYTES as usize] {
        let mut buf = [0u8; ROOT_BLOCK_BYTES as usize];

        buf[0..4].copy_from_slice(ROOT_BLOCK_MAGIC);
        buf[4..6].copy_from_slice(&FORMAT_VERSION.to_le_bytes());
        buf[6] = slot.discriminator();
        // buf[7] reserved
        buf[8..16].copy_from_slice(&self.commit_counter.to_le_bytes());
        buf[16..24].copy_from_slice(&self.next_offset.to_le_bytes());
        buf[24..32].copy_from_slice(&self.extent.to_le_bytes());
        buf[32..40].copy_from_slice(&self.root_addr.as_raw().to_le_bytes());
        buf[40..48].copy_from_slice(&self.commit_time_millis.to_le_bytes());
        // buf[48..60] reserved

        let crc = crc32fast::hash(&buf[..CRC_RANGE]);
        buf[CRC_RANGE..].copy_from_slice(&crc.to_le_bytes());

        buf
    }

    /// Parse and validate a serialized root block.
    ///
    /// Fails with `Corrupt` on bad magic, unsupported version, an invalid
    /// slot byte, or a CRC mismatch (a torn write).
    pub fn from_bytes(buf: &[u8]) -> Result<(RootBlock, RootBlockSlot)> {
        if buf.len() != ROOT_BLOCK_BYTES as usize {
            return Err(StoreError::Corrupt(format!(
                "root block must be {} bytes, got {}",
                ROOT_BLOCK_BYTES,
                buf.len()
            )));
        }

        if &buf[0..4] != ROOT_BLOCK_MAGIC {
            return Err(StoreError::Corrupt(format!(
                "invalid root block magic: {:?}",
                &buf[0..4]
            )));
        }

        let version = u16::from_le_bytes(buf[4..6].try_into().unwrap());
        if version != FORMAT_VERSION {
            return Err(StoreError::Corrupt(format!(
                "unsupported root block version: {}",
                version
            )));
        }

        let stored_crc = u32::from_le_bytes(buf[CRC_RANGE..].try_into().unwrap());
        let computed_crc = crc32fast::hash(&buf[..CRC_RANGE]);
        if stored_crc != computed_crc {
            return Err(StoreError::Corrupt(format!(
                "root block CRC mismatch: stored {:#010x}, computed {:#010x}",
                stored_crc, computed_crc
            )));
        }

        let slot = RootBlockSlot::from_discriminator(buf[6])?;

        let block = RootBlock {
            commit_counter: u64::from_le_bytes(buf[8..16].try_into().unwrap()),
            next_offset: u64::from_le_bytes(buf[16..24].try_into().unwrap()),
            extent: u64::from_le_bytes(buf[24..32].try_into().unwrap()),
            root_addr: Address::from_raw(u64::from_le_bytes(buf[32..40].try_into().unwrap())),
            commit_time_millis: u64::from_le_bytes(buf[40..48].try_into().unwrap()),
        };

        Ok((block, slot))
    }
}

/// Pick the current commit from the two slots.
///
/// Exactly one slot is the most recently committed state: the valid block
/// with the larger commit counter wins. A slot that failed to parse (torn
/// by a crash) is simply not a candidate. Equal counters only occur on a
/// freshly created store, where both slots are identical; slot 0 is adopted.
pub fn choose_current(
    slot0: Option<RootBlock>,
    slot1: Option<RootBlock>,
) -> Option<(RootBlock, RootBlockSlot)> {
    match (slot0, slot1) {
        (Some(b0), Some(b1)) => {
            if b1.commit_counter > b0.commit_counter {
                Some((b1, RootBlockSlot::One))
            } else {
                Some((b0, RootBlockSlot::Zero))
            }
        }
        (Some(b0), None) => Some((b0, RootBlockSlot::Zero)),
        (None, Some(b1)) => Some((b1, RootBlockSlot::One)),
        (None, None) => None,
    }
}

// =============================================================================
// File Preamble
// =============================================================================

/// Serialize the fixed file preamble.
pub fn pack_preamble(offset_bits: u8) -> [u8; FILE_PREAMBLE_BYTES as usize] {
    let mut buf = [0u8; FILE_PREAMBLE_BYTES as usize];

    buf[0..4].copy_from_slice(MAGIC);
    buf[4..6].copy_from_slice(&FORMAT_VERSION.to_le_bytes());
    buf[6] = offset_bits;
    // buf[7] reserved

    buf
}

/// Parse and validate the file preamble, returning the persisted offset
/// bit width.
pub fn parse_preamble(buf: &[u8]) -> Result<u8> {
    if buf.len() != FILE_PREAMBLE_BYTES as usize {
        return Err(StoreError::Corrupt(format!(
            "file preamble must be {} bytes, got {}",
            FILE_PREAMBLE_BYTES,
            buf.len()
        )));
    }

    if &buf[0..4] != MAGIC {
        return Err(StoreError::Corrupt(format!(
            "invalid store magic: expected WORM, got {:?}",
            &buf[0..4]
        )));
    }

    let version = u16::from_le_bytes(buf[4..6].try_into().unwrap());
    if version != FORMAT_VERSION {
        return Err(StoreError::Corrupt(format!(
            "unsupported store version: {}",
            version
        )));
    }

    Ok(buf[6])
}
