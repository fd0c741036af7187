//! Record Addressing
//!
//! Packs a byte offset and a byte length into one fixed-width integer
//! handle and back.
//!
//! ## Responsibilities
//! - Encode `(offset, length)` into an opaque `Address`
//! - Decode an `Address` back into `(offset, length)`
//! - Reject values that exceed the configured bit budgets
//!
//! ## Layout
//! ```text
//! 63                                  length_bits                  0
//! ┌──────────────────────────────────┬───────────────────────────────┐
//! │ offset (offset_bits)             │ length (64 - offset_bits)     │
//! └──────────────────────────────────┴───────────────────────────────┘
//! ```
//!
//! The bit split is fixed when the store is created and is constant for the
//! life of the file. Offsets are relative to the start of the user data
//! region; the fixed file header is excluded. `Address(0)` is reserved as
//! the null address: a real record always has `length > 0`, so no encoded
//! address is ever zero.

use crate::error::{Result, StoreError};

/// Smallest permitted offset bit width (leaves 32 bits for record length).
pub const MIN_OFFSET_BITS: u8 = 32;

/// Largest permitted offset bit width (leaves 8 bits for record length).
pub const MAX_OFFSET_BITS: u8 = 56;

/// Opaque handle identifying a record in the store.
///
/// Addresses are never reused or mutated; the store is append-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(u64);

impl Address {
    /// The reserved null address. Never returned for a written record.
    pub const NULL: Address = Address(0);

    /// Reconstruct an address from its raw integer form (e.g. out of a
    /// root block or an external index).
    pub fn from_raw(raw: u64) -> Self {
        Address(raw)
    }

    /// The raw integer form of this address.
    pub fn as_raw(&self) -> u64 {
        self.0
    }

    /// True iff this is the reserved null address.
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

/// Encodes and decodes addresses for one store's bit split.
///
/// Pure; no I/O and no failure beyond range validation.
#[derive(Debug, Clone, Copy)]
pub struct AddressCodec {
    offset_bits: u8,
    length_bits: u8,
    max_offset: u64,
    max_length: u64,
}

impl AddressCodec {
    /// Create a codec for the given offset bit width.
    pub fn new(offset_bits: u8) -> Result<Self> {
        if !(MIN_OFFSET_BITS..=MAX_OFFSET_BITS).contains(&offset_bits) {
            return Err(StoreError::Config(format!(
                "offset_bits must be in [{}, {}], got {}",
                MIN_OFFSET_BITS, MAX_OFFSET_BITS, offset_bits
            )));
        }

        let length_bits = 64 - offset_bits;

        Ok(Self {
            offset_bits,
            length_bits,
            max_offset: (1u64 << offset_bits) - 1,
            max_length: (1u64 << length_bits) - 1,
        })
    }

    /// Pack an offset and a length into an address.
    ///
    /// Fails with `AddressOverflow` if either value exceeds its bit budget.
    pub fn encode(&self, offset: u64, length: u32) -> Result<Address> {
        let length = length as u64;

        if offset > self.max_offset || length > self.max_length {
            return Err(StoreError::AddressOverflow {
                offset,
                length,
                offset_bits: self.offset_bits,
                length_bits: self.length_bits,
            });
        }

        Ok(Address((offset << self.length_bits) | length))
    }

    /// Unpack an address into `(offset, length)`.
    ///
    /// The null address does not decode: it never names a written record.
    pub fn decode(&self, addr: Address) -> Result<(u64, u32)> {
        if addr.is_null() {
            return Err(StoreError::InvalidAddress(
                "null address".to_string(),
            ));
        }

        let offset = addr.0 >> self.length_bits;
        let length = (addr.0 & self.max_length) as u32;

        if length == 0 {
            return Err(StoreError::InvalidAddress(format!(
                "address {:#x} has zero length",
                addr.0
            )));
        }

        Ok((offset, length))
    }

    /// The number of bits assigned to the offset field.
    pub fn offset_bits(&self) -> u8 {
        self.offset_bits
    }

    /// The number of bits assigned to the length field.
    pub fn length_bits(&self) -> u8 {
        self.length_bits
    }

    /// The largest encodable offset.
    pub fn max_offset(&self) -> u64 {
        self.max_offset
    }

    /// The largest encodable record length.
    pub fn max_length(&self) -> u64 {
        self.max_length
    }
}
