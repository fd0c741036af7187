//! Tests for the address codec
//!
//! These tests verify:
//! - Round-trip encoding/decoding of (offset, length) pairs
//! - Bit-budget validation on both fields
//! - Null address handling
//! - Codec construction limits

use wormstore::addr::{Address, AddressCodec, MAX_OFFSET_BITS, MIN_OFFSET_BITS};
use wormstore::StoreError;

// =============================================================================
// Round-trip Tests
// =============================================================================

#[test]
fn test_encode_decode_round_trip() {
    let codec = AddressCodec::new(42).unwrap();

    for &(offset, length) in &[
        (0u64, 1u32),
        (1, 1),
        (4096, 512),
        (codec.max_offset(), 1),
        (0, codec.max_length() as u32),
        (codec.max_offset(), codec.max_length() as u32),
    ] {
        let addr = codec.encode(offset, length).unwrap();
        assert_eq!(codec.decode(addr).unwrap(), (offset, length));
    }
}

#[test]
fn test_distinct_pairs_encode_distinct_addresses() {
    let codec = AddressCodec::new(42).unwrap();

    let a = codec.encode(100, 10).unwrap();
    let b = codec.encode(110, 10).unwrap();
    let c = codec.encode(100, 11).unwrap();

    assert_ne!(a, b);
    assert_ne!(a, c);
    assert_ne!(b, c);
}

// =============================================================================
// Range Validation Tests
// =============================================================================

#[test]
fn test_encode_offset_overflow() {
    let codec = AddressCodec::new(MIN_OFFSET_BITS).unwrap();

    let result = codec.encode(codec.max_offset() + 1, 1);
    assert!(matches!(result, Err(StoreError::AddressOverflow { .. })));
}

#[test]
fn test_encode_length_overflow() {
    let codec = AddressCodec::new(MAX_OFFSET_BITS).unwrap();

    // 56 offset bits leave 8 length bits: 256 does not fit.
    assert_eq!(codec.max_length(), 255);
    let result = codec.encode(0, 256);
    assert!(matches!(result, Err(StoreError::AddressOverflow { .. })));
}

#[test]
fn test_encode_at_exact_budget_succeeds() {
    let codec = AddressCodec::new(MAX_OFFSET_BITS).unwrap();

    let addr = codec.encode(codec.max_offset(), 255).unwrap();
    assert_eq!(codec.decode(addr).unwrap(), (codec.max_offset(), 255));
}

// =============================================================================
// Null Address Tests
// =============================================================================

#[test]
fn test_null_address_does_not_decode() {
    let codec = AddressCodec::new(42).unwrap();

    assert!(Address::NULL.is_null());
    let result = codec.decode(Address::NULL);
    assert!(matches!(result, Err(StoreError::InvalidAddress(_))));
}

#[test]
fn test_encoded_addresses_are_never_null() {
    let codec = AddressCodec::new(42).unwrap();

    // Offset zero with any valid length still yields a non-null handle.
    let addr = codec.encode(0, 1).unwrap();
    assert!(!addr.is_null());
}

#[test]
fn test_zero_length_raw_address_is_rejected() {
    let codec = AddressCodec::new(42).unwrap();

    // A corrupted handle with a non-zero offset but zero length.
    let raw = 7u64 << codec.length_bits();
    let result = codec.decode(Address::from_raw(raw));
    assert!(matches!(result, Err(StoreError::InvalidAddress(_))));
}

// =============================================================================
// Construction Tests
// =============================================================================

#[test]
fn test_codec_rejects_out_of_range_bit_splits() {
    assert!(AddressCodec::new(MIN_OFFSET_BITS - 1).is_err());
    assert!(AddressCodec::new(MAX_OFFSET_BITS + 1).is_err());
    assert!(AddressCodec::new(MIN_OFFSET_BITS).is_ok());
    assert!(AddressCodec::new(MAX_OFFSET_BITS).is_ok());
}

#[test]
fn test_raw_round_trip() {
    let codec = AddressCodec::new(40).unwrap();

    let addr = codec.encode(12345, 678).unwrap();
    let restored = Address::from_raw(addr.as_raw());
    assert_eq!(addr, restored);
    assert_eq!(codec.decode(restored).unwrap(), (12345, 678));
}
