//! Tests for the root block commit protocol primitives
//!
//! These tests verify:
//! - Serialization round-trips with slot tagging
//! - CRC rejection of torn blocks
//! - Slot alternation and fixed file offsets
//! - Current-slot selection by commit counter
//! - File preamble validation

use wormstore::addr::Address;
use wormstore::rootblock::{
    choose_current, pack_preamble, parse_preamble, RootBlock, RootBlockSlot, HEADER_SIZE,
    OFFSET_ROOT_BLOCK0, OFFSET_ROOT_BLOCK1, ROOT_BLOCK_BYTES,
};
use wormstore::StoreError;

// =============================================================================
// Helper Functions
// =============================================================================

fn sample_block(commit_counter: u64) -> RootBlock {
    RootBlock {
        commit_counter,
        next_offset: 4096,
        extent: 1024 * 1024,
        root_addr: Address::from_raw(0xDEAD_BEEF),
        commit_time_millis: 1_700_000_000_000,
    }
}

// =============================================================================
// Serialization Tests
// =============================================================================

#[test]
fn test_root_block_round_trip() {
    let block = sample_block(7);

    for slot in [RootBlockSlot::Zero, RootBlockSlot::One] {
        let buf = block.to_bytes(slot);
        assert_eq!(buf.len() as u64, ROOT_BLOCK_BYTES);

        let (parsed, parsed_slot) = RootBlock::from_bytes(&buf).unwrap();
        assert_eq!(parsed, block);
        assert_eq!(parsed_slot, slot);
    }
}

#[test]
fn test_torn_block_fails_crc() {
    let block = sample_block(3);
    let mut buf = block.to_bytes(RootBlockSlot::Zero);

    // Flip one payload byte, as a partial write would.
    buf[20] ^= 0xFF;

    let result = RootBlock::from_bytes(&buf);
    assert!(matches!(result, Err(StoreError::Corrupt(_))));
}

#[test]
fn test_bad_magic_is_corrupt() {
    let block = sample_block(3);
    let mut buf = block.to_bytes(RootBlockSlot::Zero);

    buf[0] = b'X';

    let result = RootBlock::from_bytes(&buf);
    assert!(matches!(result, Err(StoreError::Corrupt(_))));
}

#[test]
fn test_wrong_length_is_corrupt() {
    let result = RootBlock::from_bytes(&[0u8; 32]);
    assert!(matches!(result, Err(StoreError::Corrupt(_))));
}

// =============================================================================
// Slot Tests
// =============================================================================

#[test]
fn test_slot_alternation() {
    assert_eq!(RootBlockSlot::Zero.alternate(), RootBlockSlot::One);
    assert_eq!(RootBlockSlot::One.alternate(), RootBlockSlot::Zero);
}

#[test]
fn test_slot_offsets_are_fixed_and_inside_header() {
    assert_eq!(RootBlockSlot::Zero.file_offset(), OFFSET_ROOT_BLOCK0);
    assert_eq!(RootBlockSlot::One.file_offset(), OFFSET_ROOT_BLOCK1);
    assert_eq!(OFFSET_ROOT_BLOCK1 - OFFSET_ROOT_BLOCK0, ROOT_BLOCK_BYTES);
    assert!(OFFSET_ROOT_BLOCK1 + ROOT_BLOCK_BYTES <= HEADER_SIZE);
}

// =============================================================================
// Current-Slot Selection Tests
// =============================================================================

#[test]
fn test_choose_current_prefers_larger_counter() {
    let (block, slot) = choose_current(Some(sample_block(4)), Some(sample_block(5))).unwrap();
    assert_eq!(block.commit_counter, 5);
    assert_eq!(slot, RootBlockSlot::One);

    let (block, slot) = choose_current(Some(sample_block(6)), Some(sample_block(5))).unwrap();
    assert_eq!(block.commit_counter, 6);
    assert_eq!(slot, RootBlockSlot::Zero);
}

#[test]
fn test_choose_current_equal_counters_adopts_slot_zero() {
    let (_, slot) = choose_current(Some(sample_block(0)), Some(sample_block(0))).unwrap();
    assert_eq!(slot, RootBlockSlot::Zero);
}

#[test]
fn test_choose_current_skips_torn_slot() {
    let (block, slot) = choose_current(None, Some(sample_block(9))).unwrap();
    assert_eq!(block.commit_counter, 9);
    assert_eq!(slot, RootBlockSlot::One);

    let (_, slot) = choose_current(Some(sample_block(9)), None).unwrap();
    assert_eq!(slot, RootBlockSlot::Zero);

    assert!(choose_current(None, None).is_none());
}

// =============================================================================
// Preamble Tests
// =============================================================================

#[test]
fn test_preamble_round_trip() {
    let buf = pack_preamble(42);
    assert_eq!(parse_preamble(&buf).unwrap(), 42);
}

#[test]
fn test_preamble_bad_magic() {
    let mut buf = pack_preamble(42);
    buf[0] = b'?';

    let result = parse_preamble(&buf);
    assert!(matches!(result, Err(StoreError::Corrupt(_))));
}
