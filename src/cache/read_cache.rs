//! Read Cache
//!
//! A bounded least-recently-used mapping from address to an owned byte copy.
//!
//! Entries are inserted only after a confirmed disk read — never for freshly
//! written records, which the write cache already serves. The record-size
//! ceiling is applied by the buffer strategy at its single disk-read site,
//! so this structure stays a plain bounded map.
//!
//! Recency is tracked with a monotonic tick per entry plus an ordered
//! tick → address map, which keeps eviction O(log n) without unsafe
//! linked-list plumbing.

use std::collections::{BTreeMap, HashMap};

use bytes::Bytes;

use crate::addr::Address;

struct Entry {
    bytes: Bytes,
    tick: u64,
}

/// Bounded LRU cache of recently disk-read records.
pub struct ReadCache {
    capacity: usize,
    entries: HashMap<Address, Entry>,
    /// Eviction order: oldest tick first.
    recency: BTreeMap<u64, Address>,
    next_tick: u64,

    // Statistics sampled by the counters snapshot.
    test_count: u64,
    hit_count: u64,
    insert_count: u64,
}

impl ReadCache {
    /// Create a read cache holding at most `capacity` records.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "read cache capacity must be non-zero");

        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            recency: BTreeMap::new(),
            next_tick: 0,
            test_count: 0,
            hit_count: 0,
            insert_count: 0,
        }
    }

    /// Look up a record, bumping its recency on a hit.
    pub fn get(&mut self, addr: Address) -> Option<Bytes> {
        self.test_count += 1;

        let tick = self.next_tick;
        let entry = self.entries.get_mut(&addr)?;

        self.recency.remove(&entry.tick);
        entry.tick = tick;
        self.recency.insert(tick, addr);
        self.next_tick += 1;

        self.hit_count += 1;
        Some(entry.bytes.clone())
    }

    /// Insert a record read from disk, evicting the least recently used
    /// entry once at capacity. Re-inserting an address refreshes it.
    pub fn put(&mut self, addr: Address, bytes: Bytes) {
        if let Some(old) = self.entries.remove(&addr) {
            self.recency.remove(&old.tick);
        } else if self.entries.len() >= self.capacity {
            self.evict_oldest();
        }

        let tick = self.next_tick;
        self.next_tick += 1;

        self.entries.insert(addr, Entry { bytes, tick });
        self.recency.insert(tick, addr);
        self.insert_count += 1;
    }

    /// True iff the address is resident (no recency bump, no stats).
    pub fn contains(&self, addr: Address) -> bool {
        self.entries.contains_key(&addr)
    }

    /// Number of resident records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True iff no records are resident.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The configured record capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop all entries; statistics are retained.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.recency.clear();
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    /// #of lookups performed.
    pub fn test_count(&self) -> u64 {
        self.test_count
    }

    /// #of lookups that found a resident record.
    pub fn hit_count(&self) -> u64 {
        self.hit_count
    }

    /// #of records entered into the cache.
    pub fn insert_count(&self) -> u64 {
        self.insert_count
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn evict_oldest(&mut self) {
        if let Some((&tick, &addr)) = self.recency.iter().next() {
            self.recency.remove(&tick);
            self.entries.remove(&addr);
        }
    }
}
