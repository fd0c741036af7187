//! Cache Module
//!
//! In-memory buffering between callers and the disk.
//!
//! ## Responsibilities
//! - Absorb appended records into a single write buffer (write-back)
//! - Serve reads of not-yet-flushed records out of that buffer (read-through)
//! - Retain recently disk-read records in a bounded LRU (read cache)
//!
//! Both caches are owned by the buffer strategy and are only touched inside
//! its critical section; neither is shared outside it.

mod read_cache;
mod write_cache;

pub use read_cache::ReadCache;
pub use write_cache::WriteCache;
