//! Store Module
//!
//! The buffer strategy orchestrator and its instrumentation.
//!
//! ## Responsibilities
//! - Compose addressing, caches, disk I/O, and the commit protocol behind
//!   one allocate/write/read/force/truncate contract
//! - Enforce the Open → ClosedForWrites → Closed lifecycle
//! - Track instrumentation counters and expose a read-only snapshot

mod counters;
mod worm;

pub use counters::{Counters, CountersSnapshot};
pub use worm::{StoreState, WormStore};
