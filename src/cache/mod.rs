//! Cache Module
//!
//! Two-tier result cache: a bounded in-memory map layered over a directory
//! of JSON files, with TTL expiration, age-based eviction and statistics.

mod coordinator;
mod entry;
mod key;
mod memoize;
mod memory;
pub mod persistent;
mod stats;


// Re-export public types
pub use coordinator::{is_error_payload, EntryInfo, EntrySource, ResultCache};
pub use entry::{current_timestamp, CacheEntry, Clock, ManualClock, SystemClock};
pub use key::{derive_key, CacheKey, CallArgs, KEY_PREFIX};
pub use memoize::Memoized;
pub use memory::{MemoryLookup, MemoryStore};
pub use persistent::PersistentStore;
pub use stats::CacheStats;
