//! Cache Coordinator Module
//!
//! `ResultCache` layers the memory tier over the persistent tier and owns the
//! hit/miss/set/eviction counters.
//!
//! # Concurrency
//! Memory tier and stats share one coarse lock; the persistent tier has its
//! own lock so index rewrites are serialized. Neither lock is held while a
//! wrapped operation runs, so two threads missing the same key may both
//! compute and both store. Upstream calls are read-only, so the second write
//! only refreshes the timestamp.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::{
    CacheKey, CacheStats, Clock, MemoryLookup, MemoryStore, PersistentStore, SystemClock,
};
use crate::config::Config;

// == Entry Source ==
/// Tier that currently holds an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrySource {
    Memory,
    Persistent,
}

// == Entry Info ==
/// Diagnostic view of one entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryInfo {
    /// Storage timestamp (Unix seconds)
    pub stored_at: f64,
    pub age_seconds: f64,
    /// Seconds until expiry, floored at zero
    pub remaining_seconds: f64,
    pub is_expired: bool,
    pub source: EntrySource,
}

impl EntryInfo {
    fn new(stored_at: f64, ttl_seconds: u64, now: f64, source: EntrySource) -> Self {
        let age_seconds = now - stored_at;
        let ttl = ttl_seconds as f64;
        Self {
            stored_at,
            age_seconds,
            remaining_seconds: (ttl - age_seconds).max(0.0),
            is_expired: age_seconds >= ttl,
            source,
        }
    }
}

/// Returns true for payloads shaped like a failed upstream call.
pub fn is_error_payload(payload: &Value) -> bool {
    payload
        .as_object()
        .map(|fields| fields.contains_key("error"))
        .unwrap_or(false)
}

#[derive(Debug)]
struct MemoryTier {
    store: MemoryStore,
    stats: CacheStats,
}

// == Result Cache ==
/// Two-tier cache shared by request handlers and batch callers.
///
/// Construct one in the composition root and share it behind an `Arc`.
#[derive(Debug)]
pub struct ResultCache {
    memory: Mutex<MemoryTier>,
    persistent: Mutex<PersistentStore>,
    /// Default TTL in seconds
    ttl: u64,
    clock: Arc<dyn Clock>,
}

impl ResultCache {
    // == Constructor ==
    /// Creates a cache persisting under `cache_dir`.
    ///
    /// # Arguments
    /// * `cache_dir` - Directory of the persistent tier
    /// * `max_entries` - Capacity of the memory tier
    /// * `ttl` - Default TTL in seconds
    pub fn new(cache_dir: impl Into<PathBuf>, max_entries: usize, ttl: u64) -> Self {
        Self {
            memory: Mutex::new(MemoryTier {
                store: MemoryStore::new(max_entries),
                stats: CacheStats::new(),
            }),
            persistent: Mutex::new(PersistentStore::new(cache_dir)),
            ttl,
            clock: Arc::new(SystemClock),
        }
    }

    /// Creates a cache from the service configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.cache_dir.clone(), config.max_entries, config.cache_duration)
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Default TTL in seconds.
    pub fn ttl(&self) -> u64 {
        self.ttl
    }

    // == Lookup ==
    /// Returns the cached payload for `key` under the default TTL.
    pub fn lookup(&self, key: &CacheKey) -> Option<Value> {
        self.lookup_with_ttl(key, self.ttl)
    }

    /// Returns the cached payload for `key` if younger than `ttl_seconds`.
    ///
    /// Checks memory first, then disk; disk hits are promoted into memory
    /// with their original timestamp. Counts exactly one hit or miss.
    pub fn lookup_with_ttl(&self, key: &CacheKey, ttl_seconds: u64) -> Option<Value> {
        let now = self.clock.now();

        {
            let mut memory = self.memory.lock();
            match memory.store.get(key, ttl_seconds, now) {
                MemoryLookup::Hit(entry) => {
                    memory.stats.record_hit();
                    debug!(
                        "Memory cache HIT for key: {}... (age: {:.1}s)",
                        key.short(),
                        entry.age(now)
                    );
                    return Some(entry.payload);
                }
                MemoryLookup::Expired => memory.stats.record_evictions(1),
                MemoryLookup::Missing => {}
            }
        }

        let persisted = match self.persistent.lock().load(key, ttl_seconds, now) {
            Ok(entry) => entry,
            Err(err) => {
                debug!("Error checking persistent cache for {}...: {}", key.short(), err);
                None
            }
        };

        let mut memory = self.memory.lock();
        match persisted {
            Some(entry) => {
                debug!(
                    "Persistent cache HIT for key: {}... (age: {:.1}s)",
                    key.short(),
                    entry.age(now)
                );
                // A concurrent store may have landed while the disk was read
                let (held, evicted) = memory.store.promote(key.clone(), entry);
                memory.stats.record_evictions(evicted);
                memory.stats.record_hit();
                Some(held.payload)
            }
            None => {
                memory.stats.record_miss();
                None
            }
        }
    }

    // == Store ==
    /// Caches `payload` in both tiers.
    ///
    /// Error-shaped payloads (objects with an `error` field) are refused so
    /// a transient upstream failure is retried on the next call. Returns
    /// whether the payload was cached. A failed disk write leaves the memory
    /// tier authoritative.
    pub fn store(&self, key: &CacheKey, payload: Value) -> bool {
        if is_error_payload(&payload) {
            debug!("Not caching error payload for key: {}...", key.short());
            return false;
        }

        let now = self.clock.now();
        let size = {
            let mut memory = self.memory.lock();
            let evicted = memory.store.set(key.clone(), payload.clone(), now);
            memory.stats.record_evictions(evicted);
            memory.stats.record_set();
            memory.store.len()
        };

        match self.persistent.lock().save(key, &payload, now) {
            Ok(()) => debug!(
                "Cache SET for key: {}... (memory + persistent, cache size: {})",
                key.short(),
                size
            ),
            Err(err) => debug!(
                "Cache SET for key: {}... (memory only, cache size: {}): {}",
                key.short(),
                size,
                err
            ),
        }
        true
    }

    /// Caches the success value of an operation; failures are never cached.
    pub fn store_outcome<E>(&self, key: &CacheKey, outcome: &Result<Value, E>) -> bool {
        match outcome {
            Ok(payload) => self.store(key, payload.clone()),
            Err(_) => false,
        }
    }

    // == Invalidate ==
    /// Drops `key` from memory. The disk copy is left for TTL cleanup.
    pub fn invalidate(&self, key: &CacheKey) -> bool {
        let mut memory = self.memory.lock();
        let removed = memory.store.evict(key);
        if removed {
            memory.stats.record_evictions(1);
        }
        removed
    }

    /// Drops every memory entry whose key contains `pattern`.
    pub fn invalidate_matching(&self, pattern: &str) -> usize {
        let mut memory = self.memory.lock();
        let removed = memory.store.remove_matching(pattern);
        memory.stats.record_evictions(removed);
        debug!(
            "Invalidated {} cache entries matching pattern: {}",
            removed, pattern
        );
        removed
    }

    // == Clear All ==
    /// Empties both tiers and zeroes the counters.
    ///
    /// Returns the number of memory entries removed.
    pub fn clear_all(&self) -> usize {
        let cleared = {
            let mut memory = self.memory.lock();
            memory.stats.reset();
            memory.store.clear()
        };

        match self.persistent.lock().clear_all() {
            Ok(()) => info!(
                "Cache cleared: {} memory entries and persistent cache removed",
                cleared
            ),
            Err(err) => warn!(
                "Cache cleared: {} memory entries removed (persistent cache clear failed: {})",
                cleared, err
            ),
        }
        cleared
    }

    // == Cleanup ==
    /// Evicts memory entries older than the default TTL.
    pub fn cleanup_expired(&self) -> usize {
        let now = self.clock.now();
        let mut memory = self.memory.lock();
        let removed = memory.store.remove_expired(self.ttl, now);
        memory.stats.record_evictions(removed);
        if removed > 0 {
            debug!("Cleaned up {} expired cache entries", removed);
        }
        removed
    }

    /// Deletes persisted entries older than the default TTL.
    pub fn cleanup_persistent(&self) -> usize {
        let now = self.clock.now();
        match self.persistent.lock().remove_expired(self.ttl, now) {
            Ok(removed) => removed,
            Err(err) => {
                debug!("Failed to cleanup persistent cache: {}", err);
                0
            }
        }
    }

    /// Counts a lookup whose cached payload could not be used as a miss.
    pub(crate) fn record_unusable_hit(&self) {
        self.memory.lock().stats.reclassify_hit_as_miss();
    }

    // == Stats ==
    /// Snapshot of the counters and memory-tier size.
    pub fn stats(&self) -> CacheStats {
        let memory = self.memory.lock();
        let mut stats = memory.stats.clone();
        stats.total_entries = memory.store.len();
        stats.max_entries = memory.store.max_entries();
        stats
    }

    // == Entry Info ==
    /// Reports where `key` lives and how old it is, without counting a
    /// lookup or removing anything.
    pub fn entry_info(&self, key: &CacheKey) -> Option<EntryInfo> {
        let now = self.clock.now();

        if let Some(entry) = self.memory.lock().store.peek(key) {
            return Some(EntryInfo::new(
                entry.stored_at,
                self.ttl,
                now,
                EntrySource::Memory,
            ));
        }

        match self.persistent.lock().stored_at(key) {
            Ok(stored_at) => stored_at
                .map(|stored_at| EntryInfo::new(stored_at, self.ttl, now, EntrySource::Persistent)),
            Err(err) => {
                debug!("Error getting persistent cache info: {}", err);
                None
            }
        }
    }
}
