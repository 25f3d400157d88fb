//! Memory Store Module
//!
//! Bounded in-process map of cached results with age-based eviction.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::cache::{CacheEntry, CacheKey};

// == Memory Lookup ==
/// Outcome of a memory-tier read.
#[derive(Debug, Clone, PartialEq)]
pub enum MemoryLookup {
    /// Entry present and within its TTL
    Hit(CacheEntry),
    /// Entry was present but stale; it has been removed
    Expired,
    /// No entry for the key
    Missing,
}

/// Stored entry plus its insertion order, which breaks `stored_at` ties.
#[derive(Debug)]
struct Slot {
    entry: CacheEntry,
    seq: u64,
}

// == Memory Store ==
/// In-process cache tier.
///
/// Not synchronized on its own; the coordinator guards it with a lock.
#[derive(Debug)]
pub struct MemoryStore {
    /// Key-value storage
    entries: HashMap<CacheKey, Slot>,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// Next insertion sequence number
    next_seq: u64,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store holding at most `max_entries` results.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            max_entries: max_entries.max(1),
            next_seq: 0,
        }
    }

    // == Get ==
    /// Reads an entry, removing it if it is older than `ttl_seconds`.
    pub fn get(&mut self, key: &CacheKey, ttl_seconds: u64, now: f64) -> MemoryLookup {
        match self.entries.get(key).map(|slot| &slot.entry) {
            Some(entry) if entry.is_fresh(ttl_seconds, now) => MemoryLookup::Hit(entry.clone()),
            Some(entry) => {
                debug!(
                    "Memory cache EXPIRED for key: {}... (age: {:.1}s)",
                    key.short(),
                    entry.age(now)
                );
                self.entries.remove(key);
                MemoryLookup::Expired
            }
            None => MemoryLookup::Missing,
        }
    }

    // == Peek ==
    /// Reads an entry without checking or changing anything.
    pub fn peek(&self, key: &CacheKey) -> Option<&CacheEntry> {
        self.entries.get(key).map(|slot| &slot.entry)
    }

    // == Set ==
    /// Stores a result, evicting the oldest tenth of the store first if a
    /// new key would exceed capacity.
    ///
    /// Returns the number of entries evicted to make room.
    pub fn set(&mut self, key: CacheKey, payload: Value, stored_at: f64) -> usize {
        let evicted = if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries
        {
            self.evict_oldest((self.max_entries / 10).max(1))
        } else {
            0
        };

        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(
            key,
            Slot {
                entry: CacheEntry::new(payload, stored_at),
                seq,
            },
        );
        evicted
    }

    // == Promote ==
    /// Inserts an entry read from disk unless the key is already present.
    ///
    /// Returns the entry now held for `key` and the number of entries
    /// evicted to make room.
    pub fn promote(&mut self, key: CacheKey, entry: CacheEntry) -> (CacheEntry, usize) {
        if let Some(current) = self.peek(&key) {
            return (current.clone(), 0);
        }
        let evicted = self.set(key, entry.payload.clone(), entry.stored_at);
        (entry, evicted)
    }

    // == Evict ==
    /// Removes an entry. Returns false if it was not present.
    pub fn evict(&mut self, key: &CacheKey) -> bool {
        self.entries.remove(key).is_some()
    }

    // == Evict Oldest ==
    /// Removes up to `count` entries with the smallest `stored_at`, oldest
    /// insertion first among equal timestamps.
    pub fn evict_oldest(&mut self, count: usize) -> usize {
        let mut by_age: Vec<(CacheKey, f64, u64)> = self
            .entries
            .iter()
            .map(|(key, slot)| (key.clone(), slot.entry.stored_at, slot.seq))
            .collect();
        by_age.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.2.cmp(&b.2)));

        let mut removed = 0;
        for (key, _, _) in by_age.into_iter().take(count) {
            self.entries.remove(&key);
            removed += 1;
        }

        debug!("Evicted {} oldest cache entries", removed);
        removed
    }

    // == Remove Expired ==
    /// Removes every entry whose age exceeds `ttl_seconds`.
    pub fn remove_expired(&mut self, ttl_seconds: u64, now: f64) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, slot| slot.entry.age(now) <= ttl_seconds as f64);
        before - self.entries.len()
    }

    // == Remove Matching ==
    /// Removes every entry whose key contains `pattern`.
    pub fn remove_matching(&mut self, pattern: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.as_str().contains(pattern));
        before - self.entries.len()
    }

    // == Clear ==
    /// Removes all entries, returning how many there were.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    // == Length ==
    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Capacity ceiling.
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }
}
