//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, sets and evictions.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Number of lookups served from either tier
    pub hits: u64,
    /// Number of lookups that found nothing valid
    pub misses: u64,
    /// Number of results stored
    pub sets: u64,
    /// Number of entries removed from memory before or at expiry
    pub evictions: u64,
    /// Current number of entries in the memory tier
    pub total_entries: usize,
    /// Capacity of the memory tier
    pub max_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Lookups answered so far.
    pub fn total_requests(&self) -> u64 {
        self.hits + self.misses
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Set ==
    /// Increments the set counter.
    pub fn record_set(&mut self) {
        self.sets += 1;
    }

    // == Record Evictions ==
    /// Adds `count` to the eviction counter.
    pub fn record_evictions(&mut self, count: usize) {
        self.evictions += count as u64;
    }

    // == Reclassify Hit ==
    /// Turns the most recent hit into a miss, for a cached result that
    /// turned out to be unusable.
    pub fn reclassify_hit_as_miss(&mut self) {
        self.hits = self.hits.saturating_sub(1);
        self.misses += 1;
    }

    // == Reset ==
    /// Zeroes every counter.
    pub fn reset(&mut self) {
        self.hits = 0;
        self.misses = 0;
        self.sets = 0;
        self.evictions = 0;
    }
}
