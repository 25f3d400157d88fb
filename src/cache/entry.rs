//! Cache Entry Module
//!
//! Defines a cached result with its storage timestamp, plus the clock used
//! to age entries.

use parking_lot::Mutex;
use serde_json::Value;

// == Cache Entry ==
/// One cached computation result.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// The cached result
    pub payload: Value,
    /// Storage timestamp (Unix seconds, fractional)
    pub stored_at: f64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry stored at `stored_at`.
    pub fn new(payload: Value, stored_at: f64) -> Self {
        Self { payload, stored_at }
    }

    // == Age ==
    /// Seconds elapsed between storage and `now`.
    pub fn age(&self, now: f64) -> f64 {
        age_at(self.stored_at, now)
    }

    // == Is Fresh ==
    /// Returns true while `age < ttl_seconds`.
    ///
    /// Boundary condition: an entry whose age equals the TTL is no longer
    /// served.
    pub fn is_fresh(&self, ttl_seconds: u64, now: f64) -> bool {
        self.age(now) < ttl_seconds as f64
    }
}

/// Age of a timestamp relative to `now`.
pub fn age_at(stored_at: f64, now: f64) -> f64 {
    now - stored_at
}

// == Clock ==
/// Source of the current time, in Unix seconds.
pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> f64;
}

/// Wall clock backed by `chrono::Utc`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        current_timestamp()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<f64>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, now: f64) {
        *self.now.lock() = now;
    }

    pub fn advance(&self, seconds: f64) {
        *self.now.lock() += seconds;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        *self.now.lock()
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in seconds at full clock precision.
pub fn current_timestamp() -> f64 {
    let now = chrono::Utc::now();
    now.timestamp() as f64 + f64::from(now.timestamp_subsec_nanos()) / 1e9
}
