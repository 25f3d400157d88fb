//! Memoizing Wrapper Module
//!
//! Wraps an expensive named operation so repeated calls with identical
//! arguments are answered from a [`ResultCache`].

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::cache::{derive_key, CallArgs, ResultCache};

// == Memoized ==
/// A named operation whose successful results are cached.
///
/// # Example
/// ```no_run
/// use cloudsense::cache::{CallArgs, Memoized, ResultCache};
///
/// let cache = ResultCache::new("/tmp/cloudsense-cache", 1000, 3600);
/// let get_cost_data = Memoized::new("get_cost_data", |args: &CallArgs| {
///     let days = args.get("days").and_then(|v| v.as_u64()).unwrap_or(30);
///     Ok::<_, String>(days as f64 * 1.5)
/// });
///
/// let cost = get_cost_data.call(&cache, &CallArgs::new().kwarg("days", 7));
/// ```
pub struct Memoized<F> {
    name: String,
    /// Overrides the cache's default TTL
    ttl: Option<u64>,
    operation: F,
}

impl<F> Memoized<F> {
    pub fn new(name: impl Into<String>, operation: F) -> Self {
        Self {
            name: name.into(),
            ttl: None,
            operation,
        }
    }

    /// Sets a TTL for this operation's results.
    pub fn with_ttl(mut self, ttl_seconds: u64) -> Self {
        self.ttl = Some(ttl_seconds);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the operation through `cache`.
    pub fn call<T, E>(&self, cache: &ResultCache, args: &CallArgs) -> Result<T, E>
    where
        F: Fn(&CallArgs) -> Result<T, E>,
        T: Serialize + DeserializeOwned,
    {
        let ttl = self.ttl.unwrap_or_else(|| cache.ttl());
        cache.lookup_or_compute_with_ttl(&self.name, args, ttl, &self.operation)
    }
}

impl ResultCache {
    // == Lookup Or Compute ==
    /// Returns the cached result of `operation(args)`, computing and caching
    /// it on a miss. `Err` results are returned but never cached.
    pub fn lookup_or_compute<T, E, F>(&self, operation: &str, args: &CallArgs, compute: F) -> Result<T, E>
    where
        F: FnOnce(&CallArgs) -> Result<T, E>,
        T: Serialize + DeserializeOwned,
    {
        self.lookup_or_compute_with_ttl(operation, args, self.ttl(), compute)
    }

    /// [`ResultCache::lookup_or_compute`] with an explicit TTL.
    pub fn lookup_or_compute_with_ttl<T, E, F>(
        &self,
        operation: &str,
        args: &CallArgs,
        ttl_seconds: u64,
        compute: F,
    ) -> Result<T, E>
    where
        F: FnOnce(&CallArgs) -> Result<T, E>,
        T: Serialize + DeserializeOwned,
    {
        let key = derive_key(operation, args);

        if let Some(cached) = self.lookup_with_ttl(&key, ttl_seconds) {
            match serde_json::from_value(cached) {
                Ok(value) => return Ok(value),
                Err(err) => {
                    debug!(
                        "Cached result for {} no longer matches its type, recomputing: {}",
                        operation, err
                    );
                    self.record_unusable_hit();
                }
            }
        }

        debug!("Cache MISS for {} - fetching fresh data", operation);
        let result = compute(args)?;

        match serde_json::to_value(&result) {
            Ok(payload) => {
                self.store(&key, payload);
            }
            Err(err) => debug!("Result of {} is not cacheable: {}", operation, err),
        }
        Ok(result)
    }
}
