//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries from
//! both tiers.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::ResultCache;

/// Spawns a background task that periodically cleans up expired cache entries.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between cleanup runs. Disk work runs on the blocking pool.
///
/// # Arguments
/// * `cache` - Shared reference to the cache
/// * `cleanup_interval_secs` - Interval in seconds between cleanup runs
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(ResultCache::new("/tmp/cache", 1000, 3600));
/// let cleanup_handle = spawn_cleanup_task(cache.clone(), 300);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(cache: Arc<ResultCache>, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            // Sleep for the configured interval
            tokio::time::sleep(interval).await;

            let cache = Arc::clone(&cache);
            let removed = tokio::task::spawn_blocking(move || {
                (cache.cleanup_expired(), cache.cleanup_persistent())
            })
            .await;

            // Log cleanup statistics
            match removed {
                Ok((0, 0)) => debug!("TTL cleanup: no expired entries found"),
                Ok((memory, persistent)) => info!(
                    "TTL cleanup: removed {} memory and {} persistent entries",
                    memory, persistent
                ),
                Err(err) => debug!("TTL cleanup run failed: {}", err),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheKey, ManualClock};
    use serde_json::json;
    use tempfile::TempDir;

    fn test_cache(dir: &TempDir) -> (Arc<ResultCache>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1000.0));
        let cache = ResultCache::new(dir.path().join("cache"), 100, 60).with_clock(clock.clone());
        (Arc::new(cache), clock)
    }

    #[tokio::test]
    async fn test_cleanup_task_removes_expired_entries() {
        let dir = TempDir::new().unwrap();
        let (cache, clock) = test_cache(&dir);
        cache.store(&CacheKey::from_raw("expire_soon"), json!("value"));
        clock.advance(61.0);

        let handle = spawn_cleanup_task(cache.clone(), 1);

        // Wait for cleanup to run
        tokio::time::sleep(Duration::from_millis(1500)).await;

        let stats = cache.stats();
        assert_eq!(stats.total_entries, 0, "Expired entry should have been cleaned up");
        assert_eq!(stats.evictions, 1);
        assert!(cache.entry_info(&CacheKey::from_raw("expire_soon")).is_none());

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_preserves_valid_entries() {
        let dir = TempDir::new().unwrap();
        let (cache, _clock) = test_cache(&dir);
        cache.store(&CacheKey::from_raw("long_lived"), json!("value"));

        let handle = spawn_cleanup_task(cache.clone(), 1);

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(cache.lookup(&CacheKey::from_raw("long_lived")), Some(json!("value")));

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let dir = TempDir::new().unwrap();
        let (cache, _clock) = test_cache(&dir);

        let handle = spawn_cleanup_task(cache, 1);

        // Abort immediately
        handle.abort();

        // Wait a bit and verify task is finished
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
