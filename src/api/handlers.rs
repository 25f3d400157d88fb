//! API Handlers
//!
//! HTTP request handlers for the cache administration endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

use crate::cache::{CacheKey, ResultCache};
use crate::error::{CacheError, Result};
use crate::models::{
    CleanupResponse, ClearResponse, EntryInfoResponse, HealthResponse, InvalidateRequest,
    InvalidateResponse, StatsResponse,
};

/// Application state shared across all handlers.
///
/// Holds the one `ResultCache` of the process; billing handlers share the
/// same instance.
#[derive(Clone)]
pub struct AppState {
    /// Shared two-tier cache
    pub cache: Arc<ResultCache>,
}

impl AppState {
    /// Creates a new AppState around the given cache.
    pub fn new(cache: ResultCache) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(ResultCache::from_config(config))
    }
}

/// Runs a disk-touching cache operation off the async workers.
async fn blocking<T, F>(state: &AppState, op: F) -> Result<T>
where
    F: FnOnce(&ResultCache) -> T + Send + 'static,
    T: Send + 'static,
{
    let cache = Arc::clone(&state.cache);
    tokio::task::spawn_blocking(move || op(&cache))
        .await
        .map_err(|err| CacheError::Internal(format!("cache task failed: {}", err)))
}

/// Handler for GET /api/cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.stats()))
}

/// Handler for POST /api/cache/clear
///
/// Empties both tiers and resets the counters.
pub async fn clear_handler(State(state): State<AppState>) -> Result<Json<ClearResponse>> {
    let cleared = blocking(&state, |cache| cache.clear_all()).await?;
    info!("Cache cleared via API: {} entries", cleared);
    Ok(Json(ClearResponse::new(cleared)))
}

/// Handler for POST /api/cache/cleanup
///
/// Removes expired entries from memory and disk.
pub async fn cleanup_handler(State(state): State<AppState>) -> Result<Json<CleanupResponse>> {
    let (memory, persistent) = blocking(&state, |cache| {
        (cache.cleanup_expired(), cache.cleanup_persistent())
    })
    .await?;
    Ok(Json(CleanupResponse::new(memory, persistent)))
}

/// Handler for POST /api/cache/invalidate
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidateRequest>,
) -> Result<Json<InvalidateResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let invalidated = state.cache.invalidate_matching(&req.pattern);
    Ok(Json(InvalidateResponse::new(&req.pattern, invalidated)))
}

/// Handler for GET /api/cache/entry/:key
pub async fn entry_info_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<EntryInfoResponse>> {
    let cache_key = CacheKey::from_raw(key.clone());
    let info = blocking(&state, move |cache| cache.entry_info(&cache_key)).await?;

    match info {
        Some(info) => Ok(Json(EntryInfoResponse::new(key, info))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{derive_key, CallArgs, EntrySource};
    use serde_json::json;
    use tempfile::TempDir;

    fn test_state(dir: &TempDir) -> AppState {
        AppState::new(ResultCache::new(dir.path().join("cache"), 100, 3600))
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        let response = stats_handler(State(state)).await;
        assert_eq!(response.hits, 0);
        assert_eq!(response.misses, 0);
        assert_eq!(response.max_entries, 100);
    }

    #[tokio::test]
    async fn test_entry_info_handler() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);
        let key = derive_key("get_cost_data", &CallArgs::new().kwarg("days", 30));
        state.cache.store(&key, json!({"totalCost": 12.34}));

        let response = entry_info_handler(State(state.clone()), Path(key.to_string()))
            .await
            .unwrap();
        assert_eq!(response.source, EntrySource::Memory);
        assert!(!response.is_expired);
        assert!(response.cached_at.is_some());
    }

    #[tokio::test]
    async fn test_entry_info_handler_not_found() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        let result = entry_info_handler(State(state), Path("nope".to_string())).await;
        assert!(matches!(result, Err(CacheError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_clear_handler() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);
        state.cache.store(&CacheKey::from_raw("a"), json!(1));
        state.cache.store(&CacheKey::from_raw("b"), json!(2));

        let response = clear_handler(State(state.clone())).await.unwrap();
        assert_eq!(response.entries_cleared, 2);
        assert_eq!(state.cache.stats().sets, 0);
    }

    #[tokio::test]
    async fn test_cleanup_handler_nothing_expired() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);
        state.cache.store(&CacheKey::from_raw("a"), json!(1));

        let response = cleanup_handler(State(state)).await.unwrap();
        assert_eq!(response.expired_entries_removed, 0);
        assert_eq!(response.persistent_entries_removed, 0);
    }

    #[tokio::test]
    async fn test_invalidate_handler() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);
        state.cache.store(&CacheKey::from_raw("cost_a"), json!(1));

        let req = InvalidateRequest {
            pattern: "cost_".to_string(),
        };
        let response = invalidate_handler(State(state.clone()), Json(req)).await.unwrap();
        assert_eq!(response.invalidated, 1);

        let req = InvalidateRequest {
            pattern: String::new(),
        };
        let result = invalidate_handler(State(state), Json(req)).await;
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
