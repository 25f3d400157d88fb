//! Response DTOs for the cache administration API
//!
//! Defines the structure of outgoing HTTP response bodies.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::{CacheStats, EntryInfo, EntrySource};

/// Response body for the stats endpoint (GET /api/cache/stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of results stored
    pub sets: u64,
    /// Number of evictions
    pub evictions: u64,
    /// Current number of entries in memory
    pub total_entries: usize,
    /// Memory tier capacity
    pub max_entries: usize,
    /// Hits plus misses
    pub total_requests: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            sets: stats.sets,
            evictions: stats.evictions,
            total_entries: stats.total_entries,
            max_entries: stats.max_entries,
            total_requests: stats.total_requests(),
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for POST /api/cache/clear
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
    /// Memory entries removed
    pub entries_cleared: usize,
}

impl ClearResponse {
    pub fn new(entries_cleared: usize) -> Self {
        Self {
            message: "Cache cleared successfully".to_string(),
            entries_cleared,
        }
    }
}

/// Response body for POST /api/cache/cleanup
#[derive(Debug, Clone, Serialize)]
pub struct CleanupResponse {
    pub message: String,
    pub expired_entries_removed: usize,
    pub persistent_entries_removed: usize,
}

impl CleanupResponse {
    pub fn new(expired_entries_removed: usize, persistent_entries_removed: usize) -> Self {
        Self {
            message: "Cache cleanup completed".to_string(),
            expired_entries_removed,
            persistent_entries_removed,
        }
    }
}

/// Response body for POST /api/cache/invalidate
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    pub message: String,
    pub invalidated: usize,
}

impl InvalidateResponse {
    pub fn new(pattern: &str, invalidated: usize) -> Self {
        Self {
            message: format!(
                "Invalidated {} cache entries matching '{}'",
                invalidated, pattern
            ),
            invalidated,
        }
    }
}

/// Response body for GET /api/cache/entry/:key
#[derive(Debug, Clone, Serialize)]
pub struct EntryInfoResponse {
    pub key: String,
    /// Storage time as Unix seconds
    pub stored_at: f64,
    /// Storage time in RFC 3339 format
    pub cached_at: Option<String>,
    pub age_seconds: f64,
    pub remaining_seconds: f64,
    pub is_expired: bool,
    pub source: EntrySource,
}

impl EntryInfoResponse {
    pub fn new(key: impl Into<String>, info: EntryInfo) -> Self {
        let millis = (info.stored_at * 1000.0).round() as i64;
        Self {
            key: key.into(),
            stored_at: info.stored_at,
            cached_at: DateTime::<Utc>::from_timestamp_millis(millis).map(|t| t.to_rfc3339()),
            age_seconds: info.age_seconds,
            remaining_seconds: info.remaining_seconds,
            is_expired: info.is_expired,
            source: info.source,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_response_from_stats() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            sets: 20,
            evictions: 5,
            total_entries: 15,
            max_entries: 1000,
        };
        let resp = StatsResponse::from(stats);
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
        assert_eq!(resp.total_requests, 100);
    }

    #[test]
    fn test_stats_response_zero_requests() {
        let resp = StatsResponse::from(CacheStats::new());
        assert_eq!(resp.hit_rate, 0.0);
    }

    #[test]
    fn test_entry_info_response_formats_time() {
        let info = EntryInfo {
            stored_at: 1_700_000_000.5,
            age_seconds: 10.0,
            remaining_seconds: 3590.0,
            is_expired: false,
            source: EntrySource::Persistent,
        };
        let resp = EntryInfoResponse::new("k", info);
        assert_eq!(resp.cached_at.as_deref(), Some("2023-11-14T22:13:20.500+00:00"));

        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains(r#""source":"persistent""#));
    }

    #[test]
    fn test_invalidate_response_message() {
        let resp = InvalidateResponse::new("cost", 3);
        assert!(resp.message.contains("3"));
        assert!(resp.message.contains("cost"));
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("Something went wrong");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("error"));
        assert!(json.contains("Something went wrong"));
    }
}
