//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::path::PathBuf;

/// Default cache duration in seconds when nothing is configured.
pub const DEFAULT_CACHE_DURATION: u64 = 3600;

/// Default capacity of the in-memory tier.
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

/// Directory name used under the user's home directory.
const CACHE_DIR_NAME: &str = ".cloudsense-cache";

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// How long cached results stay valid, in seconds
    pub cache_duration: u64,
    /// Maximum number of entries held in memory
    pub max_entries: usize,
    /// Directory holding the persistent tier
    pub cache_dir: PathBuf,
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DURATION` - Cache TTL in seconds (default: 3600)
    /// - `MAX_CACHE_SIZE` - Maximum in-memory entries (default: 1000)
    /// - `CACHE_DIR` - Persistent cache directory (default: ~/.cloudsense-cache)
    /// - `SERVER_PORT` - HTTP server port (default: 8080)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 300)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cache_duration: parse_env("CACHE_DURATION").unwrap_or(defaults.cache_duration),
            max_entries: parse_env("MAX_CACHE_SIZE").unwrap_or(defaults.max_entries),
            cache_dir: env::var("CACHE_DIR")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_dir),
            server_port: parse_env("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: parse_env("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_duration: DEFAULT_CACHE_DURATION,
            max_entries: DEFAULT_MAX_ENTRIES,
            cache_dir: default_cache_dir(),
            server_port: 8080,
            cleanup_interval: 300,
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

/// `~/.cloudsense-cache`, or a relative directory when no home is known.
pub fn default_cache_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(CACHE_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(CACHE_DIR_NAME))
}
