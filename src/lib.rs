//! CloudSense - cached AWS cost data
//!
//! Two-tier (memory + disk) result cache for billing queries, with a small
//! HTTP API for cache statistics and maintenance.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{derive_key, CacheKey, CallArgs, Memoized, ResultCache};
pub use config::Config;
pub use tasks::spawn_cleanup_task;
