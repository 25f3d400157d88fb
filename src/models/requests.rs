//! Request DTOs for the cache administration API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

/// Request body for POST /api/cache/invalidate
///
/// # Fields
/// - `pattern`: substring matched against cache keys
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidateRequest {
    /// Substring to match
    pub pattern: String,
}

impl InvalidateRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.pattern.is_empty() {
            return Some("Pattern cannot be empty".to_string());
        }
        None
    }
}
