//! API Routes
//!
//! Configures the Axum router with the cache administration endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cleanup_handler, clear_handler, entry_info_handler, health_handler, invalidate_handler,
    stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check endpoint
/// - `GET /api/cache/stats` - Cache statistics
/// - `POST /api/cache/clear` - Empty both tiers
/// - `POST /api/cache/cleanup` - Remove expired entries
/// - `POST /api/cache/invalidate` - Drop memory entries matching a pattern
/// - `GET /api/cache/entry/:key` - Age and location of one entry
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router with all endpoints
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/cache/stats", get(stats_handler))
        .route("/api/cache/clear", post(clear_handler))
        .route("/api/cache/cleanup", post(cleanup_handler))
        .route("/api/cache/invalidate", post(invalidate_handler))
        .route("/api/cache/entry/:key", get(entry_info_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
