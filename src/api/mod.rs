//! API Module
//!
//! HTTP handlers and routing for the cache administration API.
//!
//! # Endpoints
//! - `GET /health` - Health check endpoint
//! - `GET /api/cache/stats` - Cache statistics
//! - `POST /api/cache/clear` - Empty both tiers
//! - `POST /api/cache/cleanup` - Remove expired entries
//! - `POST /api/cache/invalidate` - Drop memory entries matching a pattern
//! - `GET /api/cache/entry/:key` - Age and location of one entry

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
