//! API Module
//!
//! HTTP handlers and routing for the weather cache REST API.
//!
//! # Endpoints
//! - `GET /weather/:city/:kind` - Cached weather report
//! - `GET /cache/:city/:kind/status` - Inspect a cache entry
//! - `DELETE /cache/:city/:kind` - Drop a cache entry
//! - `DELETE /cache` - Drop every cache entry
//! - `POST /cache/purge` - Evict expired entries
//! - `GET /cities` - City search
//! - `GET|POST|DELETE /favorites`, `DELETE /favorites/:city` - Favorite cities
//! - `GET|DELETE /tools/favorites`, `POST /tools/favorites/:id` - Starred tools
//! - `GET|DELETE /tools/recent`, `POST /tools/recent/:id` - Recent tool usage
//! - `GET /convert` - Temperature unit conversion
//! - `GET /coordinates` - Coordinate formatting
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
