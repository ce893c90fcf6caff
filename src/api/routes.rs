//! API Routes
//!
//! Configures the Axum router with all weather cache endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cache_clear_handler, cache_purge_handler, cache_remove_handler, cache_status_handler,
    cities_handler, convert_handler, coordinates_handler, favorites_add_handler,
    favorites_clear_handler, favorites_list_handler, favorites_remove_handler, health_handler,
    stats_handler, tool_favorites_clear_handler, tool_favorites_handler,
    tool_recent_clear_handler, tool_recent_handler, tool_toggle_handler, tool_usage_handler,
    weather_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/weather/:city/:kind", get(weather_handler))
        .route("/cache", delete(cache_clear_handler))
        .route("/cache/purge", post(cache_purge_handler))
        .route("/cache/:city/:kind", delete(cache_remove_handler))
        .route("/cache/:city/:kind/status", get(cache_status_handler))
        .route("/cities", get(cities_handler))
        .route(
            "/favorites",
            get(favorites_list_handler)
                .post(favorites_add_handler)
                .delete(favorites_clear_handler),
        )
        .route("/favorites/:city", delete(favorites_remove_handler))
        .route(
            "/tools/favorites",
            get(tool_favorites_handler).delete(tool_favorites_clear_handler),
        )
        .route("/tools/favorites/:id", post(tool_toggle_handler))
        .route(
            "/tools/recent",
            get(tool_recent_handler).delete(tool_recent_clear_handler),
        )
        .route("/tools/recent/:id", post(tool_usage_handler))
        .route("/convert", get(convert_handler))
        .route("/coordinates", get(coordinates_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
