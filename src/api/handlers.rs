//! API Handlers
//!
//! HTTP request handlers for the weather, cache, favorites and unit endpoints.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;

use crate::cache::{CacheStatus, CacheStore, FileStorage, MemoryStorage, Storage};
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::favorites::CityFavorites;
use crate::models::{
    AddFavoriteRequest, CitySearchQuery, ConvertQuery, ConvertResponse, CoordinatesQuery,
    CoordinatesResponse, FavoriteResponse, HealthResponse, MessageResponse, PurgeResponse,
    StatsResponse, ToolToggleResponse,
};
use crate::tools::ToolFavorites;
use crate::units::{
    convert, format_coordinates, format_temperature, TemperatureUnit,
    DEFAULT_COORDINATE_DECIMALS,
};
use crate::weather::{City, DataKind, WeatherClient, WeatherService, WeatherSource};

const DEFAULT_SEARCH_LIMIT: usize = 10;
const MAX_SEARCH_LIMIT: usize = 50;

/// Application state shared across all handlers.
///
/// The cache and both favorites lists share one storage substrate.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<CacheStore>,
    pub weather: WeatherService,
    pub favorites: CityFavorites,
    pub tools: ToolFavorites,
}

impl AppState {
    /// Creates a new AppState over `storage`, fetching through `source`.
    pub fn new(storage: Arc<dyn Storage>, source: Arc<dyn WeatherSource>, default_ttl_ms: u64) -> Self {
        let cache = Arc::new(CacheStore::new(storage.clone()).with_default_ttl(default_ttl_ms));

        Self {
            weather: WeatherService::new(source, cache.clone()),
            favorites: CityFavorites::new(storage.clone()),
            tools: ToolFavorites::new(storage),
            cache,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Opens file storage when a path is configured and builds the
    /// Open-Meteo client.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let storage: Arc<dyn Storage> = match &config.storage_path {
            Some(path) => Arc::new(
                FileStorage::open_with_quota(path, Some(config.storage_quota_bytes))
                    .with_context(|| format!("opening storage file {}", path.display()))?,
            ),
            None => Arc::new(MemoryStorage::with_quota(config.storage_quota_bytes)),
        };

        let client = WeatherClient::new(config).context("building weather API client")?;

        Ok(Self::new(storage, Arc::new(client), config.default_ttl_ms))
    }
}

// == Path helpers ==
fn parse_kind(kind: &str) -> Result<DataKind> {
    kind.parse().map_err(ApiError::InvalidRequest)
}

/// Cache keys are built from the normalized city slug.
fn normalize_city(city: &str) -> Result<String> {
    let city = city.trim().to_lowercase();
    if city.is_empty() {
        return Err(ApiError::InvalidRequest("City cannot be empty".to_string()));
    }
    Ok(city)
}

/// Handler for GET /weather/:city/:kind
///
/// Serves the report from cache, or fetches and caches it on a miss.
pub async fn weather_handler(
    State(state): State<AppState>,
    Path((city, kind)): Path<(String, String)>,
) -> Result<Json<Value>> {
    let kind = parse_kind(&kind)?;
    let city = normalize_city(&city)?;

    let report = state.weather.report(&city, kind).await?;
    Ok(Json(report))
}

/// Handler for GET /cache/:city/:kind/status
pub async fn cache_status_handler(
    State(state): State<AppState>,
    Path((city, kind)): Path<(String, String)>,
) -> Result<Json<CacheStatus>> {
    let kind = parse_kind(&kind)?;
    let city = normalize_city(&city)?;

    Ok(Json(state.weather.status(&city, kind)))
}

/// Handler for DELETE /cache/:city/:kind
pub async fn cache_remove_handler(
    State(state): State<AppState>,
    Path((city, kind)): Path<(String, String)>,
) -> Result<Json<MessageResponse>> {
    let kind = parse_kind(&kind)?;
    let city = normalize_city(&city)?;

    state.weather.invalidate(&city, kind);
    Ok(Json(MessageResponse::new(format!(
        "Cache entry '{}' removed",
        WeatherService::cache_key(&city, kind)
    ))))
}

/// Handler for DELETE /cache
pub async fn cache_clear_handler(State(state): State<AppState>) -> Json<MessageResponse> {
    state.cache.clear();
    Json(MessageResponse::new("Cache cleared"))
}

/// Handler for POST /cache/purge
pub async fn cache_purge_handler(State(state): State<AppState>) -> Json<PurgeResponse> {
    let removed = state.cache.purge_expired();
    Json(PurgeResponse { removed })
}

/// Handler for GET /cities
pub async fn cities_handler(
    State(state): State<AppState>,
    Query(query): Query<CitySearchQuery>,
) -> Json<Vec<City>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_SEARCH_LIMIT)
        .clamp(1, MAX_SEARCH_LIMIT);
    Json(state.weather.search_cities(&query.q, limit).await)
}

/// Handler for GET /favorites
pub async fn favorites_list_handler(State(state): State<AppState>) -> Json<Vec<City>> {
    Json(state.favorites.list())
}

/// Handler for POST /favorites
///
/// Adding a city that is already a favorite is not an error; `added` is false.
pub async fn favorites_add_handler(
    State(state): State<AppState>,
    Json(req): Json<AddFavoriteRequest>,
) -> Result<Json<FavoriteResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let value = req.city.value.clone();
    let added = state.favorites.add(req.city)?;
    Ok(Json(FavoriteResponse { value, added }))
}

/// Handler for DELETE /favorites/:city
pub async fn favorites_remove_handler(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> Result<Json<MessageResponse>> {
    if !state.favorites.remove(&city)? {
        return Err(ApiError::NotFound(format!("favorite city '{}'", city)));
    }
    Ok(Json(MessageResponse::new(format!(
        "City '{}' removed from favorites",
        city
    ))))
}

/// Handler for DELETE /favorites
pub async fn favorites_clear_handler(State(state): State<AppState>) -> Result<Json<MessageResponse>> {
    state.favorites.clear()?;
    Ok(Json(MessageResponse::new("Favorites cleared")))
}

/// Handler for GET /tools/favorites
pub async fn tool_favorites_handler(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.tools.favorites())
}

/// Handler for POST /tools/favorites/:id
///
/// Toggles the starred state of a tool.
pub async fn tool_toggle_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ToolToggleResponse>> {
    let favorite = state.tools.toggle_favorite(&id)?;
    Ok(Json(ToolToggleResponse { id, favorite }))
}

/// Handler for DELETE /tools/favorites
pub async fn tool_favorites_clear_handler(
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>> {
    state.tools.clear_favorites()?;
    Ok(Json(MessageResponse::new("Tool favorites cleared")))
}

/// Handler for GET /tools/recent
pub async fn tool_recent_handler(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.tools.recent())
}

/// Handler for POST /tools/recent/:id
pub async fn tool_usage_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<String>>> {
    state.tools.record_usage(&id)?;
    Ok(Json(state.tools.recent()))
}

/// Handler for DELETE /tools/recent
pub async fn tool_recent_clear_handler(
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>> {
    state.tools.clear_recent()?;
    Ok(Json(MessageResponse::new("Recent tool usage cleared")))
}

/// Handler for GET /convert
pub async fn convert_handler(Query(query): Query<ConvertQuery>) -> Result<Json<ConvertResponse>> {
    if let Some(error_msg) = query.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let from: TemperatureUnit = query.from.parse()?;
    let to: TemperatureUnit = query.to.parse()?;

    let value = convert(query.value, from, to);
    Ok(Json(ConvertResponse {
        value,
        unit: to.to_string(),
        formatted: format_temperature(value, to, query.decimals.unwrap_or(1)),
    }))
}

/// Handler for GET /coordinates
pub async fn coordinates_handler(
    Query(query): Query<CoordinatesQuery>,
) -> Result<Json<CoordinatesResponse>> {
    if let Some(error_msg) = query.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let decimals = query.decimals.unwrap_or(DEFAULT_COORDINATE_DECIMALS);
    Ok(Json(CoordinatesResponse {
        formatted: format_coordinates(query.lat, query.lon, decimals),
    }))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.stats()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
