//! Cached Weather Service
//!
//! Wraps a [`WeatherSource`] with the read-through cache. Keys are built
//! from the city and the report kind, e.g. `beijing_current`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::cache::{generate_cache_key, ApiResponse, CacheStatus, CacheStore};
use crate::weather::cities::default_cities;
use crate::weather::{
    AirQuality, City, CurrentWeather, DataKind, ForecastDay, SunriseSunset, UvIndex,
};

// == Producer seam ==
/// Something that can produce weather reports for a city.
///
/// Implementations report failures inside the envelope rather than erroring.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn current(&self, city: &str) -> ApiResponse<CurrentWeather>;
    async fn forecast(&self, city: &str) -> ApiResponse<Vec<ForecastDay>>;
    async fn air_quality(&self, city: &str) -> ApiResponse<AirQuality>;
    async fn uv_index(&self, city: &str) -> ApiResponse<UvIndex>;
    async fn sunrise_sunset(&self, city: &str) -> ApiResponse<SunriseSunset>;

    /// Cities matching `query`; the built-in list unless overridden.
    async fn search_cities(&self, _query: &str, limit: usize) -> Vec<City> {
        default_cities().into_iter().take(limit).collect()
    }
}

#[derive(Clone)]
pub struct WeatherService {
    source: Arc<dyn WeatherSource>,
    cache: Arc<CacheStore>,
    /// Override for the store's default TTL
    ttl_ms: Option<u64>,
}

impl WeatherService {
    pub fn new(source: Arc<dyn WeatherSource>, cache: Arc<CacheStore>) -> Self {
        Self {
            source,
            cache,
            ttl_ms: None,
        }
    }

    pub fn with_ttl(mut self, ttl_ms: u64) -> Self {
        self.ttl_ms = Some(ttl_ms);
        self
    }

    pub fn cache(&self) -> &Arc<CacheStore> {
        &self.cache
    }

    pub fn cache_key(city: &str, kind: DataKind) -> String {
        generate_cache_key(city, kind.as_str())
    }

    pub async fn current(&self, city: &str) -> ApiResponse<CurrentWeather> {
        let key = Self::cache_key(city, DataKind::Current);
        self.cache
            .read_through(&key, self.ttl_ms, || self.source.current(city))
            .await
    }

    pub async fn forecast(&self, city: &str) -> ApiResponse<Vec<ForecastDay>> {
        let key = Self::cache_key(city, DataKind::Forecast);
        self.cache
            .read_through(&key, self.ttl_ms, || self.source.forecast(city))
            .await
    }

    pub async fn air_quality(&self, city: &str) -> ApiResponse<AirQuality> {
        let key = Self::cache_key(city, DataKind::AirQuality);
        self.cache
            .read_through(&key, self.ttl_ms, || self.source.air_quality(city))
            .await
    }

    pub async fn uv_index(&self, city: &str) -> ApiResponse<UvIndex> {
        let key = Self::cache_key(city, DataKind::UvIndex);
        self.cache
            .read_through(&key, self.ttl_ms, || self.source.uv_index(city))
            .await
    }

    pub async fn sunrise_sunset(&self, city: &str) -> ApiResponse<SunriseSunset> {
        let key = Self::cache_key(city, DataKind::SunriseSunset);
        self.cache
            .read_through(&key, self.ttl_ms, || self.source.sunrise_sunset(city))
            .await
    }

    /// Fetches any report kind as an untyped JSON envelope.
    pub async fn report(&self, city: &str, kind: DataKind) -> serde_json::Result<Value> {
        match kind {
            DataKind::Current => serde_json::to_value(self.current(city).await),
            DataKind::Forecast => serde_json::to_value(self.forecast(city).await),
            DataKind::AirQuality => serde_json::to_value(self.air_quality(city).await),
            DataKind::UvIndex => serde_json::to_value(self.uv_index(city).await),
            DataKind::SunriseSunset => serde_json::to_value(self.sunrise_sunset(city).await),
        }
    }

    /// City search is not cached.
    pub async fn search_cities(&self, query: &str, limit: usize) -> Vec<City> {
        self.source.search_cities(query, limit).await
    }

    pub fn status(&self, city: &str, kind: DataKind) -> CacheStatus {
        self.cache.status(&Self::cache_key(city, kind))
    }

    pub fn invalidate(&self, city: &str, kind: DataKind) {
        self.cache.remove(&Self::cache_key(city, kind));
    }
}
