//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::cache::{DEFAULT_QUOTA_BYTES, DEFAULT_TTL_MS};

pub const DEFAULT_WEATHER_API_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const DEFAULT_AIR_QUALITY_API_BASE_URL: &str =
    "https://air-quality-api.open-meteo.com/v1/air-quality";
pub const DEFAULT_GEO_API_BASE_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Default cache TTL in milliseconds
    pub default_ttl_ms: u64,
    /// File backing the storage substrate; in-memory when unset
    pub storage_path: Option<PathBuf>,
    /// Storage capacity in bytes
    pub storage_quota_bytes: usize,
    /// Expired-entry sweep interval in seconds, 0 disables the sweep
    pub sweep_interval: u64,
    pub weather_api_base_url: String,
    pub air_quality_api_base_url: String,
    pub geo_api_base_url: String,
    /// Timezone passed to the forecast API
    pub timezone: String,
    /// Upstream request timeout in seconds
    pub http_timeout_secs: u64,
}

fn parsed<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn string(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `DEFAULT_TTL_MS` - Cache TTL in milliseconds (default: 1800000)
    /// - `STORAGE_PATH` - JSON file for persistent storage (default: in-memory)
    /// - `STORAGE_QUOTA_BYTES` - Storage capacity (default: 5 MiB)
    /// - `SWEEP_INTERVAL` - Expired entry sweep in seconds (default: 0, off)
    /// - `WEATHER_API_BASE_URL`, `AIR_QUALITY_API_BASE_URL`, `GEO_API_BASE_URL`
    /// - `WEATHER_TIMEZONE` - Forecast timezone (default: Asia/Shanghai)
    /// - `HTTP_TIMEOUT_SECS` - Upstream timeout (default: 10)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            server_port: parsed("SERVER_PORT", defaults.server_port),
            default_ttl_ms: parsed("DEFAULT_TTL_MS", defaults.default_ttl_ms),
            storage_path: env::var("STORAGE_PATH")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            storage_quota_bytes: parsed("STORAGE_QUOTA_BYTES", defaults.storage_quota_bytes),
            sweep_interval: parsed("SWEEP_INTERVAL", defaults.sweep_interval),
            weather_api_base_url: string("WEATHER_API_BASE_URL", DEFAULT_WEATHER_API_BASE_URL),
            air_quality_api_base_url: string(
                "AIR_QUALITY_API_BASE_URL",
                DEFAULT_AIR_QUALITY_API_BASE_URL,
            ),
            geo_api_base_url: string("GEO_API_BASE_URL", DEFAULT_GEO_API_BASE_URL),
            timezone: string("WEATHER_TIMEZONE", &defaults.timezone),
            http_timeout_secs: parsed("HTTP_TIMEOUT_SECS", defaults.http_timeout_secs),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            default_ttl_ms: DEFAULT_TTL_MS,
            storage_path: None,
            storage_quota_bytes: DEFAULT_QUOTA_BYTES,
            sweep_interval: 0,
            weather_api_base_url: DEFAULT_WEATHER_API_BASE_URL.to_string(),
            air_quality_api_base_url: DEFAULT_AIR_QUALITY_API_BASE_URL.to_string(),
            geo_api_base_url: DEFAULT_GEO_API_BASE_URL.to_string(),
            timezone: "Asia/Shanghai".to_string(),
            http_timeout_secs: 10,
        }
    }
}
