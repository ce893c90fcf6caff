//! Response DTOs for the weather cache API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;

/// Body for `GET /stats`.
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    pub writes: u64,
    pub write_failures: u64,
    pub skipped: u64,
    pub total_entries: usize,
    /// hits / (hits + misses)
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            expirations: stats.expirations,
            writes: stats.writes,
            write_failures: stats.write_failures,
            skipped: stats.skipped,
            total_entries: stats.total_entries,
        }
    }
}

/// Generic acknowledgement for mutating endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body for `POST /cache/purge`.
#[derive(Debug, Clone, Serialize)]
pub struct PurgeResponse {
    pub removed: usize,
}

/// Body for `POST /favorites`.
#[derive(Debug, Clone, Serialize)]
pub struct FavoriteResponse {
    pub value: String,
    pub added: bool,
}

/// Body for `GET /convert`.
#[derive(Debug, Clone, Serialize)]
pub struct ConvertResponse {
    pub value: f64,
    pub unit: String,
    pub formatted: String,
}

/// Body for `GET /coordinates`.
#[derive(Debug, Clone, Serialize)]
pub struct CoordinatesResponse {
    pub formatted: String,
}

/// Body for `POST /tools/favorites/:id`.
#[derive(Debug, Clone, Serialize)]
pub struct ToolToggleResponse {
    pub id: String,
    pub favorite: bool,
}

/// Body for `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_response_from_stats() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            total_entries: 3,
            ..CacheStats::default()
        };
        let resp = StatsResponse::from(stats);
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
        assert_eq!(resp.total_entries, 3);
    }

    #[test]
    fn test_stats_response_zero_requests() {
        let resp = StatsResponse::from(CacheStats::default());
        assert_eq!(resp.hit_rate, 0.0);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
