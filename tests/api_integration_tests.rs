//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use skycache::{
    api::create_router,
    cache::{ApiResponse, MemoryStorage},
    weather::{AirQuality, CurrentWeather, ForecastDay, SunriseSunset, UvIndex, WeatherSource},
    AppState,
};
use tower::ServiceExt;

// == Helper Functions ==

#[derive(Default)]
struct StubSource {
    calls: AtomicUsize,
    down: AtomicBool,
}

impl StubSource {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn reply<T>(&self, data: T) -> ApiResponse<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.down.load(Ordering::SeqCst) {
            ApiResponse::failure("service down")
        } else {
            ApiResponse::ok(data)
        }
    }
}

#[async_trait]
impl WeatherSource for StubSource {
    async fn current(&self, _city: &str) -> ApiResponse<CurrentWeather> {
        self.reply(CurrentWeather {
            temperature: 21,
            feels_like: 20,
            humidity: 55.0,
            wind_speed: 3.2,
            weather: "Partly cloudy".to_string(),
            weather_code: 2,
            icon: "⛅".to_string(),
            pressure: 1013.0,
            visibility: 9000.0,
        })
    }

    async fn forecast(&self, _city: &str) -> ApiResponse<Vec<ForecastDay>> {
        self.reply(vec![])
    }

    async fn air_quality(&self, _city: &str) -> ApiResponse<AirQuality> {
        self.reply(AirQuality {
            aqi: 1,
            pm25: 8.0,
            pm10: 12.0,
            o3: 30.0,
            no2: 4.0,
            so2: 1.0,
            co: 150.0,
        })
    }

    async fn uv_index(&self, _city: &str) -> ApiResponse<UvIndex> {
        self.reply(UvIndex {
            uv_index: 7,
            level: "High".to_string(),
            advice: "Seek shade".to_string(),
        })
    }

    async fn sunrise_sunset(&self, _city: &str) -> ApiResponse<SunriseSunset> {
        self.reply(SunriseSunset {
            sunrise: "06:01".to_string(),
            sunset: "18:30".to_string(),
            day_length: "12h 29m".to_string(),
        })
    }
}

fn create_test_app_with_ttl(ttl_ms: u64) -> (Arc<StubSource>, Router) {
    let source = Arc::new(StubSource::default());
    let state = AppState::new(Arc::new(MemoryStorage::new()), source.clone(), ttl_ms);
    (source, create_router(state))
}

fn create_test_app() -> (Arc<StubSource>, Router) {
    create_test_app_with_ttl(60_000)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// == Weather Endpoint Tests ==

#[tokio::test]
async fn test_weather_is_cached_between_requests() {
    let (source, app) = create_test_app();

    let (status, first) = send(&app, "GET", "/weather/beijing/current", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["success"], true);
    assert_eq!(first["data"]["temperature"], 21);
    assert_eq!(first["data"]["weatherCode"], 2);

    let (_, second) = send(&app, "GET", "/weather/beijing/current", None).await;
    assert_eq!(first, second);
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_weather_city_is_normalized() {
    let (source, app) = create_test_app();

    send(&app, "GET", "/weather/Beijing/uv_index", None).await;
    send(&app, "GET", "/weather/beijing/uv_index", None).await;

    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_weather_failure_is_not_cached() {
    let (source, app) = create_test_app();
    source.down.store(true, Ordering::SeqCst);

    let (status, body) = send(&app, "GET", "/weather/xian/air_quality", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "service down");

    let (_, status_body) = send(&app, "GET", "/cache/xian/air_quality/status", None).await;
    assert_eq!(status_body["exists"], false);

    source.down.store(false, Ordering::SeqCst);
    let (_, body) = send(&app, "GET", "/weather/xian/air_quality", None).await;
    assert_eq!(body["success"], true);
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_weather_unknown_kind() {
    let (source, app) = create_test_app();

    let (status, body) = send(&app, "GET", "/weather/beijing/pollen", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("pollen"));
    assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn test_weather_expires_after_ttl() {
    let (source, app) = create_test_app_with_ttl(30);

    send(&app, "GET", "/weather/wuhan/sunrise_sunset", None).await;
    tokio::time::sleep(Duration::from_millis(60)).await;

    let (_, status_body) = send(&app, "GET", "/cache/wuhan/sunrise_sunset/status", None).await;
    assert_eq!(status_body["exists"], true);
    assert_eq!(status_body["isExpired"], true);
    assert_eq!(status_body["remainingTime"], 0);

    send(&app, "GET", "/weather/wuhan/sunrise_sunset", None).await;
    assert_eq!(source.calls(), 2);
}

// == Cache Endpoint Tests ==

#[tokio::test]
async fn test_cache_status_reports_remaining_time() {
    let (_, app) = create_test_app();

    let (_, before) = send(&app, "GET", "/cache/beijing/forecast/status", None).await;
    assert_eq!(before["exists"], false);
    assert_eq!(before["isExpired"], false);
    assert_eq!(before["remainingTime"], 0);

    send(&app, "GET", "/weather/beijing/forecast", None).await;

    let (status, after) = send(&app, "GET", "/cache/beijing/forecast/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(after["exists"], true);
    assert_eq!(after["isExpired"], false);
    let remaining = after["remainingTime"].as_u64().unwrap();
    assert!(remaining > 0 && remaining <= 60_000);
}

#[tokio::test]
async fn test_cache_remove_forces_refetch() {
    let (source, app) = create_test_app();

    send(&app, "GET", "/weather/beijing/current", None).await;
    let (status, body) = send(&app, "DELETE", "/cache/beijing/current", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().contains("beijing_current"));

    send(&app, "GET", "/weather/beijing/current", None).await;
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_cache_clear_keeps_favorites() {
    let (source, app) = create_test_app();

    send(&app, "GET", "/weather/beijing/current", None).await;
    send(&app, "GET", "/weather/shanghai/current", None).await;
    send(
        &app,
        "POST",
        "/favorites",
        Some(r#"{"value":"beijing","label":"Beijing","lat":39.9,"lon":116.4}"#),
    )
    .await;

    let (status, _) = send(&app, "DELETE", "/cache", None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, stats) = send(&app, "GET", "/stats", None).await;
    assert_eq!(stats["total_entries"], 0);

    let (_, favorites) = send(&app, "GET", "/favorites", None).await;
    assert_eq!(favorites.as_array().unwrap().len(), 1);

    send(&app, "GET", "/weather/beijing/current", None).await;
    assert_eq!(source.calls(), 3);
}

#[tokio::test]
async fn test_cache_purge() {
    let (_, app) = create_test_app_with_ttl(20);

    send(&app, "GET", "/weather/beijing/current", None).await;
    send(&app, "GET", "/weather/beijing/forecast", None).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    let (status, body) = send(&app, "POST", "/cache/purge", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 2);
}

// == Stats Endpoint Tests ==

#[tokio::test]
async fn test_stats_track_hits_and_misses() {
    let (_, app) = create_test_app();

    send(&app, "GET", "/weather/beijing/current", None).await;
    send(&app, "GET", "/weather/beijing/current", None).await;
    send(&app, "GET", "/weather/beijing/current", None).await;

    let (status, stats) = send(&app, "GET", "/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["hits"], 2);
    assert_eq!(stats["misses"], 1);
    assert_eq!(stats["writes"], 1);
    assert_eq!(stats["total_entries"], 1);
}

// == Favorites Endpoint Tests ==

#[tokio::test]
async fn test_favorites_lifecycle() {
    let (_, app) = create_test_app();
    let city = r#"{"value":"chengdu","label":"Chengdu","lat":30.57,"lon":104.07}"#;

    let (status, body) = send(&app, "POST", "/favorites", Some(city)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["added"], true);

    let (_, body) = send(&app, "POST", "/favorites", Some(city)).await;
    assert_eq!(body["added"], false);

    let (_, list) = send(&app, "GET", "/favorites", None).await;
    assert_eq!(list[0]["value"], "chengdu");

    let (status, _) = send(&app, "DELETE", "/favorites/chengdu", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, "DELETE", "/favorites/chengdu", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.get("error").is_some());
}

#[tokio::test]
async fn test_favorites_rejects_invalid_city() {
    let (_, app) = create_test_app();

    let (status, body) = send(
        &app,
        "POST",
        "/favorites",
        Some(r#"{"value":"","label":"Nowhere","lat":0.0,"lon":0.0}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("error").is_some());
}

#[tokio::test]
async fn test_favorites_clear() {
    let (_, app) = create_test_app();
    send(
        &app,
        "POST",
        "/favorites",
        Some(r#"{"value":"xian","label":"Xi'an","lat":34.34,"lon":108.94}"#),
    )
    .await;

    let (status, _) = send(&app, "DELETE", "/favorites", None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, list) = send(&app, "GET", "/favorites", None).await;
    assert_eq!(list, serde_json::json!([]));
}

// == Cities and Convert Endpoint Tests ==

#[tokio::test]
async fn test_cities_defaults() {
    let (_, app) = create_test_app();

    let (status, body) = send(&app, "GET", "/cities?q=anything", None).await;
    assert_eq!(status, StatusCode::OK);
    let cities = body.as_array().unwrap();
    assert!(!cities.is_empty());
    assert!(cities.iter().all(|c| c.get("value").is_some()));
}

#[tokio::test]
async fn test_cities_limit() {
    let (_, app) = create_test_app();

    let (status, body) = send(&app, "GET", "/cities?limit=1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_convert_rejects_huge_decimals() {
    let (_, app) = create_test_app();

    let (status, body) = send(
        &app,
        "GET",
        "/convert?value=1&from=c&to=f&decimals=70000",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("decimals"));
}

#[tokio::test]
async fn test_coordinates_endpoint() {
    let (_, app) = create_test_app();

    let (status, body) = send(&app, "GET", "/coordinates?lat=39.9042&lon=116.4074", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["formatted"], "39.904200°N, 116.407400°E");

    let (_, body) = send(&app, "GET", "/coordinates?lat=-1.5&lon=-2.3&decimals=1", None).await;
    assert_eq!(body["formatted"], "1.5°S, 2.3°W");
}

#[tokio::test]
async fn test_convert_endpoint() {
    let (_, app) = create_test_app();

    let (status, body) = send(&app, "GET", "/convert?value=0&from=celsius&to=kelvin&decimals=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["value"], 273.15);
    assert_eq!(body["unit"], "kelvin");
    assert_eq!(body["formatted"], "273.15K");
}

#[tokio::test]
async fn test_convert_unknown_unit() {
    let (_, app) = create_test_app();

    let (status, body) = send(&app, "GET", "/convert?value=0&from=celsius&to=rankine", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("rankine"));
}

// == Tool Endpoint Tests ==

#[tokio::test]
async fn test_tool_favorites_toggle() {
    let (_, app) = create_test_app();

    let (status, body) = send(&app, "POST", "/tools/favorites/converter", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["favorite"], true);

    let (_, list) = send(&app, "GET", "/tools/favorites", None).await;
    assert_eq!(list, serde_json::json!(["converter"]));

    let (_, body) = send(&app, "POST", "/tools/favorites/converter", None).await;
    assert_eq!(body["favorite"], false);

    send(&app, "POST", "/tools/favorites/geo", None).await;
    let (status, _) = send(&app, "DELETE", "/tools/favorites", None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, list) = send(&app, "GET", "/tools/favorites", None).await;
    assert_eq!(list, serde_json::json!([]));
}

#[tokio::test]
async fn test_tool_recent_usage() {
    let (_, app) = create_test_app();

    for id in ["a", "b", "a"] {
        send(&app, "POST", &format!("/tools/recent/{}", id), None).await;
    }
    let (_, recent) = send(&app, "GET", "/tools/recent", None).await;
    assert_eq!(recent, serde_json::json!(["a", "b"]));

    let (status, _) = send(&app, "DELETE", "/tools/recent", None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, recent) = send(&app, "GET", "/tools/recent", None).await;
    assert_eq!(recent, serde_json::json!([]));
}

#[tokio::test]
async fn test_favorite_remove_with_disabled_storage() {
    let storage = Arc::new(MemoryStorage::new());
    let state = AppState::new(storage.clone(), Arc::new(StubSource::default()), 60_000);
    let app = create_router(state);
    send(
        &app,
        "POST",
        "/favorites",
        Some(r#"{"value":"xian","label":"Xi'an","lat":34.34,"lon":108.94}"#),
    )
    .await;
    storage.set_enabled(false);

    let (status, body) = send(&app, "DELETE", "/favorites/xian", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.get("error").is_some());
}

// == Health Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let (_, app) = create_test_app();

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}
