//! Open-Meteo Client
//!
//! Fetches weather, air quality and geocoding data from the public Open-Meteo
//! APIs and maps them into the crate's report types. Every report comes back
//! as an [`ApiResponse`]; transport and decoding problems become
//! `success: false` envelopes.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::cache::ApiResponse;
use crate::config::Config;
use crate::weather::cities::{default_cities, find_city, slugify};
use crate::weather::codes::{uv_advice, uv_level, weather_description, weather_icon};
use crate::weather::{
    AirQuality, City, Coordinates, CurrentWeather, DataKind, ForecastDay, SunriseSunset, UvIndex,
    WeatherSource,
};

const CITY_NOT_FOUND: &str = "no coordinates found for city";
const FORECAST_DAYS: u8 = 7;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed upstream response: missing {0}")]
    Malformed(&'static str),
}

// == Raw upstream payloads ==
#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current_weather: Option<RawCurrentWeather>,
    hourly: Option<RawHourly>,
    daily: Option<RawDaily>,
}

#[derive(Debug, Deserialize)]
struct RawCurrentWeather {
    temperature: f64,
    windspeed: f64,
    weathercode: u8,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawHourly {
    relative_humidity_2m: Vec<Option<f64>>,
    apparent_temperature: Vec<Option<f64>>,
    pressure_msl: Vec<Option<f64>>,
    visibility: Vec<Option<f64>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDaily {
    time: Vec<String>,
    weathercode: Vec<Option<u8>>,
    temperature_2m_max: Vec<Option<f64>>,
    temperature_2m_min: Vec<Option<f64>>,
    precipitation_probability_max: Vec<Option<f64>>,
    uv_index_max: Vec<Option<f64>>,
    sunrise: Vec<String>,
    sunset: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct AirQualityResponse {
    hourly: RawAirHourly,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAirHourly {
    pm2_5: Vec<Option<f64>>,
    pm10: Vec<Option<f64>>,
    ozone: Vec<Option<f64>>,
    nitrogen_dioxide: Vec<Option<f64>>,
    sulphur_dioxide: Vec<Option<f64>>,
    carbon_monoxide: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<GeoResult>,
}

#[derive(Debug, Deserialize)]
struct GeoResult {
    name: String,
    admin1: Option<String>,
    country: Option<String>,
    latitude: f64,
    longitude: f64,
}

// == Parsing ==
fn first(values: &[Option<f64>], field: &'static str) -> Result<f64, FetchError> {
    values
        .first()
        .copied()
        .flatten()
        .ok_or(FetchError::Malformed(field))
}

fn round(value: f64) -> i64 {
    value.round() as i64
}

fn parse_current(raw: ForecastResponse) -> Result<CurrentWeather, FetchError> {
    let current = raw
        .current_weather
        .ok_or(FetchError::Malformed("current_weather"))?;
    let hourly = raw.hourly.ok_or(FetchError::Malformed("hourly"))?;

    Ok(CurrentWeather {
        temperature: round(current.temperature),
        feels_like: round(first(&hourly.apparent_temperature, "apparent_temperature")?),
        humidity: first(&hourly.relative_humidity_2m, "relative_humidity_2m")?,
        wind_speed: current.windspeed,
        weather: weather_description(current.weathercode).to_string(),
        weather_code: current.weathercode,
        icon: weather_icon(current.weathercode).to_string(),
        pressure: first(&hourly.pressure_msl, "pressure_msl")?,
        visibility: first(&hourly.visibility, "visibility")?,
    })
}

fn parse_forecast(raw: ForecastResponse) -> Result<Vec<ForecastDay>, FetchError> {
    let daily = raw.daily.ok_or(FetchError::Malformed("daily"))?;

    daily
        .time
        .iter()
        .enumerate()
        .map(|(i, date)| {
            let at = |values: &[Option<f64>], field| {
                values
                    .get(i)
                    .copied()
                    .flatten()
                    .ok_or(FetchError::Malformed(field))
            };
            let code = daily.weathercode.get(i).copied().flatten().unwrap_or(u8::MAX);

            Ok(ForecastDay {
                date: date.clone(),
                temperature_min: round(at(&daily.temperature_2m_min, "temperature_2m_min")?),
                temperature_max: round(at(&daily.temperature_2m_max, "temperature_2m_max")?),
                weather: weather_description(code).to_string(),
                precipitation: daily
                    .precipitation_probability_max
                    .get(i)
                    .copied()
                    .flatten()
                    .unwrap_or(0.0),
            })
        })
        .collect()
}

fn parse_air_quality(raw: AirQualityResponse) -> Result<AirQuality, FetchError> {
    let hourly = raw.hourly;
    let pm25 = first(&hourly.pm2_5, "pm2_5")?;

    Ok(AirQuality {
        aqi: round(pm25 / 50.0) + 1,
        pm25,
        pm10: first(&hourly.pm10, "pm10")?,
        o3: first(&hourly.ozone, "ozone")?,
        no2: first(&hourly.nitrogen_dioxide, "nitrogen_dioxide")?,
        so2: first(&hourly.sulphur_dioxide, "sulphur_dioxide")?,
        co: first(&hourly.carbon_monoxide, "carbon_monoxide")?,
    })
}

fn parse_uv_index(raw: ForecastResponse) -> Result<UvIndex, FetchError> {
    let daily = raw.daily.ok_or(FetchError::Malformed("daily"))?;
    let uv_index = round(first(&daily.uv_index_max, "uv_index_max")?);

    Ok(UvIndex {
        uv_index,
        level: uv_level(uv_index).to_string(),
        advice: uv_advice(uv_index).to_string(),
    })
}

fn parse_local_time(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

fn parse_sunrise_sunset(raw: ForecastResponse) -> Result<SunriseSunset, FetchError> {
    let daily = raw.daily.ok_or(FetchError::Malformed("daily"))?;
    let sunrise = daily
        .sunrise
        .first()
        .and_then(|s| parse_local_time(s))
        .ok_or(FetchError::Malformed("sunrise"))?;
    let sunset = daily
        .sunset
        .first()
        .and_then(|s| parse_local_time(s))
        .ok_or(FetchError::Malformed("sunset"))?;

    let seconds = (sunset - sunrise).num_seconds().max(0);

    Ok(SunriseSunset {
        sunrise: sunrise.format("%H:%M").to_string(),
        sunset: sunset.format("%H:%M").to_string(),
        day_length: format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60),
    })
}

fn to_city(result: GeoResult) -> City {
    let mut label = result.name.clone();
    for part in [result.admin1, result.country].into_iter().flatten() {
        label.push_str(", ");
        label.push_str(&part);
    }

    City {
        value: slugify(&result.name),
        label,
        lat: result.latitude,
        lon: result.longitude,
    }
}

// == Client ==
/// HTTP client for the Open-Meteo forecast, air-quality and geocoding APIs.
#[derive(Clone)]
pub struct WeatherClient {
    http: reqwest::Client,
    weather_url: String,
    air_quality_url: String,
    geo_url: String,
    timezone: String,
}

impl WeatherClient {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            weather_url: config.weather_api_base_url.clone(),
            air_quality_url: config.air_quality_api_base_url.clone(),
            geo_url: config.geo_api_base_url.clone(),
            timezone: config.timezone.clone(),
        })
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        debug!(url, "requesting upstream");
        let response = self.http.get(url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        Ok(response.json::<T>().await?)
    }

    async fn geocode(&self, name: &str, limit: usize) -> Result<Vec<City>, FetchError> {
        let query = [
            ("name", name.to_string()),
            ("count", limit.to_string()),
            ("language", "en".to_string()),
            ("format", "json".to_string()),
        ];
        let response: GeocodingResponse = self.fetch_json(&self.geo_url, &query).await?;

        Ok(response.results.into_iter().map(to_city).collect())
    }

    /// Searches cities by name. Blank queries and lookup failures return the
    /// built-in list.
    pub async fn find_cities(&self, query: &str, limit: usize) -> Vec<City> {
        let query = query.trim();
        if query.is_empty() {
            return default_cities().into_iter().take(limit).collect();
        }

        match self.geocode(query, limit).await {
            Ok(cities) => cities,
            Err(e) => {
                warn!(query, error = %e, "city search failed, using defaults");
                default_cities().into_iter().take(limit).collect()
            }
        }
    }

    /// Resolves a city slug or name to coordinates.
    pub async fn coordinates(&self, city: &str) -> Option<Coordinates> {
        if let Some(coords) = find_city(city) {
            return Some(coords);
        }

        match self.geocode(city, 1).await {
            Ok(found) => found.first().map(|c| Coordinates {
                lat: c.lat,
                lon: c.lon,
            }),
            Err(e) => {
                warn!(city, error = %e, "failed to geocode city");
                None
            }
        }
    }

    fn location_query(&self, coords: Coordinates) -> Vec<(&'static str, String)> {
        vec![
            ("latitude", coords.lat.to_string()),
            ("longitude", coords.lon.to_string()),
            ("timezone", self.timezone.clone()),
        ]
    }

    /// Resolves `city`, calls the forecast endpoint with `params` and parses.
    async fn forecast_report<T>(
        &self,
        city: &str,
        kind: DataKind,
        params: &[(&'static str, &str)],
        parse: fn(ForecastResponse) -> Result<T, FetchError>,
    ) -> ApiResponse<T> {
        let Some(coords) = self.coordinates(city).await else {
            return ApiResponse::failure(CITY_NOT_FOUND);
        };

        let mut query = self.location_query(coords);
        query.extend(params.iter().map(|&(k, v)| (k, v.to_string())));

        let result = self
            .fetch_json::<ForecastResponse>(&self.weather_url, &query)
            .await
            .and_then(parse);
        into_response(city, kind, result)
    }
}

fn into_response<T>(city: &str, kind: DataKind, result: Result<T, FetchError>) -> ApiResponse<T> {
    match result {
        Ok(data) => ApiResponse::ok(data),
        Err(e) => {
            error!(city, %kind, error = %e, "weather fetch failed");
            ApiResponse::failure(format!(
                "failed to fetch {} data, please try again later",
                kind
            ))
        }
    }
}

#[async_trait]
impl WeatherSource for WeatherClient {
    async fn current(&self, city: &str) -> ApiResponse<CurrentWeather> {
        let params = [
            ("current_weather", "true"),
            (
                "hourly",
                "temperature_2m,relative_humidity_2m,apparent_temperature,pressure_msl,visibility,wind_speed_10m",
            ),
        ];
        self.forecast_report(city, DataKind::Current, &params, parse_current)
            .await
    }

    async fn forecast(&self, city: &str) -> ApiResponse<Vec<ForecastDay>> {
        let days = FORECAST_DAYS.to_string();
        let params = [
            (
                "daily",
                "weathercode,temperature_2m_max,temperature_2m_min,precipitation_probability_max",
            ),
            ("forecast_days", days.as_str()),
        ];
        self.forecast_report(city, DataKind::Forecast, &params, parse_forecast)
            .await
    }

    async fn air_quality(&self, city: &str) -> ApiResponse<AirQuality> {
        let Some(coords) = self.coordinates(city).await else {
            return ApiResponse::failure(CITY_NOT_FOUND);
        };

        let query = [
            ("latitude", coords.lat.to_string()),
            ("longitude", coords.lon.to_string()),
            (
                "hourly",
                "pm2_5,pm10,ozone,nitrogen_dioxide,sulphur_dioxide,carbon_monoxide".to_string(),
            ),
        ];
        let result = self
            .fetch_json::<AirQualityResponse>(&self.air_quality_url, &query)
            .await
            .and_then(parse_air_quality);
        into_response(city, DataKind::AirQuality, result)
    }

    async fn uv_index(&self, city: &str) -> ApiResponse<UvIndex> {
        let params = [("daily", "uv_index_max")];
        self.forecast_report(city, DataKind::UvIndex, &params, parse_uv_index)
            .await
    }

    async fn sunrise_sunset(&self, city: &str) -> ApiResponse<SunriseSunset> {
        let params = [("daily", "sunrise,sunset")];
        self.forecast_report(city, DataKind::SunriseSunset, &params, parse_sunrise_sunset)
            .await
    }

    async fn search_cities(&self, query: &str, limit: usize) -> Vec<City> {
        self.find_cities(query, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forecast(json: &str) -> ForecastResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_parse_current() {
        let raw = forecast(
            r#"{
                "current_weather": {"temperature": 20.6, "windspeed": 11.2, "weathercode": 3},
                "hourly": {
                    "relative_humidity_2m": [55, 60],
                    "apparent_temperature": [19.4, 18.0],
                    "pressure_msl": [1012.5],
                    "visibility": [24140.0]
                }
            }"#,
        );

        let current = parse_current(raw).unwrap();
        assert_eq!(current.temperature, 21);
        assert_eq!(current.feels_like, 19);
        assert_eq!(current.humidity, 55.0);
        assert_eq!(current.weather, "Cloudy");
        assert_eq!(current.icon, "⛅");
        assert_eq!(current.pressure, 1012.5);
    }

    #[test]
    fn test_parse_current_missing_block() {
        let raw = forecast(r#"{"hourly": {}}"#);
        assert!(matches!(
            parse_current(raw),
            Err(FetchError::Malformed("current_weather"))
        ));
    }

    #[test]
    fn test_parse_forecast() {
        let raw = forecast(
            r#"{
                "daily": {
                    "time": ["2024-06-01", "2024-06-02"],
                    "weathercode": [0, 61],
                    "temperature_2m_max": [30.4, 25.5],
                    "temperature_2m_min": [20.2, 18.6],
                    "precipitation_probability_max": [10, null]
                }
            }"#,
        );

        let days = parse_forecast(raw).unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].temperature_max, 30);
        assert_eq!(days[1].temperature_max, 26);
        assert_eq!(days[1].temperature_min, 19);
        assert_eq!(days[1].weather, "Rain");
        assert_eq!(days[1].precipitation, 0.0);
    }

    #[test]
    fn test_parse_air_quality() {
        let raw: AirQualityResponse = serde_json::from_str(
            r#"{"hourly": {
                "pm2_5": [80.0], "pm10": [100.0], "ozone": [40.0],
                "nitrogen_dioxide": [20.0], "sulphur_dioxide": [5.0], "carbon_monoxide": [300.0]
            }}"#,
        )
        .unwrap();

        let air = parse_air_quality(raw).unwrap();
        assert_eq!(air.aqi, 3);
        assert_eq!(air.pm25, 80.0);
        assert_eq!(air.co, 300.0);
    }

    #[test]
    fn test_parse_air_quality_null_reading() {
        let raw: AirQualityResponse =
            serde_json::from_str(r#"{"hourly": {"pm2_5": [null]}}"#).unwrap();
        assert!(matches!(
            parse_air_quality(raw),
            Err(FetchError::Malformed("pm2_5"))
        ));
    }

    #[test]
    fn test_parse_uv_index() {
        let raw = forecast(r#"{"daily": {"uv_index_max": [6.6]}}"#);

        let uv = parse_uv_index(raw).unwrap();
        assert_eq!(uv.uv_index, 7);
        assert_eq!(uv.level, "High");
    }

    #[test]
    fn test_parse_sunrise_sunset() {
        let raw = forecast(
            r#"{"daily": {"sunrise": ["2024-06-01T04:46"], "sunset": ["2024-06-01T19:38"]}}"#,
        );

        let sun = parse_sunrise_sunset(raw).unwrap();
        assert_eq!(sun.sunrise, "04:46");
        assert_eq!(sun.sunset, "19:38");
        assert_eq!(sun.day_length, "14h 52m");
    }

    #[test]
    fn test_to_city_label() {
        let city = to_city(GeoResult {
            name: "San Francisco".to_string(),
            admin1: Some("California".to_string()),
            country: Some("United States".to_string()),
            latitude: 37.77,
            longitude: -122.42,
        });

        assert_eq!(city.value, "san-francisco");
        assert_eq!(city.label, "San Francisco, California, United States");
    }

    #[tokio::test]
    async fn test_unreachable_upstream_reports_failure() {
        let config = Config {
            weather_api_base_url: "http://127.0.0.1:9/forecast".to_string(),
            geo_api_base_url: "http://127.0.0.1:9/search".to_string(),
            http_timeout_secs: 2,
            ..Config::default()
        };
        let client = WeatherClient::new(&config).unwrap();

        let response = client.current("beijing").await;
        assert!(!response.success);
        assert!(response.data.is_none());

        // Unknown city with a dead geocoder resolves to nothing
        let response = client.uv_index("atlantis").await;
        assert_eq!(response.error.as_deref(), Some(CITY_NOT_FOUND));

        // Search falls back to the built-in list, still honoring the limit
        assert_eq!(client.find_cities("atlantis", 50).await.len(), 10);
        assert_eq!(client.find_cities("atlantis", 3).await.len(), 3);
        assert_eq!(client.find_cities("  ", 1).await.len(), 1);
    }
}
