//! Weather data models returned by producers and cached by the store.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// == Data Kind ==
/// The kind of weather report, used as the second half of a cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataKind {
    Current,
    Forecast,
    AirQuality,
    UvIndex,
    SunriseSunset,
}

impl DataKind {
    pub const ALL: [DataKind; 5] = [
        DataKind::Current,
        DataKind::Forecast,
        DataKind::AirQuality,
        DataKind::UvIndex,
        DataKind::SunriseSunset,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataKind::Current => "current",
            DataKind::Forecast => "forecast",
            DataKind::AirQuality => "air_quality",
            DataKind::UvIndex => "uv_index",
            DataKind::SunriseSunset => "sunrise_sunset",
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown weather data kind '{}'", s))
    }
}

// == Locations ==
/// A selectable city. `value` is the slug used in cache keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub value: String,
    pub label: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

// == Reports ==
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentWeather {
    /// Rounded air temperature, °C
    pub temperature: i64,
    /// Rounded apparent temperature, °C
    pub feels_like: i64,
    /// Relative humidity, %
    pub humidity: f64,
    /// Wind speed, km/h
    pub wind_speed: f64,
    pub weather: String,
    pub weather_code: u8,
    pub icon: String,
    /// Mean sea level pressure, hPa
    pub pressure: f64,
    /// Visibility, m
    pub visibility: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastDay {
    pub date: String,
    pub temperature_min: i64,
    pub temperature_max: i64,
    pub weather: String,
    /// Maximum precipitation probability, %
    pub precipitation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQuality {
    pub aqi: i64,
    pub pm25: f64,
    pub pm10: f64,
    pub o3: f64,
    pub no2: f64,
    pub so2: f64,
    pub co: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UvIndex {
    pub uv_index: i64,
    pub level: String,
    pub advice: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SunriseSunset {
    /// Local time, `HH:MM`
    pub sunrise: String,
    pub sunset: String,
    /// e.g. `13h 52m`
    pub day_length: String,
}
