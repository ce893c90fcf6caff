//! Request DTOs for the weather cache API
//!
//! Defines the structure of incoming request bodies and query strings.

use serde::Deserialize;

use crate::units::MAX_DECIMALS;
use crate::weather::City;

const MAX_CITY_VALUE_LENGTH: usize = 128;

/// Body for `POST /favorites`.
#[derive(Debug, Clone, Deserialize)]
pub struct AddFavoriteRequest {
    #[serde(flatten)]
    pub city: City,
}

impl AddFavoriteRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        let city = &self.city;
        if city.value.trim().is_empty() {
            return Some("City value cannot be empty".to_string());
        }
        if city.value.len() > MAX_CITY_VALUE_LENGTH {
            return Some(format!(
                "City value exceeds maximum length of {} characters",
                MAX_CITY_VALUE_LENGTH
            ));
        }
        if !(-90.0..=90.0).contains(&city.lat) || !(-180.0..=180.0).contains(&city.lon) {
            return Some("Coordinates out of range".to_string());
        }
        None
    }
}

/// Query for `GET /cities`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CitySearchQuery {
    #[serde(default)]
    pub q: String,
    pub limit: Option<usize>,
}

/// Query for `GET /convert`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConvertQuery {
    pub value: f64,
    pub from: String,
    pub to: String,
    pub decimals: Option<usize>,
}

impl ConvertQuery {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        match self.decimals {
            Some(decimals) if decimals > MAX_DECIMALS => Some(format!(
                "decimals must be between 0 and {}",
                MAX_DECIMALS
            )),
            _ => None,
        }
    }
}

/// Query for `GET /coordinates`.
#[derive(Debug, Clone, Deserialize)]
pub struct CoordinatesQuery {
    pub lat: f64,
    pub lon: f64,
    pub decimals: Option<usize>,
}

impl CoordinatesQuery {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if !(-90.0..=90.0).contains(&self.lat) || !(-180.0..=180.0).contains(&self.lon) {
            return Some("Coordinates out of range".to_string());
        }
        match self.decimals {
            Some(decimals) if decimals > MAX_DECIMALS => Some(format!(
                "decimals must be between 0 and {}",
                MAX_DECIMALS
            )),
            _ => None,
        }
    }
}
