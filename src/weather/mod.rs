//! Weather Module
//!
//! Report types, the Open-Meteo producer and the cached weather service.

pub mod cities;
mod client;
pub mod codes;
mod model;
mod service;

pub use client::{FetchError, WeatherClient};
pub use model::{
    AirQuality, City, Coordinates, CurrentWeather, DataKind, ForecastDay, SunriseSunset, UvIndex,
};
pub use service::{WeatherService, WeatherSource};

#[cfg(test)]
pub(crate) use service::testing;
