//! City Favorites
//!
//! Persists the user's favorite cities as one JSON array in the shared
//! storage substrate. Mutations report storage failures so callers can tell
//! "nothing to do" apart from "storage refused"; reads fall back to empty.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{error, info};

use crate::cache::Storage;
use crate::error::StorageError;
use crate::weather::City;

/// Storage key holding the favorites array.
pub const FAVORITES_STORAGE_KEY: &str = "weather_city_favorites";

// == JSON list helpers ==
/// Reads the JSON array under `key`; absent means empty.
pub(crate) fn load_list<T: DeserializeOwned>(
    storage: &dyn Storage,
    key: &str,
) -> Result<Vec<T>, StorageError> {
    match storage.get_item(key)? {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => Ok(Vec::new()),
    }
}

pub(crate) fn save_list<T: Serialize>(
    storage: &dyn Storage,
    key: &str,
    items: &[T],
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(items)?;
    storage.set_item(key, &raw)
}

#[derive(Clone)]
pub struct CityFavorites {
    storage: Arc<dyn Storage>,
}

impl CityFavorites {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    fn load(&self) -> Result<Vec<City>, StorageError> {
        load_list(self.storage.as_ref(), FAVORITES_STORAGE_KEY)
    }

    fn save(&self, cities: &[City]) -> Result<(), StorageError> {
        save_list(self.storage.as_ref(), FAVORITES_STORAGE_KEY, cities)
    }

    /// All favorite cities in insertion order. Empty on any failure.
    pub fn list(&self) -> Vec<City> {
        self.load().unwrap_or_else(|e| {
            error!(error = %e, "failed to read favorite cities");
            Vec::new()
        })
    }

    /// Adds `city` unless one with the same `value` is already present.
    ///
    /// `Ok(false)` means it was already a favorite.
    pub fn add(&self, city: City) -> Result<bool, StorageError> {
        let result = self.load().and_then(|mut cities| {
            if cities.iter().any(|c| c.value == city.value) {
                return Ok(false);
            }
            cities.push(city);
            self.save(&cities).map(|()| true)
        });

        match &result {
            Ok(true) => info!("added favorite city"),
            Ok(false) => {}
            Err(e) => error!(error = %e, "failed to add favorite city"),
        }
        result
    }

    /// Removes the city identified by `value`. `Ok(false)` if it was absent.
    pub fn remove(&self, value: &str) -> Result<bool, StorageError> {
        let result = self.load().and_then(|cities| {
            let before = cities.len();
            let kept: Vec<City> = cities.into_iter().filter(|c| c.value != value).collect();
            if kept.len() == before {
                return Ok(false);
            }
            self.save(&kept).map(|()| true)
        });

        if let Err(e) = &result {
            error!(error = %e, city = value, "failed to remove favorite city");
        }
        result
    }

    pub fn contains(&self, value: &str) -> bool {
        self.list().iter().any(|c| c.value == value)
    }

    /// Drops every favorite.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage
            .remove_item(FAVORITES_STORAGE_KEY)
            .inspect_err(|e| error!(error = %e, "failed to clear favorite cities"))
    }
}
