//! Built-in city list used before falling back to geocoding.

use crate::weather::{City, Coordinates};

const DEFAULT_CITIES: [(&str, &str, f64, f64); 10] = [
    ("beijing", "Beijing", 39.9042, 116.4074),
    ("shanghai", "Shanghai", 31.2304, 121.4737),
    ("guangzhou", "Guangzhou", 23.1291, 113.2644),
    ("shenzhen", "Shenzhen", 22.5431, 114.0579),
    ("hangzhou", "Hangzhou", 30.2741, 120.1551),
    ("chengdu", "Chengdu", 30.5728, 104.0668),
    ("wuhan", "Wuhan", 30.5928, 114.3055),
    ("xian", "Xi'an", 34.3416, 108.9398),
    ("nanjing", "Nanjing", 32.0603, 118.7969),
    ("tianjin", "Tianjin", 39.3434, 117.3616),
];

pub fn default_cities() -> Vec<City> {
    DEFAULT_CITIES
        .iter()
        .map(|&(value, label, lat, lon)| City {
            value: value.to_string(),
            label: label.to_string(),
            lat,
            lon,
        })
        .collect()
}

/// Coordinates of a built-in city by slug.
pub fn find_city(value: &str) -> Option<Coordinates> {
    DEFAULT_CITIES
        .iter()
        .find(|(v, ..)| *v == value)
        .map(|&(_, _, lat, lon)| Coordinates { lat, lon })
}

/// Turns a place name into a cache-friendly slug.
pub fn slugify(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cities() {
        let cities = default_cities();
        assert_eq!(cities.len(), 10);
        assert_eq!(cities[0].value, "beijing");
    }

    #[test]
    fn test_find_city() {
        let coords = find_city("xian").unwrap();
        assert_eq!(coords.lat, 34.3416);
        assert!(find_city("atlantis").is_none());
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("New  York City"), "new-york-city");
        assert_eq!(slugify("Paris"), "paris");
    }
}
