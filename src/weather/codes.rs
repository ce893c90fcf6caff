//! WMO weather codes and UV index bands.

/// Short description for a WMO weather interpretation code.
pub fn weather_description(code: u8) -> &'static str {
    match code {
        0 => "Clear sky",
        1..=3 => "Cloudy",
        45..=48 => "Fog",
        51..=67 | 80..=82 => "Rain",
        71..=77 => "Snow",
        95..=99 => "Thunderstorm",
        _ => "Unknown",
    }
}

pub fn weather_icon(code: u8) -> &'static str {
    match code {
        0 => "☀️",
        1..=3 => "⛅",
        45..=48 => "🌫️",
        95..=99 => "⛈️",
        51..=67 | 80..=94 => "🌧️",
        71..=77 => "❄️",
        _ => "🌤️",
    }
}

pub fn uv_level(index: i64) -> &'static str {
    match index {
        i64::MIN..=2 => "Low",
        3..=5 => "Moderate",
        6..=7 => "High",
        8..=10 => "Very high",
        _ => "Extreme",
    }
}

pub fn uv_advice(index: i64) -> &'static str {
    match index {
        i64::MIN..=2 => "No special protection needed, outdoor activity is fine",
        3..=5 => "Use SPF 15+ sunscreen and wear a hat and sunglasses",
        6..=7 => "Use SPF 30+ sunscreen and avoid the sun between 10:00 and 16:00",
        8..=10 => "Use SPF 50+ sunscreen, stay indoors where possible and cover up outside",
        _ => "Extremely dangerous, avoid all outdoor activity",
    }
}
