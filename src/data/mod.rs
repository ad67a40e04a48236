//! Core data models for Citycast
//!
//! This module contains the records returned by the places catalog and the
//! weather provider, the gateway traits the rest of the application talks to,
//! and the error type shared by both remote services.

pub mod places;
pub mod weather;

pub use places::PlacesClient;
pub use weather::OpenWeatherClient;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Errors that can occur when talking to a remote service
///
/// There is no retry policy: every variant surfaces to the caller after a
/// single attempt.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure (DNS, connection, TLS, timeout, body read)
    #[error("Failed to fetch data: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("Failed to fetch data: server responded with status {0}")]
    Status(u16),

    /// Failed to parse JSON response
    #[error("Failed to parse response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// One of a pair of required responses was empty
    #[error("No weather data received")]
    NoData,
}

/// A geographic point as reported by the places catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lon: f64,
    pub lat: f64,
}

/// A city from the places catalog
///
/// Textual fields are optional because the catalog occasionally omits them;
/// the accessors below return an empty string in that case so sorting and
/// filtering never have to special-case missing values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    /// Catalog identifier (not unique across pages)
    #[serde(rename = "geoname_id", default, deserialize_with = "de_geoname_id")]
    pub id: u64,
    /// Display name, possibly with diacritics
    #[serde(default)]
    pub name: Option<String>,
    /// ASCII name, used for weather lookups and autocomplete
    #[serde(default)]
    pub ascii_name: Option<String>,
    /// English country name
    #[serde(rename = "cou_name_en", default)]
    pub country: Option<String>,
    /// IANA timezone label
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub coordinates: Coordinates,
    #[serde(default)]
    pub population: Option<u64>,
}

impl City {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    pub fn ascii_name(&self) -> &str {
        self.ascii_name.as_deref().unwrap_or("")
    }

    pub fn country(&self) -> &str {
        self.country.as_deref().unwrap_or("")
    }

    pub fn timezone(&self) -> &str {
        self.timezone.as_deref().unwrap_or("")
    }
}

/// The catalog serves identifiers as strings, older snapshots as numbers.
fn de_geoname_id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(id) => Ok(id),
        RawId::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Primary weather condition reported by the provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Provider condition code (e.g. 800 for clear sky)
    pub code: u32,
    /// Condition group label (e.g. "Clear", "Rain")
    pub label: String,
    /// Human readable description (e.g. "light rain")
    pub description: String,
}

impl Condition {
    pub fn kind(&self) -> ConditionKind {
        ConditionKind::from_label(&self.label)
    }
}

/// Closed set of condition groups the views know how to present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionKind {
    Clear,
    Rain,
    Clouds,
    Snow,
    Thunderstorm,
    Fog,
}

impl ConditionKind {
    /// Maps a provider label to a condition group, case-insensitively.
    ///
    /// Unrecognized labels fall back to `Clear`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "clear" => ConditionKind::Clear,
            "rain" => ConditionKind::Rain,
            "clouds" => ConditionKind::Clouds,
            "snow" => ConditionKind::Snow,
            "thunderstorm" => ConditionKind::Thunderstorm,
            "fog" | "mist" => ConditionKind::Fog,
            _ => ConditionKind::Clear,
        }
    }
}

/// Current weather conditions for a city, metric units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// City name as resolved by the provider
    pub city_name: String,
    /// ISO country code
    pub country: Option<String>,
    pub coordinates: Coordinates,
    pub condition: Condition,
    /// Temperature in Celsius
    pub temperature: f64,
    /// Feels-like temperature in Celsius
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    /// Atmospheric pressure in hPa
    pub pressure: f64,
    /// Relative humidity percentage (0-100)
    pub humidity: u8,
    /// Wind speed in m/s
    pub wind_speed: f64,
    /// Wind direction in degrees
    pub wind_direction: f64,
    /// Cloud cover percentage (0-100)
    pub cloud_cover: u8,
    /// Observation time
    pub observed_at: DateTime<Utc>,
}

/// A single 3-hourly forecast slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub time: DateTime<Utc>,
    pub temperature: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub pressure: f64,
    pub humidity: u8,
    pub condition: Condition,
    pub wind_speed: f64,
    pub wind_direction: f64,
    pub cloud_cover: u8,
}

/// 5-day forecast in 3-hour steps, ordered by time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub city_name: String,
    pub country: Option<String>,
    pub entries: Vec<ForecastEntry>,
}

/// Searchable catalog of cities
#[allow(async_fn_in_trait)]
pub trait CityCatalog {
    /// Returns at most `limit` cities starting at `offset`.
    ///
    /// A non-empty `text` restricts results to names matching it; an empty
    /// `text` returns an unfiltered page.
    async fn search_cities(
        &self,
        text: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<City>, FetchError>;
}

/// Weather provider keyed by city name
///
/// `Ok(None)` means the provider answered successfully with an empty body.
#[allow(async_fn_in_trait)]
pub trait WeatherSource {
    async fn fetch_current_weather(
        &self,
        city_name: &str,
    ) -> Result<Option<WeatherSnapshot>, FetchError>;

    async fn fetch_forecast(&self, city_name: &str) -> Result<Option<Forecast>, FetchError>;
}
