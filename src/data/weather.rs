//! OpenWeather API client
//!
//! This module fetches current conditions and the 5-day/3-hour forecast by
//! city name and converts the provider's JSON into our weather data structures.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{Condition, Coordinates, FetchError, Forecast, ForecastEntry, WeatherSnapshot, WeatherSource};
use crate::config::ApiKey;

/// Base URL for the OpenWeather API
pub const OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Number of 3-hourly forecast slots requested (5 days)
pub const FORECAST_SLOTS: usize = 40;

/// Client for the OpenWeather current-conditions and forecast endpoints
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: Client,
    base_url: String,
    api_key: ApiKey,
}

impl OpenWeatherClient {
    pub fn new(api_key: ApiKey) -> Self {
        Self::with_base_url(api_key, OPENWEATHER_BASE_URL)
    }

    /// Creates a client against a different provider endpoint
    pub fn with_base_url(api_key: ApiKey, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issues a GET for `endpoint` and returns the body on success
    async fn get(&self, endpoint: &str, params: &[(&str, String)]) -> Result<String, FetchError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(%url, "Fetching weather");

        let response = self
            .client
            .get(&url)
            .query(&[("appid", self.api_key.expose()), ("units", "metric")])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), endpoint, "Weather request failed");
            return Err(FetchError::Status(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}

impl WeatherSource for OpenWeatherClient {
    async fn fetch_current_weather(
        &self,
        city_name: &str,
    ) -> Result<Option<WeatherSnapshot>, FetchError> {
        let body = self.get("weather", &[("q", city_name.to_string())]).await?;
        parse_current(&body)
    }

    async fn fetch_forecast(&self, city_name: &str) -> Result<Option<Forecast>, FetchError> {
        let body = self
            .get(
                "forecast",
                &[
                    ("q", city_name.to_string()),
                    ("cnt", FORECAST_SLOTS.to_string()),
                ],
            )
            .await?;
        parse_forecast(&body)
    }
}

/// Parses a current-conditions body; a JSON `null` body yields `None`.
fn parse_current(body: &str) -> Result<Option<WeatherSnapshot>, FetchError> {
    let raw: Option<ApiCurrent> = serde_json::from_str(body)?;
    Ok(raw.map(WeatherSnapshot::from))
}

/// Parses a forecast body; a JSON `null` body yields `None`.
fn parse_forecast(body: &str) -> Result<Option<Forecast>, FetchError> {
    let raw: Option<ApiForecast> = serde_json::from_str(body)?;
    Ok(raw.map(Forecast::from))
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

/// The provider sends a list of conditions; the first one is primary.
fn primary_condition(conditions: Vec<ApiCondition>) -> Condition {
    conditions
        .into_iter()
        .next()
        .map(|c| Condition {
            code: c.id,
            label: c.main,
            description: c.description,
        })
        .unwrap_or_default()
}

impl From<ApiCurrent> for WeatherSnapshot {
    fn from(raw: ApiCurrent) -> Self {
        WeatherSnapshot {
            city_name: raw.name,
            country: raw.sys.and_then(|s| s.country),
            coordinates: raw.coord,
            condition: primary_condition(raw.weather),
            temperature: raw.main.temp,
            feels_like: raw.main.feels_like.unwrap_or(raw.main.temp),
            temp_min: raw.main.temp_min,
            temp_max: raw.main.temp_max,
            pressure: raw.main.pressure,
            humidity: raw.main.humidity,
            wind_speed: raw.wind.speed,
            wind_direction: raw.wind.deg,
            cloud_cover: raw.clouds.all,
            observed_at: timestamp(raw.dt),
        }
    }
}

impl From<ApiForecastItem> for ForecastEntry {
    fn from(raw: ApiForecastItem) -> Self {
        ForecastEntry {
            time: timestamp(raw.dt),
            temperature: raw.main.temp,
            temp_min: raw.main.temp_min,
            temp_max: raw.main.temp_max,
            pressure: raw.main.pressure,
            humidity: raw.main.humidity,
            condition: primary_condition(raw.weather),
            wind_speed: raw.wind.speed,
            wind_direction: raw.wind.deg,
            cloud_cover: raw.clouds.all,
        }
    }
}

impl From<ApiForecast> for Forecast {
    fn from(raw: ApiForecast) -> Self {
        let (city_name, country) = raw
            .city
            .map(|c| (c.name, c.country))
            .unwrap_or_default();
        Forecast {
            city_name,
            country,
            entries: raw.list.into_iter().map(ForecastEntry::from).collect(),
        }
    }
}

/// Current conditions response
#[derive(Debug, Deserialize)]
struct ApiCurrent {
    #[serde(default)]
    coord: Coordinates,
    #[serde(default)]
    weather: Vec<ApiCondition>,
    main: ApiMain,
    #[serde(default)]
    wind: ApiWind,
    #[serde(default)]
    clouds: ApiClouds,
    dt: i64,
    #[serde(default)]
    sys: Option<ApiSys>,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiCondition {
    id: u32,
    main: String,
    #[serde(default)]
    description: String,
}

/// Temperature block; the forecast variant omits nothing we need but
/// `feels_like` is treated as optional for older payloads.
#[derive(Debug, Deserialize)]
struct ApiMain {
    temp: f64,
    #[serde(default)]
    feels_like: Option<f64>,
    temp_min: f64,
    temp_max: f64,
    pressure: f64,
    humidity: u8,
}

#[derive(Debug, Default, Deserialize)]
struct ApiWind {
    #[serde(default)]
    speed: f64,
    #[serde(default)]
    deg: f64,
}

#[derive(Debug, Default, Deserialize)]
struct ApiClouds {
    #[serde(default)]
    all: u8,
}

#[derive(Debug, Deserialize)]
struct ApiSys {
    #[serde(default)]
    country: Option<String>,
}

/// Forecast response
#[derive(Debug, Deserialize)]
struct ApiForecast {
    #[serde(default)]
    list: Vec<ApiForecastItem>,
    #[serde(default)]
    city: Option<ApiForecastCity>,
}

#[derive(Debug, Deserialize)]
struct ApiForecastItem {
    dt: i64,
    main: ApiMain,
    #[serde(default)]
    weather: Vec<ApiCondition>,
    #[serde(default)]
    clouds: ApiClouds,
    #[serde(default)]
    wind: ApiWind,
}

#[derive(Debug, Deserialize)]
struct ApiForecastCity {
    #[serde(default)]
    name: String,
    #[serde(default)]
    country: Option<String>,
}
