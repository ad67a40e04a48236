//! Weather detail controller
//!
//! Drives the per-city weather screen: a short settle delay after opening,
//! one paired fetch of current conditions and forecast, and an epoch so a
//! response that lands after the user has moved on is ignored.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::data::{FetchError, Forecast, ForecastEntry, WeatherSnapshot, WeatherSource};

/// Delay between opening the screen and issuing the fetch
pub const SETTLE_DELAY: Duration = Duration::from_millis(500);

/// Forecast slots per day (3-hour steps)
const SLOTS_PER_DAY: usize = 8;

/// Days shown in the forecast summary
const SUMMARY_DAYS: usize = 5;

/// Both halves of a successful detail load
#[derive(Debug, Clone, PartialEq)]
pub struct CityWeather {
    pub current: WeatherSnapshot,
    pub forecast: Forecast,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    /// No city open
    Closed,
    /// Waiting out the settle delay
    Pending { due_at: Instant },
    Loading,
    Loaded(Box<CityWeather>),
    Errored(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherRequest {
    pub epoch: u64,
    pub city_name: String,
}

impl WeatherRequest {
    pub async fn execute<W: WeatherSource>(self, source: &W) -> WeatherResponse {
        let result = fetch_city_weather(source, &self.city_name).await;
        WeatherResponse {
            epoch: self.epoch,
            result,
        }
    }
}

#[derive(Debug)]
pub struct WeatherResponse {
    pub epoch: u64,
    pub result: Result<CityWeather, FetchError>,
}

/// Fetches current conditions and forecast concurrently.
///
/// Both must succeed; the first failure wins. A successful but empty payload
/// on either side is reported as `FetchError::NoData`.
pub async fn fetch_city_weather<W: WeatherSource>(
    source: &W,
    city_name: &str,
) -> Result<CityWeather, FetchError> {
    let (current, forecast) = futures::try_join!(
        source.fetch_current_weather(city_name),
        source.fetch_forecast(city_name)
    )?;

    match (current, forecast) {
        (Some(current), Some(forecast)) => Ok(CityWeather { current, forecast }),
        _ => Err(FetchError::NoData),
    }
}

/// One entry per day: slots 0, 8, 16, ... truncated to five days
pub fn five_day_summary(forecast: &Forecast) -> Vec<&ForecastEntry> {
    forecast
        .entries
        .iter()
        .step_by(SLOTS_PER_DAY)
        .take(SUMMARY_DAYS)
        .collect()
}

#[derive(Debug)]
pub struct WeatherDetail {
    city_name: String,
    state: DetailState,
    epoch: u64,
}

impl Default for WeatherDetail {
    fn default() -> Self {
        Self::new()
    }
}

impl WeatherDetail {
    pub fn new() -> Self {
        Self {
            city_name: String::new(),
            state: DetailState::Closed,
            epoch: 0,
        }
    }

    pub fn city_name(&self) -> &str {
        &self.city_name
    }

    pub fn state(&self) -> &DetailState {
        &self.state
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Opens `city_name`; the fetch is issued by `tick` once the settle delay has passed
    pub fn open(&mut self, city_name: impl Into<String>, now: Instant) {
        self.epoch += 1;
        self.city_name = city_name.into();
        self.state = DetailState::Pending {
            due_at: now + SETTLE_DELAY,
        };
        debug!(epoch = self.epoch, city = %self.city_name, "Weather detail opened");
    }

    /// Leaves the screen; anything still in flight becomes stale
    pub fn close(&mut self) {
        self.epoch += 1;
        self.city_name.clear();
        self.state = DetailState::Closed;
    }

    /// Issues the fetch once the settle delay has elapsed
    pub fn tick(&mut self, now: Instant) -> Option<WeatherRequest> {
        match self.state {
            DetailState::Pending { due_at } if now >= due_at => {
                self.state = DetailState::Loading;
                Some(WeatherRequest {
                    epoch: self.epoch,
                    city_name: self.city_name.clone(),
                })
            }
            _ => None,
        }
    }

    /// Applies a fetch outcome; returns `false` for a stale response
    pub fn apply(&mut self, response: WeatherResponse) -> bool {
        if response.epoch != self.epoch {
            debug!(
                stale = response.epoch,
                current = self.epoch,
                "Dropping stale weather response"
            );
            return false;
        }

        self.state = match response.result {
            Ok(weather) => DetailState::Loaded(Box::new(weather)),
            Err(err) => {
                warn!(city = %self.city_name, error = %err, "Weather load failed");
                DetailState::Errored(err.to_string())
            }
        };
        true
    }

    pub fn weather(&self) -> Option<&CityWeather> {
        match &self.state {
            DetailState::Loaded(weather) => Some(weather.as_ref()),
            _ => None,
        }
    }
}
