//! Command-line interface parsing for Citycast
//!
//! This module handles parsing of CLI arguments using clap and turns them into
//! a validated `StartupConfig`. The weather API key may come from `--api-key`
//! or the `OPENWEATHER_API_KEY` environment variable; without it the program
//! refuses to start.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{ApiKey, ConfigError};
use crate::logging::LogLevel;
use crate::route::Route;

/// Citycast - browse world cities and their weather
#[derive(Parser, Debug)]
#[command(name = "citycast")]
#[command(about = "Browse world cities and check their weather")]
#[command(version)]
pub struct Cli {
    /// OpenWeather API key
    #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Open a path directly instead of the city list
    ///
    /// Examples:
    ///   citycast --open /cities
    ///   citycast --open /weather/New%20York
    #[arg(long, value_name = "PATH")]
    pub open: Option<String>,

    /// Log verbosity
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Directory for the log file (defaults to the user cache directory)
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Override the places catalog endpoint
    #[arg(long, value_name = "URL")]
    pub places_url: Option<String>,

    /// Override the weather provider endpoint
    #[arg(long, value_name = "URL")]
    pub weather_url: Option<String>,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub api_key: ApiKey,
    /// Screen to show first
    pub initial_route: Route,
    pub log_level: LogLevel,
    pub log_dir: Option<PathBuf>,
    pub places_url: Option<String>,
    pub weather_url: Option<String>,
}

impl StartupConfig {
    /// Validates parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with a usable API key and route
    /// * `Err(ConfigError::MissingApiKey)` if no non-blank key was supplied
    /// * `Err(ConfigError::InvalidRoute)` if `--open` is not a known path
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let api_key = ApiKey::new(cli.api_key.clone().unwrap_or_default())?;
        let initial_route = match &cli.open {
            Some(path) => Route::parse(path)?,
            None => Route::Cities,
        };

        Ok(StartupConfig {
            api_key,
            initial_route,
            log_level: cli.log_level,
            log_dir: cli.log_dir.clone(),
            places_url: cli.places_url.clone(),
            weather_url: cli.weather_url.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_api_key_flag() {
        let cli = Cli::parse_from(["citycast", "--api-key", "abc"]);
        assert_eq!(cli.api_key.as_deref(), Some("abc"));
        assert!(cli.open.is_none());
        assert_eq!(cli.log_level, LogLevel::Info);
    }

    #[test]
    fn test_cli_parse_log_level() {
        let cli = Cli::parse_from(["citycast", "--api-key", "k", "--log-level", "debug"]);
        assert_eq!(cli.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_cli_rejects_unknown_log_level() {
        let result = Cli::try_parse_from(["citycast", "--log-level", "loud"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_startup_config_defaults_to_city_list() {
        let cli = Cli::parse_from(["citycast", "--api-key", "abc"]);
        let config = StartupConfig::from_cli(&cli).unwrap();

        assert_eq!(config.api_key.expose(), "abc");
        assert_eq!(config.initial_route, Route::Cities);
        assert!(config.places_url.is_none());
        assert!(config.weather_url.is_none());
    }

    #[test]
    fn test_startup_config_blank_key_is_fatal() {
        let cli = Cli::parse_from(["citycast", "--api-key", "   "]);
        let result = StartupConfig::from_cli(&cli);
        assert!(matches!(result, Err(ConfigError::MissingApiKey)));
    }

    #[test]
    fn test_startup_config_open_weather_route() {
        let cli = Cli::parse_from([
            "citycast",
            "--api-key",
            "abc",
            "--open",
            "/weather/New%20York",
        ]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(
            config.initial_route,
            Route::Weather("New York".to_string())
        );
    }

    #[test]
    fn test_startup_config_invalid_route() {
        let cli = Cli::parse_from(["citycast", "--api-key", "abc", "--open", "/nowhere"]);
        let result = StartupConfig::from_cli(&cli);
        assert!(matches!(result, Err(ConfigError::InvalidRoute(_))));
    }

    #[test]
    fn test_startup_config_endpoint_overrides() {
        let cli = Cli::parse_from([
            "citycast",
            "--api-key",
            "abc",
            "--places-url",
            "http://localhost:8001/records",
            "--weather-url",
            "http://localhost:8002",
        ]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(
            config.places_url.as_deref(),
            Some("http://localhost:8001/records")
        );
        assert_eq!(config.weather_url.as_deref(), Some("http://localhost:8002"));
    }
}
