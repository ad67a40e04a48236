//! Navigable paths
//!
//! The list screen lives at `/cities`; a city's weather lives at
//! `/weather/<url-encoded name>`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("unknown path '{0}' (expected /cities or /weather/<city>)")]
    UnknownPath(String),

    #[error("missing city name in '{0}'")]
    MissingCity(String),

    #[error("city name in '{0}' is not valid UTF-8 once decoded")]
    InvalidEncoding(String),
}

/// A screen the application can navigate to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Cities,
    Weather(String),
}

impl Route {
    pub fn to_path(&self) -> String {
        match self {
            Route::Cities => "/cities".to_string(),
            Route::Weather(city) => format!("/weather/{}", urlencoding::encode(city)),
        }
    }

    pub fn parse(path: &str) -> Result<Self, RouteError> {
        let trimmed = path.trim().trim_end_matches('/');
        match trimmed {
            "" | "/cities" => return Ok(Route::Cities),
            _ => {}
        }

        let Some(encoded) = trimmed.strip_prefix("/weather") else {
            return Err(RouteError::UnknownPath(path.to_string()));
        };
        let encoded = match encoded.strip_prefix('/') {
            Some(rest) => rest,
            None if encoded.is_empty() => return Err(RouteError::MissingCity(path.to_string())),
            None => return Err(RouteError::UnknownPath(path.to_string())),
        };
        if encoded.is_empty() {
            return Err(RouteError::MissingCity(path.to_string()));
        }

        let city = urlencoding::decode(encoded)
            .map_err(|_| RouteError::InvalidEncoding(path.to_string()))?;
        Ok(Route::Weather(city.into_owned()))
    }
}
