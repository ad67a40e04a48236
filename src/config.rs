//! Startup configuration
//!
//! The weather provider credential is validated once, before the terminal is
//! touched, and then handed to the client that needs it.

use std::fmt;

use thiserror::Error;

use crate::route::RouteError;

/// Environment variable holding the weather provider credential
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Fatal startup errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing OpenWeather API key: pass --api-key or set OPENWEATHER_API_KEY")]
    MissingApiKey,

    #[error("Invalid --open path: {0}")]
    InvalidRoute(#[from] RouteError),
}

/// Validated weather provider credential
///
/// The `Debug` impl never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Validates a raw credential; blank input is rejected.
    pub fn new(raw: impl Into<String>) -> Result<Self, ConfigError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_trims_whitespace() {
        let key = ApiKey::new("  abc123 \n").unwrap();
        assert_eq!(key.expose(), "abc123");
    }

    #[test]
    fn test_api_key_rejects_blank() {
        assert!(matches!(ApiKey::new(""), Err(ConfigError::MissingApiKey)));
        assert!(matches!(ApiKey::new("   "), Err(ConfigError::MissingApiKey)));
    }

    #[test]
    fn test_api_key_debug_hides_secret() {
        let key = ApiKey::new("super-secret").unwrap();
        let debug = format!("{:?}", key);
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn test_missing_key_message_names_env_var() {
        let msg = ConfigError::MissingApiKey.to_string();
        assert!(msg.contains("API key"));
        assert!(msg.contains(API_KEY_ENV));
    }
}
