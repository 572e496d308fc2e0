//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `EVENTAIC_API_URL` - Base URL of the Eventaic backend
//!   (e.g., `https://api.eventaic.com`)
//!
//! ## Optional
//! - `EVENTAIC_REQUEST_TIMEOUT_SECS` - General request timeout (default: 30)
//! - `EVENTAIC_REFRESH_TIMEOUT_SECS` - Token-refresh timeout (default: 10)

use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default timeout applied to every API request.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default timeout for the dedicated token-refresh call. Shorter than the
/// general timeout so a dead auth service fails the original call quickly.
const DEFAULT_REFRESH_TIMEOUT_SECS: u64 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Invalid base URL {0}: {1}")]
    InvalidBaseUrl(String, String),
}

/// Eventaic client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend, without the `/api/v1` prefix.
    pub base_url: Url,
    /// Timeout applied to every API request unless overridden per call.
    pub request_timeout: Duration,
    /// Timeout for the dedicated token-refresh call.
    pub refresh_timeout: Duration,
}

impl ClientConfig {
    /// Create a configuration for the given backend base URL with default
    /// timeouts.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidBaseUrl` if the URL does not parse.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ConfigError::InvalidBaseUrl(base_url.to_string(), e.to_string()))?;

        Ok(Self {
            base_url,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            refresh_timeout: Duration::from_secs(DEFAULT_REFRESH_TIMEOUT_SECS),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `EVENTAIC_API_URL` is missing or invalid, or
    /// if a timeout override is not a number.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let mut config = Self::new(&get_required_env("EVENTAIC_API_URL")?)?;
        config.request_timeout = Duration::from_secs(get_secs_or_default(
            "EVENTAIC_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?);
        config.refresh_timeout = Duration::from_secs(get_secs_or_default(
            "EVENTAIC_REFRESH_TIMEOUT_SECS",
            DEFAULT_REFRESH_TIMEOUT_SECS,
        )?);

        Ok(config)
    }

    /// Absolute URL for a backend-relative path (e.g., `/api/v1/auth/login`).
    #[must_use]
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!(
            "{}{path}",
            self.base_url.as_str().trim_end_matches('/')
        )
    }
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Parse an optional seconds-valued environment variable.
fn get_secs_or_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let config = ClientConfig::new("http://localhost:8000/").expect("valid url");
        assert_eq!(
            config.endpoint("/api/v1/auth/login"),
            "http://localhost:8000/api/v1/auth/login"
        );
    }

    #[test]
    fn test_endpoint_preserves_path_prefix() {
        let config = ClientConfig::new("https://eventaic.example.com/backend").expect("valid url");
        assert_eq!(
            config.endpoint("/api/v1/ads/"),
            "https://eventaic.example.com/backend/api/v1/ads/"
        );
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let result = ClientConfig::new("not a url");
        assert!(matches!(result, Err(ConfigError::InvalidBaseUrl(_, _))));
    }

    #[test]
    fn test_default_timeouts() {
        let config = ClientConfig::new("http://localhost:8000").expect("valid url");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.refresh_timeout, Duration::from_secs(10));
    }
}
