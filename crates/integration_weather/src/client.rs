//! OpenWeatherMap weather client
//!
//! HTTP client for the OpenWeatherMap current weather API.

use std::{fmt, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::models::ApiErrorBody;

/// Weather client errors
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Connection to the weather service failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request to the weather service failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Failed to parse response from weather service
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The API key is missing or was rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The provider could not resolve the location query
    #[error("Location not found: {0}")]
    LocationNotFound(String),

    /// Service is temporarily unavailable
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,
}

/// Weather service configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// API base URL (default: <https://api.openweathermap.org/data/2.5>)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key sent as `appid`
    #[serde(default, skip_serializing)]
    pub api_key: String,

    /// Unit system requested from the provider (default: metric)
    #[serde(default = "default_units")]
    pub units: String,

    /// Request timeout in seconds; the HTTP client default applies when unset
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_units() -> String {
    "metric".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            units: default_units(),
            timeout_secs: None,
        }
    }
}

impl fmt::Debug for WeatherConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("units", &self.units)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl WeatherConfig {
    /// Create a configuration with the given API key and default endpoint
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Override the base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Weather client trait for fetching weather data
#[async_trait]
pub trait WeatherClient: Send + Sync {
    /// Get the current weather document for a free-text location
    ///
    /// The payload is returned as-is; it is only checked to be a JSON object.
    async fn get_current(&self, location: &str) -> Result<Value, WeatherError>;
}

/// OpenWeatherMap HTTP client implementation
#[derive(Debug)]
pub struct OpenWeatherMapClient {
    client: Client,
    config: WeatherConfig,
}

impl OpenWeatherMapClient {
    /// Create a new OpenWeatherMap client with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: WeatherConfig) -> Result<Self, WeatherError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| WeatherError::ConnectionFailed(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Get the configuration
    pub const fn config(&self) -> &WeatherConfig {
        &self.config
    }

    fn current_weather_url(&self) -> String {
        format!("{}/weather", self.config.base_url.trim_end_matches('/'))
    }

    /// Map a non-2xx response to an error, using the provider's message when present
    async fn error_for(
        status: StatusCode,
        response: reqwest::Response,
        location: &str,
    ) -> WeatherError {
        let detail = response
            .json::<ApiErrorBody>()
            .await
            .ok()
            .and_then(|body| body.detail())
            .unwrap_or_else(|| format!("HTTP {status}"));

        match status {
            StatusCode::UNAUTHORIZED => WeatherError::Unauthorized(detail),
            StatusCode::NOT_FOUND => {
                WeatherError::LocationNotFound(format!("{location} ({detail})"))
            },
            StatusCode::TOO_MANY_REQUESTS => WeatherError::RateLimitExceeded,
            s if s.is_server_error() => WeatherError::ServiceUnavailable(detail),
            _ => WeatherError::RequestFailed(format!("HTTP {status}: {detail}")),
        }
    }
}

#[async_trait]
impl WeatherClient for OpenWeatherMapClient {
    #[instrument(skip(self))]
    async fn get_current(&self, location: &str) -> Result<Value, WeatherError> {
        let url = self.current_weather_url();
        debug!(url = %url, units = %self.config.units, "Fetching current weather");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", location),
                ("appid", self.config.api_key.as_str()),
                ("units", self.config.units.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    WeatherError::ConnectionFailed(e.to_string())
                } else {
                    WeatherError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let err = Self::error_for(status, response, location).await;
            warn!(status = %status, error = %err, "Weather request rejected");
            return Err(err);
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| WeatherError::ParseError(e.to_string()))?;

        if !payload.is_object() {
            return Err(WeatherError::ParseError(
                "expected a JSON object".to_string(),
            ));
        }

        debug!(name = ?payload.get("name"), "Current weather received");
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = WeatherConfig::default();
        assert_eq!(config.base_url, "https://api.openweathermap.org/data/2.5");
        assert_eq!(config.units, "metric");
        assert!(config.api_key.is_empty());
        assert!(config.timeout_secs.is_none());
    }

    #[test]
    fn test_config_debug_redacts_key() {
        let config = WeatherConfig::with_api_key("super-secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_config_never_serializes_key() {
        let config = WeatherConfig::with_api_key("super-secret");
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("super-secret"));
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: WeatherConfig = serde_json::from_str(r#"{"api_key":"k"}"#).unwrap();
        assert_eq!(config.api_key, "k");
        assert_eq!(config.units, "metric");
    }

    #[test]
    fn test_current_weather_url() {
        let client = OpenWeatherMapClient::new(
            WeatherConfig::default().with_base_url("http://localhost:9999/data/2.5/"),
        )
        .unwrap();
        assert_eq!(
            client.current_weather_url(),
            "http://localhost:9999/data/2.5/weather"
        );
    }

    #[test]
    fn test_client_with_timeout_builds() {
        let config = WeatherConfig {
            timeout_secs: Some(5),
            ..Default::default()
        };
        let client = OpenWeatherMapClient::new(config).unwrap();
        assert_eq!(client.config().timeout_secs, Some(5));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            WeatherError::RateLimitExceeded.to_string(),
            "Rate limit exceeded"
        );
        assert_eq!(
            WeatherError::LocationNotFound("Atlantis".to_string()).to_string(),
            "Location not found: Atlantis"
        );
    }
}
