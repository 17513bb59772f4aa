//! Weather adapter - Implements WeatherPort using integration_weather

use std::sync::Arc;

use application::{ApplicationError, ports::WeatherPort};
use async_trait::async_trait;
use domain::{Location, WeatherSnapshot};
use integration_weather::{OpenWeatherMapClient, WeatherClient, WeatherConfig, WeatherError};
use tracing::{debug, instrument};

/// Adapter for current weather using the OpenWeatherMap API
pub struct WeatherAdapter {
    client: Arc<dyn WeatherClient>,
}

impl std::fmt::Debug for WeatherAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherAdapter").finish_non_exhaustive()
    }
}

impl WeatherAdapter {
    /// Create an adapter backed by an OpenWeatherMap client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to initialize.
    pub fn with_config(config: WeatherConfig) -> Result<Self, ApplicationError> {
        let client = OpenWeatherMapClient::new(config)
            .map_err(|e| ApplicationError::Configuration(e.to_string()))?;
        Ok(Self::new(Arc::new(client)))
    }

    /// Create an adapter over any weather client
    pub fn new(client: Arc<dyn WeatherClient>) -> Self {
        Self { client }
    }

    /// Map integration weather error to application error
    fn map_error(err: WeatherError) -> ApplicationError {
        ApplicationError::Upstream(err.to_string())
    }
}

#[async_trait]
impl WeatherPort for WeatherAdapter {
    #[instrument(skip(self), fields(location = %location))]
    async fn fetch_current(&self, location: &Location) -> Result<WeatherSnapshot, ApplicationError> {
        let payload = self
            .client
            .get_current(location.as_str())
            .await
            .map_err(Self::map_error)?;

        let snapshot = WeatherSnapshot::from_value(payload)
            .map_err(|e| ApplicationError::Upstream(e.to_string()))?;

        debug!("Current weather fetched");
        Ok(snapshot)
    }
}
