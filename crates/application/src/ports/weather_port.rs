//! Weather service port
//!
//! Defines the interface for current-weather retrieval.

use async_trait::async_trait;
use domain::{Location, WeatherSnapshot};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for fetching current weather
///
/// Each call hits the provider; nothing is cached or retried.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WeatherPort: Send + Sync {
    /// Fetch the current conditions for a free-text location
    async fn fetch_current(&self, location: &Location) -> Result<WeatherSnapshot, ApplicationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trait_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn WeatherPort>();
    }
}
