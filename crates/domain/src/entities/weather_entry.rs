//! Weather history entry

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::WeatherSnapshot;

/// One fetched snapshot in a user's weather history
///
/// Entries are immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherEntry {
    date: DateTime<Utc>,
    weather: WeatherSnapshot,
}

impl WeatherEntry {
    /// Record a snapshot fetched just now
    #[must_use]
    pub fn new(weather: WeatherSnapshot) -> Self {
        Self {
            date: Utc::now(),
            weather,
        }
    }

    /// Restore an entry from storage
    #[must_use]
    pub const fn restore(date: DateTime<Utc>, weather: WeatherSnapshot) -> Self {
        Self { date, weather }
    }

    /// When the snapshot was fetched
    #[must_use]
    pub const fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// The raw snapshot
    #[must_use]
    pub const fn weather(&self) -> &WeatherSnapshot {
        &self.weather
    }
}
