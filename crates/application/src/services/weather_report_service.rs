//! Weather report service
//!
//! The fetch → append → format pipeline shared by the interactive endpoint
//! and the batch job.

use std::{fmt, sync::Arc};

use domain::{User, UserId, WeatherEntry};
use tracing::{debug, instrument};

use crate::{
    error::ApplicationError,
    ports::WeatherPort,
    services::{UserService, report_formatter::format_weather_report},
};

/// Service producing weather reports for users
pub struct WeatherReportService {
    users: Arc<UserService>,
    weather: Arc<dyn WeatherPort>,
}

impl fmt::Debug for WeatherReportService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherReportService")
            .field("users", &self.users)
            .finish_non_exhaustive()
    }
}

impl WeatherReportService {
    /// Create a new weather report service
    pub fn new(users: Arc<UserService>, weather: Arc<dyn WeatherPort>) -> Self {
        Self { users, weather }
    }

    /// Fetch, record and format current weather for a user id
    ///
    /// The user is loaded first; an unknown id fails before the provider is
    /// contacted.
    #[instrument(skip(self))]
    pub async fn report_for(&self, id: &UserId) -> Result<String, ApplicationError> {
        let mut user = self.users.get(id).await?;
        self.refresh(&mut user).await
    }

    /// Fetch current weather for the user's location, append it to the
    /// history and return the formatted report
    ///
    /// The entry is persisted before formatting, so a snapshot the formatter
    /// rejects is still kept in the history.
    #[instrument(skip(self, user), fields(user_id = %user.id(), location = %user.location()))]
    pub async fn refresh(&self, user: &mut User) -> Result<String, ApplicationError> {
        let snapshot = self.weather.fetch_current(user.location()).await?;
        let entry = WeatherEntry::new(snapshot);
        let report = format_weather_report(entry.weather());

        self.users.record_weather(user, entry).await?;

        let report = report?;
        debug!(bytes = report.len(), "Weather report ready");
        Ok(report)
    }
}
