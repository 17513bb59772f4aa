//! Scheduled job configuration.

use application::{DEFAULT_REPORT_SUBJECT, FailurePolicy};
use serde::{Deserialize, Serialize};

/// Background job configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobsConfig {
    /// Periodic weather report mailing
    #[serde(default)]
    pub weather_reports: WeatherReportJobConfig,
}

/// Weather report job configuration
///
/// Disabled by default; the batch can always be triggered over HTTP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherReportJobConfig {
    /// Register the job with the scheduler
    #[serde(default)]
    pub enabled: bool,

    /// 6-field cron expression (sec min hour day month weekday)
    #[serde(default = "default_cron")]
    pub cron: String,

    /// What a single user's failure does to the rest of the run
    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Subject line of the report email
    #[serde(default = "default_subject")]
    pub subject: String,
}

fn default_cron() -> String {
    "0 0 */3 * * *".to_string()
}

fn default_subject() -> String {
    DEFAULT_REPORT_SUBJECT.to_string()
}

impl Default for WeatherReportJobConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            cron: default_cron(),
            failure_policy: FailurePolicy::default(),
            subject: default_subject(),
        }
    }
}
