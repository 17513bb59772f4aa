//! Application configuration
//!
//! Split into focused sub-modules by domain:
//! - `server`: HTTP server settings
//! - `database`: SQLite database settings
//! - `integrations`: OpenWeatherMap and SMTP relay
//! - `jobs`: Scheduled weather report job
//!
//! Values are layered: serde defaults, then an optional TOML file, then
//! `WEATHERLY_*` environment variables (nested keys joined with `__`).

mod database;
mod integrations;
mod jobs;
mod server;

use std::{fmt, path::Path};

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use database::DatabaseConfig;
pub use integrations::{SmtpAppConfig, WeatherAppConfig};
pub use jobs::{JobsConfig, WeatherReportJobConfig};
pub use server::ServerConfig;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "WEATHERLY";

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_VAR: &str = "WEATHERLY_CONFIG";

/// Shared default for boolean `true` fields across config structs
pub(crate) const fn default_true() -> bool {
    true
}

/// Application environment (development or production)
///
/// Production hides internal error details from API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment - verbose errors, permissive CORS
    #[default]
    Development,
    /// Production environment
    Production,
}

impl Environment {
    /// Whether this is the production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(format!(
                "Invalid environment: {s}. Use 'development' or 'production'"
            )),
        }
    }
}

/// A problem found by [`AppConfig::validate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    /// Dotted config key the issue refers to
    pub key: &'static str,
    /// Human-readable description
    pub message: String,
    /// Whether startup must be refused
    pub fatal: bool,
}

impl ConfigIssue {
    fn error(key: &'static str, message: impl Into<String>) -> Self {
        Self {
            key,
            message: message.into(),
            fatal: true,
        }
    }

    fn warning(key: &'static str, message: impl Into<String>) -> Self {
        Self {
            key,
            message: message.into(),
            fatal: false,
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.message)
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development or production)
    #[serde(default)]
    pub environment: Environment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// OpenWeatherMap configuration
    #[serde(default)]
    pub weather: WeatherAppConfig,

    /// SMTP relay configuration
    #[serde(default)]
    pub smtp: SmtpAppConfig,

    /// Background jobs
    #[serde(default)]
    pub jobs: JobsConfig,
}

impl AppConfig {
    /// Load configuration from the environment and an optional file
    ///
    /// The file is `$WEATHERLY_CONFIG` when set, otherwise `config.toml` in
    /// the working directory. A missing file is not an error.
    pub fn load() -> Result<Self, config::ConfigError> {
        let source = std::env::var(CONFIG_PATH_VAR).map_or_else(
            |_| config::File::with_name("config").required(false),
            |path| config::File::with_name(&path).required(true),
        );
        Self::build(source)
    }

    /// Load configuration from an explicit file plus the environment
    pub fn load_from(path: &Path) -> Result<Self, config::ConfigError> {
        Self::build(config::File::from(path).required(true))
    }

    fn build(
        file: config::File<config::FileSourceFile, config::FileFormat>,
    ) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(file)
            // Override with environment variables (e.g., WEATHERLY_SERVER__PORT)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.cors_allowed_origins"),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        debug!(environment = %config.environment, "Configuration loaded");
        Ok(config)
    }

    /// Check the configuration for problems
    ///
    /// Fatal issues must prevent startup; warnings are only logged.
    #[must_use]
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.server.port == 0 {
            issues.push(ConfigIssue::error("server.port", "port must be non-zero"));
        }

        if !matches!(self.server.log_format.as_str(), "text" | "json") {
            issues.push(ConfigIssue::warning(
                "server.log_format",
                format!(
                    "unknown log format '{}', falling back to text",
                    self.server.log_format
                ),
            ));
        }

        if self.database.max_connections == 0 {
            issues.push(ConfigIssue::error(
                "database.max_connections",
                "at least one connection is required",
            ));
        }

        if self.weather.units != "metric" {
            issues.push(ConfigIssue::error(
                "weather.units",
                format!(
                    "unsupported units '{}'; reports are rendered in °C and m/s, use 'metric'",
                    self.weather.units
                ),
            ));
        }

        if !self.weather.has_api_key() {
            issues.push(ConfigIssue::warning(
                "weather.api_key",
                "no OpenWeatherMap API key configured; weather requests will be rejected",
            ));
        }

        let job = &self.jobs.weather_reports;
        if let Err(e) = job.cron.parse::<cron::Schedule>() {
            let message = format!("invalid cron expression '{}': {e}", job.cron);
            issues.push(if job.enabled {
                ConfigIssue::error("jobs.weather_reports.cron", message)
            } else {
                ConfigIssue::warning("jobs.weather_reports.cron", message)
            });
        }

        if job.enabled && self.smtp.sender().is_empty() {
            issues.push(ConfigIssue::warning(
                "smtp.from",
                "scheduled reports are enabled but no sender address is configured",
            ));
        }

        issues
    }
}
