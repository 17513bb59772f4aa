//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer.
//! Contains the SQLite user store, the OpenWeatherMap and SMTP adapters,
//! configuration loading, the cron scheduler and tracing setup.

pub mod adapters;
pub mod config;
pub mod persistence;
pub mod scheduled_tasks;
pub mod scheduler;
pub mod telemetry;

pub use adapters::{SmtpEmailAdapter, WeatherAdapter};
pub use config::{
    AppConfig, ConfigIssue, DatabaseConfig, Environment, JobsConfig, ServerConfig,
    SmtpAppConfig, WeatherAppConfig, WeatherReportJobConfig,
};
pub use persistence::{AsyncDatabase, AsyncDatabaseConfig, AsyncDatabaseError, SqliteUserStore};
pub use scheduled_tasks::{WEATHER_REPORTS_TASK, create_weather_report_task};
pub use scheduler::{SchedulerConfig, SchedulerError, TaskScheduler, TaskStats, TaskStatus};
pub use telemetry::{DEFAULT_LOG_FILTER, LogFormat, TelemetryError, init_tracing};
