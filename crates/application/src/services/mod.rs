//! Application services
//!
//! Services orchestrate domain logic and port interactions.

mod batch_service;
mod notification_service;
mod report_formatter;
mod user_service;
mod weather_report_service;

pub use batch_service::{
    BatchOutcome, DEFAULT_REPORT_SUBJECT, FailurePolicy, UserFailure, WeatherBatchService,
};
pub use notification_service::NotificationService;
pub use report_formatter::{format_weather_report, render_number};
pub use user_service::UserService;
pub use weather_report_service::WeatherReportService;
