//! Adapters implementing application ports

mod smtp_email_adapter;
mod weather_adapter;

pub use smtp_email_adapter::SmtpEmailAdapter;
pub use weather_adapter::WeatherAdapter;
