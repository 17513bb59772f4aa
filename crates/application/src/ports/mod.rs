//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod email_port;
mod user_store;
mod weather_port;

#[cfg(test)]
pub use email_port::MockEmailPort;
pub use email_port::{EmailDraft, EmailError, EmailPort};
#[cfg(test)]
pub use user_store::MockUserStore;
pub use user_store::UserStore;
#[cfg(test)]
pub use weather_port::MockWeatherPort;
pub use weather_port::WeatherPort;
