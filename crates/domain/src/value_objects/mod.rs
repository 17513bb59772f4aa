//! Value Objects - Immutable, identity-less domain primitives

mod email_address;
mod location;
mod user_id;
mod weather_snapshot;

pub use email_address::EmailAddress;
pub use location::Location;
pub use user_id::UserId;
pub use weather_snapshot::{WeatherReadings, WeatherSnapshot};
