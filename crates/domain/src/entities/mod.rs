//! Domain entities

mod user;
mod weather_entry;

pub use user::User;
pub use weather_entry::WeatherEntry;
