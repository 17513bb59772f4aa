//! User entity
//!
//! A subscriber: an address to mail reports to, a place to fetch weather
//! for, and the append-only history of every snapshot fetched so far.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    entities::WeatherEntry,
    errors::DomainError,
    value_objects::{EmailAddress, Location, UserId},
};

/// A weather report subscriber
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: UserId,
    email: EmailAddress,
    location: Location,
    weather_history: Vec<WeatherEntry>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with an empty history
    #[must_use]
    pub fn new(email: EmailAddress, location: Location) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            email,
            location,
            weather_history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a user from raw input, validating that both fields are present
    ///
    /// `None`, empty and whitespace-only values are all rejected.
    pub fn register(email: Option<&str>, location: Option<&str>) -> Result<Self, DomainError> {
        let email = EmailAddress::new(email.unwrap_or_default())?;
        let location = Location::new(location.unwrap_or_default())?;
        Ok(Self::new(email, location))
    }

    /// Restore a user from storage
    #[must_use]
    pub const fn restore(
        id: UserId,
        email: EmailAddress,
        location: Location,
        weather_history: Vec<WeatherEntry>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            location,
            weather_history,
            created_at,
            updated_at,
        }
    }

    /// Get the user ID
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Get the email address
    #[must_use]
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Get the location
    #[must_use]
    pub const fn location(&self) -> &Location {
        &self.location
    }

    /// Get the weather history, oldest first
    #[must_use]
    pub fn weather_history(&self) -> &[WeatherEntry] {
        &self.weather_history
    }

    /// Get the creation timestamp
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Get the timestamp of the last profile change
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replace the location; history is left untouched
    pub fn update_location(&mut self, location: Location) {
        self.location = location;
        self.updated_at = Utc::now();
    }

    /// Append a fetched snapshot to the end of the history
    pub fn append_weather(&mut self, entry: WeatherEntry) {
        self.weather_history.push(entry);
    }
}
