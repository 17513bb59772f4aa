//! Location value object
//!
//! A free-text place name ("Paris", "Berlin,DE") handed verbatim to the
//! weather provider as its query term.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// A non-blank location query
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Location(String);

impl Location {
    /// Create a location, rejecting blank input
    ///
    /// The text is stored exactly as given; surrounding whitespace is not
    /// stripped because the provider receives the value verbatim.
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::missing_field("location"));
        }
        Ok(Self(value))
    }

    /// Get the location as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Location {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Location> for String {
    fn from(location: Location) -> Self {
        location.0
    }
}

impl AsRef<str> for Location {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
