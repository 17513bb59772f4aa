//! Weather snapshot value object
//!
//! The provider payload is kept as an opaque JSON document. Only the fields a
//! report needs are looked up, on demand, through [`WeatherSnapshot::readings`].

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::errors::DomainError;

/// A raw current-weather document as returned by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct WeatherSnapshot(Value);

/// The subset of a snapshot used to build a report
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReadings {
    /// Resolved place name
    pub name: String,
    /// ISO country code
    pub country: String,
    /// Primary condition label, e.g. "Clear"
    pub condition: String,
    /// Condition description, e.g. "clear sky"
    pub description: String,
    /// Current temperature
    pub temperature: Number,
    /// Perceived temperature
    pub feels_like: Number,
    /// Relative humidity in percent
    pub humidity: Number,
    /// Wind speed
    pub wind_speed: Number,
}

impl WeatherSnapshot {
    /// Wrap a provider payload; anything but a JSON object is rejected
    pub fn from_value(value: Value) -> Result<Self, DomainError> {
        if value.is_object() {
            Ok(Self(value))
        } else {
            Err(DomainError::MalformedSnapshot(
                "payload is not a JSON object".to_string(),
            ))
        }
    }

    /// Borrow the raw document
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    /// Take the raw document
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Extract the fields a report is built from
    ///
    /// Fails on the first absent or mistyped field; nothing is defaulted.
    pub fn readings(&self) -> Result<WeatherReadings, DomainError> {
        Ok(WeatherReadings {
            name: self.text("/name")?,
            country: self.text("/sys/country")?,
            condition: self.text("/weather/0/main")?,
            description: self.text("/weather/0/description")?,
            temperature: self.number("/main/temp")?,
            feels_like: self.number("/main/feels_like")?,
            humidity: self.number("/main/humidity")?,
            wind_speed: self.number("/wind/speed")?,
        })
    }

    fn text(&self, pointer: &str) -> Result<String, DomainError> {
        self.0
            .pointer(pointer)
            .and_then(Value::as_str)
            .map(ToString::to_string)
            .ok_or_else(|| Self::missing(pointer, "string"))
    }

    fn number(&self, pointer: &str) -> Result<Number, DomainError> {
        match self.0.pointer(pointer) {
            Some(Value::Number(n)) => Ok(n.clone()),
            _ => Err(Self::missing(pointer, "number")),
        }
    }

    fn missing(pointer: &str, kind: &str) -> DomainError {
        let field = pointer.trim_start_matches('/').replace('/', ".");
        DomainError::MalformedSnapshot(format!("expected {kind} at `{field}`"))
    }
}

impl TryFrom<Value> for WeatherSnapshot {
    type Error = DomainError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<WeatherSnapshot> for Value {
    fn from(snapshot: WeatherSnapshot) -> Self {
        snapshot.0
    }
}
