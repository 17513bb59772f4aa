//! Weather report formatting
//!
//! Turns a provider snapshot into the plain-text report used both as the
//! HTTP response body and as the email body.

use domain::{DomainError, WeatherSnapshot};
use serde_json::Number;

/// Render a snapshot as a five-line report
///
/// Every line, including the last, ends with `\n`. Fails without producing
/// any output if one of the consumed fields is absent.
///
/// ```text
/// Weather Report for Paris, FR:
/// Main: Clear (clear sky)
/// Temperature: 18.2°C (Feels like: 17.5°C)
/// Humidity: 60%
/// Wind Speed: 3.1 m/s
/// ```
pub fn format_weather_report(snapshot: &WeatherSnapshot) -> Result<String, DomainError> {
    let r = snapshot.readings()?;

    Ok(format!(
        "Weather Report for {name}, {country}:\n\
         Main: {condition} ({description})\n\
         Temperature: {temp}°C (Feels like: {feels_like}°C)\n\
         Humidity: {humidity}%\n\
         Wind Speed: {wind} m/s\n",
        name = r.name,
        country = r.country,
        condition = r.condition,
        description = r.description,
        temp = render_number(&r.temperature),
        feels_like = render_number(&r.feels_like),
        humidity = render_number(&r.humidity),
        wind = render_number(&r.wind_speed),
    ))
}

/// Render a JSON number in its shortest natural form
///
/// Integers print as-is, whole floats drop the fraction (`18.0` → `18`),
/// everything else uses the shortest representation that round-trips.
pub fn render_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f == 0.0 => "0".to_string(),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}
