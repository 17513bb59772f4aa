//! OpenWeatherMap weather integration
//!
//! Client for the OpenWeatherMap current weather endpoint
//! (<https://openweathermap.org/current>). Locations are passed as free-text
//! `q` queries and results are requested in metric units.

pub mod client;
mod models;

pub use client::{OpenWeatherMapClient, WeatherClient, WeatherConfig, WeatherError};
