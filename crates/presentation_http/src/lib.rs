//! Weatherly HTTP presentation layer
//!
//! This crate provides the HTTP API for Weatherly.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::{ApiError, ErrorResponse};
pub use middleware::{ValidatedJson, ValidationError};
pub use routes::{create_app, create_router};
pub use state::AppState;
