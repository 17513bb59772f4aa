//! Application layer - Use cases and orchestration
//!
//! Contains the weather report use cases and the port definitions they
//! depend on. Infrastructure adapters implement the ports; the HTTP server
//! and the scheduler drive the services.

pub mod error;
pub mod ports;
pub mod services;

#[cfg(test)]
mod test_support;

pub use error::ApplicationError;
pub use ports::*;
pub use services::*;
