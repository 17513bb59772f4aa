//! Application-level errors

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error (validation, not found, malformed snapshot)
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Weather provider unreachable, non-2xx, or returned garbage
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Mail relay rejected or failed to accept a message
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error (storage faults and the like)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Check whether this is a missing entity
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Domain(DomainError::NotFound { .. }))
    }

    /// Check whether this is a caller input problem
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Domain(DomainError::ValidationError(_)))
    }
}
