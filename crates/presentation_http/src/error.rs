//! API error handling
//!
//! Maps application errors to status codes and the `{error, code}` JSON
//! envelope. When internal details are hidden, server-side failures carry a
//! generic message and the cause is only logged.

use application::ApplicationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use domain::DomainError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

const GENERIC_INTERNAL_MESSAGE: &str = "An error occurred processing your request";

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Malformed weather snapshot: {0}")]
    MalformedSnapshot(String),

    #[error("Delivery error: {0}")]
    Delivery(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
}

impl ApiError {
    /// Translate an application error
    ///
    /// With `expose_details` off, the message of every 5xx error is replaced
    /// by a generic one.
    pub fn from_application(err: ApplicationError, expose_details: bool) -> Self {
        let api = match err {
            ApplicationError::Domain(DomainError::ValidationError(msg)) => {
                return Self::Validation(msg);
            },
            ApplicationError::Domain(e @ DomainError::NotFound { .. }) => {
                return Self::NotFound(e.to_string());
            },
            ApplicationError::Domain(DomainError::MalformedSnapshot(msg)) => {
                Self::MalformedSnapshot(msg)
            },
            ApplicationError::Upstream(msg) => Self::Upstream(msg),
            ApplicationError::Delivery(msg) => Self::Delivery(msg),
            ApplicationError::Configuration(msg) | ApplicationError::Internal(msg) => {
                Self::Internal(msg)
            },
        };

        error!(error = %api, "Request failed");
        if expose_details {
            api
        } else {
            api.redacted()
        }
    }

    /// Replace a server-side message with the generic one
    fn redacted(self) -> Self {
        let generic = GENERIC_INTERNAL_MESSAGE.to_string();
        match self {
            Self::Upstream(_) => Self::Upstream(generic),
            Self::MalformedSnapshot(_) => Self::MalformedSnapshot(generic),
            Self::Delivery(_) => Self::Delivery(generic),
            Self::Internal(_) => Self::Internal(generic),
            client_error => client_error,
        }
    }

    /// HTTP status code for this error
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream(_)
            | Self::MalformedSnapshot(_)
            | Self::Delivery(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::BadRequest(_) => "bad_request",
            Self::NotFound(_) => "not_found",
            Self::Upstream(_) => "upstream_error",
            Self::MalformedSnapshot(_) => "malformed_snapshot",
            Self::Delivery(_) => "delivery_error",
            Self::Internal(_) => "internal_error",
        }
    }

    fn message(self) -> String {
        match self {
            Self::Validation(msg)
            | Self::BadRequest(msg)
            | Self::NotFound(msg)
            | Self::Upstream(msg)
            | Self::MalformedSnapshot(msg)
            | Self::Delivery(msg)
            | Self::Internal(msg) => msg,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            code: self.code().to_string(),
            error: self.message(),
        };
        (status, Json(body)).into_response()
    }
}
