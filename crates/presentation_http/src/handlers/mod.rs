//! HTTP request handlers

pub mod health;
pub mod jobs;
pub mod users;
pub mod weather;

use domain::UserId;

use crate::error::ApiError;

/// Parse a user id path segment
pub(crate) fn parse_user_id(raw: &str) -> Result<UserId, ApiError> {
    UserId::parse(raw).map_err(|_| ApiError::BadRequest(format!("Invalid user id: {raw}")))
}
