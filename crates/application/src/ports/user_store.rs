//! User store port
//!
//! Durable storage for users and their weather history.

use async_trait::async_trait;
use domain::{Location, User, UserId, WeatherEntry};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for user persistence
///
/// Every method completes its write before returning; there is no
/// buffering between the caller and durable storage.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a newly created user
    async fn insert(&self, user: &User) -> Result<(), ApplicationError>;

    /// Load a user with its full history
    async fn get(&self, id: &UserId) -> Result<Option<User>, ApplicationError>;

    /// Overwrite a user's location
    ///
    /// Returns the updated user, or `None` if the id is unknown.
    async fn update_location(
        &self,
        id: &UserId,
        location: &Location,
    ) -> Result<Option<User>, ApplicationError>;

    /// Load every user, oldest first
    async fn list_all(&self) -> Result<Vec<User>, ApplicationError>;

    /// Append one entry to the end of a user's history
    ///
    /// Fails with a not-found error when the user no longer exists.
    async fn append_weather(
        &self,
        id: &UserId,
        entry: &WeatherEntry,
    ) -> Result<(), ApplicationError>;
}
