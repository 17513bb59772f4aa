//! User service
//!
//! Create, read and relocate users. History is only ever extended through
//! [`UserService::record_weather`].

use std::{fmt, sync::Arc};

use domain::{DomainError, Location, User, UserId, WeatherEntry};
use tracing::{debug, info, instrument};

use crate::{error::ApplicationError, ports::UserStore};

/// Service for user records
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl fmt::Debug for UserService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserService").finish_non_exhaustive()
    }
}

impl UserService {
    /// Create a new user service
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Register a user with an empty weather history
    ///
    /// Missing or blank `email`/`location` is a validation error.
    #[instrument(skip(self, email))]
    pub async fn create(
        &self,
        email: Option<&str>,
        location: Option<&str>,
    ) -> Result<User, ApplicationError> {
        let user = User::register(email, location)?;
        self.store.insert(&user).await?;

        info!(user_id = %user.id(), "User created");
        Ok(user)
    }

    /// Load a user by id
    #[instrument(skip(self))]
    pub async fn get(&self, id: &UserId) -> Result<User, ApplicationError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", id.to_string()).into())
    }

    /// Replace a user's location, leaving the history untouched
    #[instrument(skip(self))]
    pub async fn update_location(
        &self,
        id: &UserId,
        location: Option<&str>,
    ) -> Result<User, ApplicationError> {
        let location = Location::new(location.unwrap_or_default())?;

        let user = self
            .store
            .update_location(id, &location)
            .await?
            .ok_or_else(|| DomainError::not_found("User", id.to_string()))?;

        info!(user_id = %id, location = %location, "User location updated");
        Ok(user)
    }

    /// Every stored user, oldest first
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<User>, ApplicationError> {
        let users = self.store.list_all().await?;
        debug!(count = users.len(), "Listed users");
        Ok(users)
    }

    /// Append an entry to the user's history, durably, then to the entity
    ///
    /// The in-memory user is only extended once the store has accepted the
    /// write, so it never runs ahead of what is persisted.
    #[instrument(skip(self, user, entry), fields(user_id = %user.id()))]
    pub async fn record_weather(
        &self,
        user: &mut User,
        entry: WeatherEntry,
    ) -> Result<(), ApplicationError> {
        self.store.append_weather(&user.id(), &entry).await?;
        user.append_weather(entry);

        debug!(
            history_len = user.weather_history().len(),
            "Weather entry recorded"
        );
        Ok(())
    }
}
