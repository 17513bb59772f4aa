//! In-memory port fakes shared by the service tests

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use domain::{DomainError, Location, User, UserId, WeatherEntry, WeatherSnapshot};
use parking_lot::Mutex;
use serde_json::json;

use crate::{
    error::ApplicationError,
    ports::{EmailDraft, EmailError, EmailPort, UserStore, WeatherPort},
};

/// Build a provider payload in the OpenWeatherMap shape
pub fn snapshot_for(name: &str) -> WeatherSnapshot {
    WeatherSnapshot::from_value(json!({
        "name": name,
        "sys": {"country": "FR"},
        "weather": [{"main": "Clear", "description": "clear sky"}],
        "main": {"temp": 18.2, "feels_like": 17.5, "humidity": 60},
        "wind": {"speed": 3.1}
    }))
    .unwrap()
}

#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: Mutex<Vec<User>>,
    failing_appends: Mutex<HashSet<UserId>>,
    pub append_calls: Mutex<Vec<UserId>>,
}

impl InMemoryUserStore {
    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users: Mutex::new(users),
            ..Default::default()
        }
    }

    pub fn fail_append_for(&self, id: UserId) {
        self.failing_appends.lock().insert(id);
    }

    pub fn snapshot(&self, id: &UserId) -> Option<User> {
        self.users.lock().iter().find(|u| u.id() == *id).cloned()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: &User) -> Result<(), ApplicationError> {
        self.users.lock().push(user.clone());
        Ok(())
    }

    async fn get(&self, id: &UserId) -> Result<Option<User>, ApplicationError> {
        Ok(self.snapshot(id))
    }

    async fn update_location(
        &self,
        id: &UserId,
        location: &Location,
    ) -> Result<Option<User>, ApplicationError> {
        let mut users = self.users.lock();
        Ok(users.iter_mut().find(|u| u.id() == *id).map(|user| {
            user.update_location(location.clone());
            user.clone()
        }))
    }

    async fn list_all(&self) -> Result<Vec<User>, ApplicationError> {
        Ok(self.users.lock().clone())
    }

    async fn append_weather(
        &self,
        id: &UserId,
        entry: &WeatherEntry,
    ) -> Result<(), ApplicationError> {
        self.append_calls.lock().push(*id);
        if self.failing_appends.lock().contains(id) {
            return Err(ApplicationError::Internal("disk full".to_string()));
        }
        let mut users = self.users.lock();
        let user = users
            .iter_mut()
            .find(|u| u.id() == *id)
            .ok_or_else(|| DomainError::not_found("User", id.to_string()))?;
        user.append_weather(entry.clone());
        Ok(())
    }
}

/// Weather port that answers per location and records every call
#[derive(Debug, Default)]
pub struct ScriptedWeatherPort {
    failing: HashSet<String>,
    overrides: HashMap<String, WeatherSnapshot>,
    pub calls: Mutex<Vec<String>>,
}

impl ScriptedWeatherPort {
    pub fn failing_for(locations: &[&str]) -> Self {
        Self {
            failing: locations.iter().map(ToString::to_string).collect(),
            ..Default::default()
        }
    }

    pub fn with_override(mut self, location: &str, snapshot: WeatherSnapshot) -> Self {
        self.overrides.insert(location.to_string(), snapshot);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl WeatherPort for ScriptedWeatherPort {
    async fn fetch_current(&self, location: &Location) -> Result<WeatherSnapshot, ApplicationError> {
        let key = location.as_str().to_string();
        self.calls.lock().push(key.clone());
        if self.failing.contains(&key) {
            return Err(ApplicationError::Upstream(format!("HTTP 404 for {key}")));
        }
        Ok(self
            .overrides
            .get(&key)
            .cloned()
            .unwrap_or_else(|| snapshot_for(&key)))
    }
}

/// Email port that records drafts and can refuse chosen recipients
#[derive(Debug, Default)]
pub struct RecordingEmailPort {
    refused: HashSet<String>,
    pub sent: Mutex<Vec<EmailDraft>>,
}

impl RecordingEmailPort {
    pub fn refusing(recipients: &[&str]) -> Self {
        Self {
            refused: recipients.iter().map(ToString::to_string).collect(),
            ..Default::default()
        }
    }

    pub fn sent_to(&self) -> Vec<String> {
        self.sent.lock().iter().map(|d| d.to.clone()).collect()
    }
}

#[async_trait]
impl EmailPort for RecordingEmailPort {
    async fn send_email(&self, draft: &EmailDraft) -> Result<String, EmailError> {
        if self.refused.contains(&draft.to) {
            return Err(EmailError::InvalidAddress(draft.to.clone()));
        }
        let mut sent = self.sent.lock();
        sent.push(draft.clone());
        Ok(format!("<msg-{}@test>", sent.len()))
    }

    async fn is_available(&self) -> bool {
        true
    }
}
