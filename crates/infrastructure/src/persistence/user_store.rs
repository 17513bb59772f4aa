//! SQLite user store implementation
//!
//! Implements the `UserStore` port using sqlx. Users live in `users`; each
//! fetched snapshot is one row in `weather_entries`, ordered by `seq`.

use std::collections::HashMap;

use application::{ApplicationError, ports::UserStore};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use domain::{
    DomainError, EmailAddress, Location, User, UserId, WeatherEntry, WeatherSnapshot,
};
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::error::{corrupt_row, map_sqlx_error};

/// Async user store using sqlx
#[derive(Debug, Clone)]
pub struct SqliteUserStore {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    email: String,
    location: String,
    created_at: String,
    updated_at: String,
}

#[derive(sqlx::FromRow)]
struct EntryRow {
    user_id: String,
    recorded_at: String,
    payload: String,
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, ApplicationError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| corrupt_row("timestamp", e))
}

impl EntryRow {
    fn into_entry(self) -> Result<WeatherEntry, ApplicationError> {
        let payload: serde_json::Value =
            serde_json::from_str(&self.payload).map_err(|e| corrupt_row("weather payload", e))?;
        let weather =
            WeatherSnapshot::from_value(payload).map_err(|e| corrupt_row("weather payload", e))?;
        Ok(WeatherEntry::restore(
            parse_timestamp(&self.recorded_at)?,
            weather,
        ))
    }
}

impl UserRow {
    fn into_user(self, history: Vec<WeatherEntry>) -> Result<User, ApplicationError> {
        let id = UserId::parse(&self.id).map_err(|e| corrupt_row("user id", e))?;
        let email = EmailAddress::new(self.email).map_err(|e| corrupt_row("email", e))?;
        let location = Location::new(self.location).map_err(|e| corrupt_row("location", e))?;

        Ok(User::restore(
            id,
            email,
            location,
            history,
            parse_timestamp(&self.created_at)?,
            parse_timestamp(&self.updated_at)?,
        ))
    }
}

impl SqliteUserStore {
    /// Create a new user store on the given pool
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn load_history(&self, id: &str) -> Result<Vec<WeatherEntry>, ApplicationError> {
        let rows: Vec<EntryRow> = sqlx::query_as(
            r"
            SELECT user_id, recorded_at, payload
            FROM weather_entries WHERE user_id = $1
            ORDER BY seq ASC
            ",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(EntryRow::into_entry).collect()
    }

    async fn fetch_user(&self, id: &str) -> Result<Option<User>, ApplicationError> {
        let row: Option<UserRow> = sqlx::query_as(
            r"
            SELECT id, email, location, created_at, updated_at
            FROM users WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let history = self.load_history(id).await?;
        row.into_user(history).map(Some)
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    #[instrument(skip(self, user), fields(user_id = %user.id()))]
    async fn insert(&self, user: &User) -> Result<(), ApplicationError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        let id = user.id().to_string();

        sqlx::query(
            r"
            INSERT INTO users (id, email, location, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(&id)
        .bind(user.email().as_str())
        .bind(user.location().as_str())
        .bind(format_timestamp(user.created_at()))
        .bind(format_timestamp(user.updated_at()))
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        for entry in user.weather_history() {
            sqlx::query(
                r"
                INSERT INTO weather_entries (user_id, recorded_at, payload)
                VALUES ($1, $2, $3)
                ",
            )
            .bind(&id)
            .bind(format_timestamp(entry.date()))
            .bind(entry.weather().as_value().to_string())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        debug!("User inserted");
        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %id))]
    async fn get(&self, id: &UserId) -> Result<Option<User>, ApplicationError> {
        let user = self.fetch_user(&id.to_string()).await?;
        debug!(found = user.is_some(), "Retrieved user");
        Ok(user)
    }

    #[instrument(skip(self), fields(user_id = %id))]
    async fn update_location(
        &self,
        id: &UserId,
        location: &Location,
    ) -> Result<Option<User>, ApplicationError> {
        let id = id.to_string();

        let result = sqlx::query("UPDATE users SET location = $1, updated_at = $2 WHERE id = $3")
            .bind(location.as_str())
            .bind(format_timestamp(Utc::now()))
            .bind(&id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            debug!("User not found for location update");
            return Ok(None);
        }

        self.fetch_user(&id).await
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> Result<Vec<User>, ApplicationError> {
        let rows: Vec<UserRow> = sqlx::query_as(
            r"
            SELECT id, email, location, created_at, updated_at
            FROM users ORDER BY created_at ASC, id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let entries: Vec<EntryRow> = sqlx::query_as(
            "SELECT user_id, recorded_at, payload FROM weather_entries ORDER BY seq ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let mut histories: HashMap<String, Vec<WeatherEntry>> = HashMap::new();
        for row in entries {
            let user_id = row.user_id.clone();
            histories.entry(user_id).or_default().push(row.into_entry()?);
        }

        let users = rows
            .into_iter()
            .map(|row| {
                let history = histories.remove(&row.id).unwrap_or_default();
                row.into_user(history)
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = users.len(), "Listed users");
        Ok(users)
    }

    #[instrument(skip(self, entry), fields(user_id = %id))]
    async fn append_weather(
        &self,
        id: &UserId,
        entry: &WeatherEntry,
    ) -> Result<(), ApplicationError> {
        let user_id = id.to_string();

        let result = sqlx::query(
            r"
            INSERT INTO weather_entries (user_id, recorded_at, payload)
            SELECT $1, $2, $3
            WHERE EXISTS (SELECT 1 FROM users WHERE id = $1)
            ",
        )
        .bind(&user_id)
        .bind(format_timestamp(entry.date()))
        .bind(entry.weather().as_value().to_string())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("User", user_id).into());
        }

        debug!("Weather entry appended");
        Ok(())
    }
}
