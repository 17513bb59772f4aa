//! Application state shared across handlers

use std::{fmt, sync::Arc};

use application::{
    ApplicationError, NotificationService, UserService, WeatherBatchService,
    WeatherReportService,
    ports::{EmailPort, UserStore, WeatherPort},
};
use infrastructure::{AsyncDatabase, WeatherReportJobConfig};

use crate::error::ApiError;

/// Shared application state
///
/// Every service is built once from the three ports and shared by the
/// HTTP handlers and the scheduled job.
#[derive(Clone)]
pub struct AppState {
    /// User registration and lookup
    pub users: Arc<UserService>,
    /// Fetch, record and format for a single user
    pub reports: Arc<WeatherReportService>,
    /// Report run over every user
    pub batch: Arc<WeatherBatchService>,
    /// Outgoing mail
    pub notifications: Arc<NotificationService>,
    /// Database pool, probed by the readiness check
    pub database: Option<AsyncDatabase>,
    /// Include internal error details in responses
    pub expose_internal_errors: bool,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("batch", &self.batch)
            .field("has_database", &self.database.is_some())
            .field("expose_internal_errors", &self.expose_internal_errors)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Wire all services from their ports
    pub fn from_ports(
        store: Arc<dyn UserStore>,
        weather: Arc<dyn WeatherPort>,
        email: Arc<dyn EmailPort>,
        job: &WeatherReportJobConfig,
    ) -> Self {
        let users = Arc::new(UserService::new(store));
        let reports = Arc::new(WeatherReportService::new(Arc::clone(&users), weather));
        let notifications = Arc::new(NotificationService::new(email));
        let batch = Arc::new(
            WeatherBatchService::new(
                Arc::clone(&users),
                Arc::clone(&reports),
                Arc::clone(&notifications),
            )
            .with_policy(job.failure_policy)
            .with_subject(job.subject.clone()),
        );

        Self {
            users,
            reports,
            batch,
            notifications,
            database: None,
            expose_internal_errors: true,
        }
    }

    /// Attach the database pool for readiness checks
    #[must_use]
    pub fn with_database(mut self, database: AsyncDatabase) -> Self {
        self.database = Some(database);
        self
    }

    /// Control whether 5xx responses carry the underlying message
    #[must_use]
    pub const fn with_exposed_errors(mut self, expose: bool) -> Self {
        self.expose_internal_errors = expose;
        self
    }

    /// Convert an application error according to the exposure setting
    pub fn api_error(&self, err: ApplicationError) -> ApiError {
        ApiError::from_application(err, self.expose_internal_errors)
    }
}
