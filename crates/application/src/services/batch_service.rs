//! Batch weather report job
//!
//! Walks every user sequentially: fetch, append, format, mail. One user's
//! pipeline finishes before the next one starts.

use std::{fmt, str::FromStr, sync::Arc};

use domain::{User, UserId};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use crate::{
    error::ApplicationError,
    services::{NotificationService, UserService, WeatherReportService},
};

/// Subject line of report emails
pub const DEFAULT_REPORT_SUBJECT: &str = "Hourly Weather Report";

/// What a batch run does when one user's pipeline fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Log the failure and continue with the next user
    #[default]
    Isolate,
    /// Stop at the first failure; later users are not touched
    Abort,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Isolate => write!(f, "isolate"),
            Self::Abort => write!(f, "abort"),
        }
    }
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "isolate" => Ok(Self::Isolate),
            "abort" => Ok(Self::Abort),
            _ => Err(format!(
                "Invalid failure policy: {s}. Use 'isolate' or 'abort'"
            )),
        }
    }
}

/// A user whose pipeline failed during an isolated run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserFailure {
    /// The affected user
    pub user_id: UserId,
    /// Rendered error
    pub error: String,
}

/// Result of a completed batch run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    /// Number of users listed at the start of the run
    pub total: usize,
    /// Users whose weather was fetched, stored and formatted
    pub succeeded: usize,
    /// Users whose pipeline failed (only under [`FailurePolicy::Isolate`])
    pub failed: Vec<UserFailure>,
    /// Reports the mail relay did not accept
    pub emails_failed: usize,
}

impl BatchOutcome {
    /// Whether every user was processed and every email accepted
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.emails_failed == 0
    }
}

/// Service running the weather report batch
pub struct WeatherBatchService {
    users: Arc<UserService>,
    reports: Arc<WeatherReportService>,
    notifications: Arc<NotificationService>,
    policy: FailurePolicy,
    subject: String,
}

impl fmt::Debug for WeatherBatchService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherBatchService")
            .field("policy", &self.policy)
            .field("subject", &self.subject)
            .finish_non_exhaustive()
    }
}

impl WeatherBatchService {
    /// Create a batch service with the default subject and isolation policy
    pub fn new(
        users: Arc<UserService>,
        reports: Arc<WeatherReportService>,
        notifications: Arc<NotificationService>,
    ) -> Self {
        Self {
            users,
            reports,
            notifications,
            policy: FailurePolicy::default(),
            subject: DEFAULT_REPORT_SUBJECT.to_string(),
        }
    }

    /// Set the failure policy
    #[must_use]
    pub const fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the email subject
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// The configured failure policy
    pub const fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Run the report pipeline for every stored user
    ///
    /// Under [`FailurePolicy::Abort`] the first pipeline failure is returned
    /// and no later user is touched. Under [`FailurePolicy::Isolate`] the run
    /// always completes and failures are listed in the outcome. Mail
    /// failures never fail the run.
    #[instrument(skip(self), fields(policy = %self.policy))]
    pub async fn run_for_all_users(&self) -> Result<BatchOutcome, ApplicationError> {
        let users = self.users.list_all().await?;
        info!(count = users.len(), "Starting weather report run");

        let mut outcome = BatchOutcome {
            total: users.len(),
            ..BatchOutcome::default()
        };

        for mut user in users {
            match self.process(&mut user).await {
                Ok(delivered) => {
                    outcome.succeeded += 1;
                    if !delivered {
                        outcome.emails_failed += 1;
                    }
                },
                Err(e) if self.policy == FailurePolicy::Abort => {
                    error!(user_id = %user.id(), error = %e, "Weather report run aborted");
                    return Err(e);
                },
                Err(e) => {
                    error!(user_id = %user.id(), error = %e, "Weather report failed for user");
                    outcome.failed.push(UserFailure {
                        user_id: user.id(),
                        error: e.to_string(),
                    });
                },
            }
        }

        if outcome.is_clean() {
            info!(succeeded = outcome.succeeded, "Weather report run finished");
        } else {
            warn!(
                succeeded = outcome.succeeded,
                failed = outcome.failed.len(),
                emails_failed = outcome.emails_failed,
                "Weather report run finished with failures"
            );
        }
        Ok(outcome)
    }

    /// One user's pipeline; returns whether the email was accepted
    async fn process(&self, user: &mut User) -> Result<bool, ApplicationError> {
        let report = self.reports.refresh(user).await?;
        Ok(self
            .notifications
            .notify(user.email().as_str(), &self.subject, &report)
            .await)
    }
}
