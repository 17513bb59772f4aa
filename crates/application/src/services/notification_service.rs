//! Notification service
//!
//! Mail delivery for reports. Failures are reported to the caller as a
//! `DeliveryError` or, through [`NotificationService::notify`], logged and
//! swallowed.

use std::{fmt, sync::Arc};

use tracing::{debug, instrument, warn};

use crate::{
    error::ApplicationError,
    ports::{EmailDraft, EmailError, EmailPort},
};

/// Service for sending report emails
pub struct NotificationService {
    email_port: Arc<dyn EmailPort>,
}

impl fmt::Debug for NotificationService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationService").finish_non_exhaustive()
    }
}

impl NotificationService {
    /// Create a new notification service
    pub fn new(email_port: Arc<dyn EmailPort>) -> Self {
        Self { email_port }
    }

    /// Send a plain-text email
    #[instrument(skip(self, body))]
    pub async fn send(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<String, ApplicationError> {
        let draft = EmailDraft::new(to, subject, body);
        let message_id = self
            .email_port
            .send_email(&draft)
            .await
            .map_err(map_error)?;

        debug!(message_id = %message_id, "Email sent");
        Ok(message_id)
    }

    /// Send a plain-text email, logging instead of failing
    ///
    /// Returns whether the relay accepted the message.
    pub async fn notify(&self, to: &str, subject: &str, body: &str) -> bool {
        match self.send(to, subject, body).await {
            Ok(_) => true,
            Err(e) => {
                warn!(to = %to, error = %e, "Email delivery failed");
                false
            },
        }
    }

    /// Check whether the mail relay is reachable
    pub async fn is_available(&self) -> bool {
        self.email_port.is_available().await
    }
}

/// Map email port errors to application errors
fn map_error(err: EmailError) -> ApplicationError {
    ApplicationError::Delivery(err.to_string())
}
