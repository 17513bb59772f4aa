//! SMTP email adapter - Implements EmailPort using integration_smtp

use application::ports::{EmailDraft, EmailError, EmailPort};
use async_trait::async_trait;
use integration_smtp::{EmailComposition, SmtpClient, SmtpConfig, SmtpError};
use tracing::{debug, instrument};

/// Adapter sending report mail through an SMTP relay
#[derive(Debug)]
pub struct SmtpEmailAdapter {
    client: SmtpClient,
}

impl SmtpEmailAdapter {
    /// Create a new adapter with the given configuration
    pub const fn new(config: SmtpConfig) -> Self {
        Self {
            client: SmtpClient::new(config),
        }
    }

    /// Map SmtpError to EmailError
    fn map_error(e: SmtpError) -> EmailError {
        match e {
            SmtpError::AuthenticationFailed => EmailError::AuthenticationFailed,
            SmtpError::ConnectionFailed(msg) => EmailError::ServiceUnavailable(msg),
            SmtpError::Timeout(_) => EmailError::ServiceUnavailable(e.to_string()),
            SmtpError::InvalidAddress(addr) => EmailError::InvalidAddress(addr),
            other => EmailError::OperationFailed(other.to_string()),
        }
    }
}

#[async_trait]
impl EmailPort for SmtpEmailAdapter {
    #[instrument(skip(self, draft), fields(to = %draft.to))]
    async fn send_email(&self, draft: &EmailDraft) -> Result<String, EmailError> {
        debug!(subject = %draft.subject, "Sending email via SMTP");

        let composition = EmailComposition::new(&draft.to, &draft.subject, &draft.body);
        self.client
            .send_email(&composition)
            .await
            .map_err(Self::map_error)
    }

    async fn is_available(&self) -> bool {
        self.client.check_connection().await
    }
}
