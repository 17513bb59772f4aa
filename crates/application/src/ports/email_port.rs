//! Email port for application layer
//!
//! Defines the interface for sending plain-text mail.
//! Implemented by adapters in the infrastructure layer.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Email port errors
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Email service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

/// Email composition for sending
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailDraft {
    /// Recipient email address
    pub to: String,
    /// Email subject
    pub subject: String,
    /// Email body (plain text)
    pub body: String,
}

impl EmailDraft {
    /// Create a new email draft
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// Email port trait
#[cfg_attr(test, automock)]
#[async_trait]
pub trait EmailPort: Send + Sync {
    /// Send an email
    ///
    /// # Returns
    /// The message ID assigned to the sent message
    async fn send_email(&self, draft: &EmailDraft) -> Result<String, EmailError>;

    /// Check whether the mail relay is reachable
    async fn is_available(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trait_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn EmailPort>();
    }

    #[test]
    fn draft_new_sets_fields() {
        let draft = EmailDraft::new("a@example.com", "Subject", "Body");
        assert_eq!(draft.to, "a@example.com");
        assert_eq!(draft.subject, "Subject");
        assert_eq!(draft.body, "Body");
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            EmailError::AuthenticationFailed.to_string(),
            "Authentication failed"
        );
        assert_eq!(
            EmailError::InvalidAddress("x".to_string()).to_string(),
            "Invalid address: x"
        );
    }
}
