//! SMTP configuration, errors and message types

use std::{fmt, path::PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// SMTP integration errors
#[derive(Debug, Error)]
pub enum SmtpError {
    /// Network connection or TLS handshake failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Invalid credentials or authentication failure
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// The server answered with an unexpected reply
    #[error("SMTP error: {0}")]
    Protocol(String),

    /// Invalid email address format
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// The message or configuration is unusable
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// The session did not finish within the configured timeout
    #[error("SMTP session timed out after {0}s")]
    Timeout(u64),
}

/// How the connection to the relay is secured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpSecurity {
    /// Plain connection upgraded with STARTTLS (usually port 587)
    #[default]
    StartTls,
    /// TLS from the first byte (usually port 465)
    Tls,
    /// No encryption; only for local relays and tests
    None,
}

impl fmt::Display for SmtpSecurity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartTls => write!(f, "starttls"),
            Self::Tls => write!(f, "tls"),
            Self::None => write!(f, "none"),
        }
    }
}

/// TLS configuration for relay connections
///
/// By default, certificate verification is enabled. Set `verify_certificates`
/// to `false` only for a local relay with a self-signed certificate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsConfig {
    /// Whether to verify TLS certificates
    ///
    /// - `None` (default): Verification enabled
    /// - `Some(true)`: Verification explicitly enabled
    /// - `Some(false)`: Verification disabled (for self-signed certs)
    #[serde(default)]
    pub verify_certificates: Option<bool>,

    /// Path to a custom CA certificate file (PEM format)
    #[serde(default)]
    pub ca_cert_path: Option<PathBuf>,

    /// Minimum TLS version to accept (default: "1.2")
    #[serde(default = "default_min_tls_version")]
    pub min_tls_version: String,
}

fn default_min_tls_version() -> String {
    "1.2".to_string()
}

impl TlsConfig {
    /// Check if TLS certificate verification is enabled
    ///
    /// `None` is interpreted as `true`.
    #[must_use]
    pub fn should_verify(&self) -> bool {
        self.verify_certificates.unwrap_or(true)
    }

    /// Create a TLS config that accepts self-signed certificates
    #[must_use]
    pub fn insecure() -> Self {
        warn!("TLS certificate verification disabled - use only for a local relay");
        Self {
            verify_certificates: Some(false),
            ..Self::default()
        }
    }

    /// Create a TLS config with a custom CA certificate
    pub fn with_ca_cert(ca_cert_path: impl Into<PathBuf>) -> Self {
        Self {
            verify_certificates: Some(true),
            ca_cert_path: Some(ca_cert_path.into()),
            ..Self::default()
        }
    }
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            verify_certificates: None,
            ca_cert_path: None,
            min_tls_version: default_min_tls_version(),
        }
    }
}

/// SMTP relay configuration
///
/// Defaults target Gmail's submission port with STARTTLS.
#[derive(Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    /// Relay host (default: smtp.gmail.com)
    #[serde(default = "default_host")]
    pub host: String,
    /// Relay port (default: 587)
    #[serde(default = "default_port")]
    pub port: u16,
    /// Connection security (default: starttls)
    #[serde(default)]
    pub security: SmtpSecurity,
    /// Login name; AUTH is skipped when empty
    #[serde(default)]
    pub username: String,
    /// Login password
    #[serde(default, skip_serializing)]
    pub password: String,
    /// Sender address; falls back to `username` when empty
    #[serde(default)]
    pub from: String,
    /// Whole-session timeout in seconds; unset means no limit
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// TLS configuration for secure connections
    #[serde(default)]
    pub tls: TlsConfig,
}

fn default_host() -> String {
    "smtp.gmail.com".to_string()
}

const fn default_port() -> u16 {
    587
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            security: SmtpSecurity::default(),
            username: String::new(),
            password: String::new(),
            from: String::new(),
            timeout_secs: None,
            tls: TlsConfig::default(),
        }
    }
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("security", &self.security)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("from", &self.from)
            .field("timeout_secs", &self.timeout_secs)
            .field("tls", &self.tls)
            .finish()
    }
}

impl SmtpConfig {
    /// Creates a new configuration with the specified credentials
    pub fn with_credentials(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            ..Default::default()
        }
    }

    /// Sets the relay connection details
    #[must_use]
    pub fn with_server(mut self, host: impl Into<String>, port: u16, security: SmtpSecurity) -> Self {
        self.host = host.into();
        self.port = port;
        self.security = security;
        self
    }

    /// Sets the sender address
    #[must_use]
    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = from.into();
        self
    }

    /// The envelope and header sender
    pub fn sender(&self) -> &str {
        if self.from.is_empty() {
            &self.username
        } else {
            &self.from
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), SmtpError> {
        if self.host.is_empty() {
            return Err(SmtpError::InvalidMessage(
                "SMTP host is required".to_string(),
            ));
        }
        if self.port == 0 {
            return Err(SmtpError::InvalidMessage(
                "SMTP port must be non-zero".to_string(),
            ));
        }
        let sender = self.sender();
        if sender.is_empty() || !sender.contains('@') {
            return Err(SmtpError::InvalidAddress(format!(
                "Invalid sender: '{sender}'"
            )));
        }
        if !self.username.is_empty() && self.password.is_empty() {
            return Err(SmtpError::AuthenticationFailed);
        }
        Ok(())
    }
}

/// A plain-text message to a single recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailComposition {
    /// Recipient email address
    pub to: String,
    /// Email subject
    pub subject: String,
    /// Email body (plain text)
    pub body: String,
}

impl EmailComposition {
    /// Creates a new email composition
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }

    /// Validates the composition
    ///
    /// The recipient must look like an address and no header value may
    /// contain a line break.
    pub fn validate(&self) -> Result<(), SmtpError> {
        let to = self.to.trim();
        if to.is_empty() || !to.contains('@') || to.contains(['\r', '\n', '<', '>']) {
            return Err(SmtpError::InvalidAddress(format!(
                "Invalid recipient: {}",
                self.to
            )));
        }
        if self.subject.contains(['\r', '\n']) {
            return Err(SmtpError::InvalidMessage(
                "Subject must be a single line".to_string(),
            ));
        }
        Ok(())
    }
}
