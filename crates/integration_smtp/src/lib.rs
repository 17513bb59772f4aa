//! SMTP integration
//!
//! A small async SMTP submission client: implicit TLS, STARTTLS or plain
//! connections, AUTH PLAIN, and single-recipient plain-text messages.

mod client;
mod smtp_client;
mod tls;

pub use client::{EmailComposition, SmtpConfig, SmtpError, SmtpSecurity, TlsConfig};
pub use smtp_client::SmtpClient;
