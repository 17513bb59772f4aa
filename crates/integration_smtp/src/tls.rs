//! TLS connector construction shared by implicit TLS and STARTTLS sessions

use std::fs;

use native_tls::Certificate;
use tracing::{debug, warn};

use crate::{SmtpError, TlsConfig};

/// Builds a tokio TLS connector from the TLS configuration
///
/// Handles custom CA certificates, the verification toggle and the minimum
/// protocol version.
pub(crate) fn build_tls_connector(
    tls_config: &TlsConfig,
) -> Result<tokio_native_tls::TlsConnector, SmtpError> {
    let mut builder = native_tls::TlsConnector::builder();

    if !tls_config.should_verify() {
        warn!("TLS certificate verification disabled for SMTP relay");
        builder.danger_accept_invalid_certs(true);
    } else if let Some(ca_cert_path) = &tls_config.ca_cert_path {
        debug!(path = %ca_cert_path.display(), "Loading custom CA certificate");
        let cert_data = fs::read(ca_cert_path).map_err(|e| {
            SmtpError::ConnectionFailed(format!(
                "Failed to read CA certificate at {}: {e}",
                ca_cert_path.display()
            ))
        })?;
        let cert = Certificate::from_pem(&cert_data).map_err(|e| {
            SmtpError::ConnectionFailed(format!("Failed to parse CA certificate: {e}"))
        })?;
        builder.add_root_certificate(cert);
    }

    let min_protocol = match tls_config.min_tls_version.as_str() {
        "1.0" => native_tls::Protocol::Tlsv10,
        "1.1" => native_tls::Protocol::Tlsv11,
        _ => native_tls::Protocol::Tlsv12,
    };
    builder.min_protocol_version(Some(min_protocol));

    builder
        .build()
        .map(tokio_native_tls::TlsConnector::from)
        .map_err(|e| SmtpError::ConnectionFailed(format!("TLS builder failed: {e}")))
}
