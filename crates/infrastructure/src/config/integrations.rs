//! Integration configurations: OpenWeatherMap and SMTP relay.

use std::path::PathBuf;

use integration_smtp::{SmtpConfig, SmtpSecurity, TlsConfig};
use integration_weather::WeatherConfig;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::default_true;

// ==============================
// Weather Configuration
// ==============================

/// OpenWeatherMap configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherAppConfig {
    /// API base URL
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,

    /// API key (sensitive - uses `SecretString`)
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,

    /// Unit system requested from the provider
    #[serde(default = "default_units")]
    pub units: String,

    /// Request timeout in seconds; unset means no limit
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_units() -> String {
    "metric".to_string()
}

impl Default for WeatherAppConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
            api_key: None,
            units: default_units(),
            timeout_secs: None,
        }
    }
}

impl WeatherAppConfig {
    /// Whether a non-empty API key is configured
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|key| !key.expose_secret().trim().is_empty())
    }
}

impl From<&WeatherAppConfig> for WeatherConfig {
    fn from(config: &WeatherAppConfig) -> Self {
        let api_key = config
            .api_key
            .as_ref()
            .map(|key| key.expose_secret().to_string())
            .unwrap_or_default();

        Self {
            base_url: config.base_url.clone(),
            api_key,
            units: config.units.clone(),
            timeout_secs: config.timeout_secs,
        }
    }
}

// ==============================
// SMTP Configuration
// ==============================

/// SMTP relay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpAppConfig {
    /// Relay host
    #[serde(default = "default_smtp_host")]
    pub host: String,

    /// Relay port
    #[serde(default = "default_smtp_port")]
    pub port: u16,

    /// Connection security: starttls, tls or none
    #[serde(default)]
    pub security: SmtpSecurity,

    /// Login name
    #[serde(default)]
    pub username: String,

    /// Login password (sensitive - uses `SecretString`)
    #[serde(default, skip_serializing)]
    pub password: Option<SecretString>,

    /// Sender address; falls back to `username` when empty
    #[serde(default)]
    pub from: String,

    /// Whole-session timeout in seconds; unset means no limit
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Verify the relay's TLS certificate (default: true)
    #[serde(default = "default_true")]
    pub verify_certificates: bool,

    /// Extra CA certificate (PEM) to trust
    #[serde(default)]
    pub ca_cert_path: Option<PathBuf>,
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

const fn default_smtp_port() -> u16 {
    587
}

impl Default for SmtpAppConfig {
    fn default() -> Self {
        Self {
            host: default_smtp_host(),
            port: default_smtp_port(),
            security: SmtpSecurity::default(),
            username: String::new(),
            password: None,
            from: String::new(),
            timeout_secs: None,
            verify_certificates: true,
            ca_cert_path: None,
        }
    }
}

impl SmtpAppConfig {
    /// The sender address mail goes out under
    #[must_use]
    pub fn sender(&self) -> &str {
        if self.from.is_empty() {
            &self.username
        } else {
            &self.from
        }
    }
}

impl From<&SmtpAppConfig> for SmtpConfig {
    fn from(config: &SmtpAppConfig) -> Self {
        let password = config
            .password
            .as_ref()
            .map(|p| p.expose_secret().to_string())
            .unwrap_or_default();

        let tls = match &config.ca_cert_path {
            Some(path) => TlsConfig::with_ca_cert(path.clone()),
            None => TlsConfig {
                verify_certificates: Some(config.verify_certificates),
                ..TlsConfig::default()
            },
        };

        Self {
            timeout_secs: config.timeout_secs,
            tls,
            ..Self::with_credentials(&config.username, password)
                .with_server(&config.host, config.port, config.security)
                .with_from(&config.from)
        }
    }
}
