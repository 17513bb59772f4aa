//! OpenWeatherMap wire types
//!
//! Successful payloads stay untyped; only the error envelope is modelled.

use serde::Deserialize;

/// Error body returned alongside non-2xx responses
///
/// `cod` is a string on some endpoints and a number on others.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub cod: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiErrorBody {
    /// Human-readable detail, if the provider sent one
    pub fn detail(&self) -> Option<String> {
        match (&self.message, &self.cod) {
            (Some(message), _) if !message.is_empty() => Some(message.clone()),
            (_, Some(cod)) => Some(format!("code {cod}")),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_string_code() {
        let body: ApiErrorBody =
            serde_json::from_str(r#"{"cod":"404","message":"city not found"}"#).unwrap();
        assert_eq!(body.detail().as_deref(), Some("city not found"));
        assert_eq!(body.cod, Some(serde_json::json!("404")));
    }

    #[test]
    fn parses_numeric_code() {
        let body: ApiErrorBody =
            serde_json::from_str(r#"{"cod":401,"message":"Invalid API key."}"#).unwrap();
        assert_eq!(body.detail().as_deref(), Some("Invalid API key."));
    }

    #[test]
    fn falls_back_to_code() {
        let body: ApiErrorBody = serde_json::from_str(r#"{"cod":500}"#).unwrap();
        assert_eq!(body.detail().as_deref(), Some("code 500"));
    }

    #[test]
    fn tolerates_missing_fields() {
        let body: ApiErrorBody = serde_json::from_str("{}").unwrap();
        assert!(body.detail().is_none());
    }
}
