//! Printable view of the effective configuration
//!
//! Secret fields never serialize; a set secret is shown as a marker so the
//! operator can tell "configured" from "missing".

use infrastructure::AppConfig;

/// Marker printed in place of a configured secret
pub const REDACTED: &str = "[REDACTED]";

/// Render the configuration as TOML with secrets redacted
pub fn render(config: &AppConfig) -> anyhow::Result<String> {
    let toml::Value::Table(mut root) = toml::Value::try_from(config)? else {
        anyhow::bail!("configuration did not serialize to a table");
    };

    if config.weather.has_api_key() {
        mark_secret(&mut root, "weather", "api_key");
    }
    if config.smtp.password.is_some() {
        mark_secret(&mut root, "smtp", "password");
    }

    let mut out = toml::to_string_pretty(&root)?;

    let issues = config.validate();
    if !issues.is_empty() {
        out.push('\n');
        for issue in issues {
            let level = if issue.fatal { "error" } else { "warning" };
            out.push_str(&format!("# {level}: {issue}\n"));
        }
    }

    Ok(out)
}

fn mark_secret(root: &mut toml::Table, section: &str, key: &str) {
    if let Some(toml::Value::Table(table)) = root.get_mut(section) {
        table.insert(key.to_string(), toml::Value::String(REDACTED.to_string()));
    }
}
