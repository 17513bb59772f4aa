//! Weatherly CLI
//!
//! Command-line interface for administration and testing.

#![allow(clippy::print_stdout)]

mod config_dump;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use infrastructure::{AppConfig, AsyncDatabase, AsyncDatabaseConfig, init_tracing};
use tracing::debug;

/// Default server URL for the HTTP commands
const DEFAULT_URL: &str = "http://localhost:3000";

/// Weatherly CLI
#[derive(Parser)]
#[command(name = "weatherly-cli")]
#[command(author, version, about = "Weatherly administration CLI", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (defaults to $WEATHERLY_CONFIG, then ./config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check server health (usable as a container healthcheck)
    Health {
        /// Server URL
        #[arg(short, long, env = "WEATHERLY_URL", default_value = DEFAULT_URL)]
        url: String,
    },

    /// Trigger the weather report batch and print its outcome
    RunReports {
        /// Server URL
        #[arg(short, long, env = "WEATHERLY_URL", default_value = DEFAULT_URL)]
        url: String,
    },

    /// Register a user
    ///
    /// Example: weatherly-cli create-user --email ada@example.com --location "Paris"
    CreateUser {
        /// Server URL
        #[arg(short, long, env = "WEATHERLY_URL", default_value = DEFAULT_URL)]
        url: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Free-text location, e.g. "Paris" or "Paris,FR"
        #[arg(short, long)]
        location: String,
    },

    /// Apply database migrations
    Migrate,

    /// Print the effective configuration with secrets redacted
    Config,
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Format endpoint URL
fn endpoint_url(base_url: &str, path: &str) -> String {
    format!("{}{path}", base_url.trim_end_matches('/'))
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing("text", log_filter_from_verbosity(cli.verbose))?;

    let client = reqwest::Client::new();

    match cli.command {
        Commands::Health { url } => {
            match client.get(endpoint_url(&url, "/health")).send().await {
                Ok(resp) if resp.status().is_success() => {
                    println!("✅ Healthy");
                },
                Ok(resp) => {
                    println!("❌ Unhealthy: HTTP {}", resp.status());
                    std::process::exit(1);
                },
                Err(e) => {
                    println!("❌ Unhealthy: {e}");
                    std::process::exit(1);
                },
            }
        },

        Commands::RunReports { url } => {
            let resp = client
                .post(endpoint_url(&url, "/jobs/weather-reports"))
                .send()
                .await?;
            let status = resp.status();
            let text = resp.text().await?;

            if status.is_success() {
                println!("✅ {text}");
            } else {
                println!("❌ HTTP {status}: {text}");
                std::process::exit(1);
            }
        },

        Commands::CreateUser {
            url,
            email,
            location,
        } => {
            let resp = client
                .post(endpoint_url(&url, "/users"))
                .json(&serde_json::json!({ "email": email, "location": location }))
                .send()
                .await?;
            let status = resp.status();
            let body = resp.json::<serde_json::Value>().await?;

            if status.is_success() {
                println!("👤 User created:");
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                let message = body
                    .get("error")
                    .and_then(|v| v.as_str())
                    .unwrap_or("unknown error");
                println!("❌ HTTP {status}: {message}");
                std::process::exit(1);
            }
        },

        Commands::Migrate => {
            let config = load_config(cli.config.as_ref())?;
            debug!(url = %config.database.url, "Opening database");

            let database = AsyncDatabase::new(&AsyncDatabaseConfig::from(&config.database)).await?;
            database.migrate().await?;
            database.close().await;

            println!("✅ Migrations applied to {}", config.database.url);
        },

        Commands::Config => {
            let config = load_config(cli.config.as_ref())?;
            print!("{}", config_dump::render(&config)?);
        },
    }

    Ok(())
}
