//! Weatherly HTTP Server
//!
//! Main entry point for the HTTP API server.

use std::sync::Arc;

use anyhow::Context;
use infrastructure::{
    AppConfig, AsyncDatabase, AsyncDatabaseConfig, DEFAULT_LOG_FILTER, SchedulerConfig,
    SmtpEmailAdapter, SqliteUserStore, TaskScheduler, WEATHER_REPORTS_TASK, WeatherAdapter,
    create_weather_report_task, init_tracing,
};
use presentation_http::{AppState, create_app};
use tokio::{net::TcpListener, signal};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration before logging so the format can be honored
    let (config, load_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    init_tracing(&config.server.log_format, DEFAULT_LOG_FILTER)?;

    info!("Weatherly v{} starting...", env!("CARGO_PKG_VERSION"));
    if let Some(e) = load_error {
        warn!("Failed to load config, using defaults: {}", e);
    }

    let issues = config.validate();
    for issue in issues.iter().filter(|i| !i.fatal) {
        warn!(key = issue.key, "{}", issue.message);
    }
    let fatal: Vec<String> = issues
        .iter()
        .filter(|i| i.fatal)
        .map(ToString::to_string)
        .collect();
    if !fatal.is_empty() {
        anyhow::bail!("Invalid configuration: {}", fatal.join("; "));
    }

    info!(
        environment = %config.environment,
        host = %config.server.host,
        port = %config.server.port,
        database = %config.database.url,
        "Configuration loaded"
    );

    // Database
    let database = AsyncDatabase::new(&AsyncDatabaseConfig::from(&config.database))
        .await
        .context("Failed to open database")?;
    if config.database.run_migrations {
        database
            .migrate()
            .await
            .context("Failed to run migrations")?;
    }

    // Ports
    let store = Arc::new(SqliteUserStore::new(database.pool().clone()));
    let weather = Arc::new(
        WeatherAdapter::with_config((&config.weather).into())
            .map_err(|e| anyhow::anyhow!("Failed to initialize weather client: {e}"))?,
    );
    let email = Arc::new(SmtpEmailAdapter::new((&config.smtp).into()));

    let job = &config.jobs.weather_reports;
    let state = AppState::from_ports(store, weather, email, job)
        .with_database(database.clone())
        .with_exposed_errors(!config.environment.is_production());

    // Scheduled reports
    let scheduler = if job.enabled {
        let scheduler = TaskScheduler::new(SchedulerConfig { auto_start: false }).await?;
        scheduler
            .add_task(
                WEATHER_REPORTS_TASK,
                &job.cron,
                create_weather_report_task(Arc::clone(&state.batch)),
            )
            .await?;
        scheduler.start().await?;
        info!(cron = %job.cron, policy = %job.failure_policy, "Weather report job enabled");
        Some(scheduler)
    } else {
        info!("Weather report job disabled");
        None
    };

    let app = create_app(state, &config.server, config.environment);

    // Start server
    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(scheduler) = &scheduler
        && let Err(e) = scheduler.stop().await
    {
        error!(error = %e, "Failed to stop scheduler");
    }
    database.close().await;

    info!("Server shutdown complete");

    Ok(())
}

/// Wait for shutdown signals (SIGINT, SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
