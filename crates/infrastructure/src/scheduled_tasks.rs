//! Factory functions for scheduled tasks
//!
//! Provides the task closure the scheduler runs for periodic weather
//! report mailings.

use std::sync::Arc;

use application::WeatherBatchService;
use futures::future::BoxFuture;
use tracing::{error, info, warn};

/// Task name for the weather report batch
pub const WEATHER_REPORTS_TASK: &str = "weather_reports";

/// Create the weather report task closure
///
/// The task fails only when the run as a whole fails (listing users, or the
/// first user failure under the abort policy). Isolated per-user failures
/// are logged and the task still counts as completed.
pub fn create_weather_report_task(
    batch: Arc<WeatherBatchService>,
) -> impl Fn() -> BoxFuture<'static, Result<(), String>> + Send + Sync + 'static {
    move || {
        let batch = Arc::clone(&batch);

        Box::pin(async move {
            match batch.run_for_all_users().await {
                Ok(outcome) if outcome.is_clean() => {
                    info!(users = outcome.total, "Scheduled weather reports sent");
                    Ok(())
                },
                Ok(outcome) => {
                    warn!(
                        users = outcome.total,
                        succeeded = outcome.succeeded,
                        failed = outcome.failed.len(),
                        emails_failed = outcome.emails_failed,
                        "Scheduled weather reports finished with failures"
                    );
                    Ok(())
                },
                Err(e) => {
                    error!(error = %e, "Scheduled weather report run failed");
                    Err(format!("Weather report run failed: {e}"))
                },
            }
        })
    }
}
