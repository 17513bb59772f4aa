//! Batch trigger handler

use axum::{extract::State, http::StatusCode};
use tracing::{error, instrument};

use crate::state::AppState;

/// Body returned when every user was processed
pub const BATCH_SUCCESS_TEXT: &str = "Weather data updated and emails sent successfully";
/// Body returned when the run failed as a whole
pub const BATCH_FAILURE_TEXT: &str = "Error in executing cron job";

/// Run the weather report batch over all users
///
/// Responds in plain text. Mail failures do not change the outcome.
#[instrument(skip(state))]
pub async fn trigger_weather_reports(State(state): State<AppState>) -> (StatusCode, String) {
    match state.batch.run_for_all_users().await {
        Ok(outcome) if outcome.failed.is_empty() => (StatusCode::OK, BATCH_SUCCESS_TEXT.to_string()),
        Ok(outcome) => (
            StatusCode::OK,
            format!(
                "Weather data updated for {} of {} users ({} failed)",
                outcome.succeeded,
                outcome.total,
                outcome.failed.len()
            ),
        ),
        Err(e) => {
            error!(error = %e, "Weather report batch failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                BATCH_FAILURE_TEXT.to_string(),
            )
        },
    }
}
