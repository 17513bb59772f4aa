//! Weather report handler

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use tracing::instrument;

use super::parse_user_id;
use crate::{error::ApiError, state::AppState};

/// Fetch, record and return a user's current weather report as plain text
///
/// The user is looked up first; an unknown id never reaches the provider.
#[instrument(skip(state))]
pub async fn get_weather(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_user_id(&id)?;

    let report = state
        .reports
        .report_for(&id)
        .await
        .map_err(|e| state.api_error(e))?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        report,
    ))
}
