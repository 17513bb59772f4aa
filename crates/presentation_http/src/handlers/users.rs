//! User registration and location handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use domain::User;
use serde::Deserialize;
use tracing::instrument;
use validator::Validate;

use super::parse_user_id;
use crate::{error::ApiError, middleware::ValidatedJson, state::AppState};

/// Body of `POST /users`
///
/// Fields are optional here so that a missing field is reported by the
/// domain as a validation error instead of a deserialization failure.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    pub email: Option<String>,
    pub location: Option<String>,
}

/// Body of `PUT /users/{id}/location`
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLocationRequest {
    pub location: Option<String>,
}

/// Register a user
#[instrument(skip(state, request))]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = state
        .users
        .create(request.email.as_deref(), request.location.as_deref())
        .await
        .map_err(|e| state.api_error(e))?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Replace a user's location
#[instrument(skip(state, request))]
pub async fn update_location(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateLocationRequest>,
) -> Result<Json<User>, ApiError> {
    let id = parse_user_id(&id)?;

    let user = state
        .users
        .update_location(&id, request.location.as_deref())
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(user))
}
