//! Route definitions

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post, put},
};
use infrastructure::{Environment, ServerConfig};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::warn;

use crate::{handlers, middleware::propagate_request_id, state::AppState};

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health and status endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        // Users
        .route("/users", post(handlers::users::create_user))
        .route("/users/{id}/location", put(handlers::users::update_location))
        .route("/users/{id}/weather", get(handlers::weather::get_weather))
        // Jobs
        .route(
            "/jobs/weather-reports",
            post(handlers::jobs::trigger_weather_reports),
        )
        // Attach state
        .with_state(state)
}

/// Create the router wrapped in the server middleware stack
///
/// Layer order: the last added is outermost, so the request id is assigned
/// before tracing opens its span.
pub fn create_app(state: AppState, server: &ServerConfig, environment: Environment) -> Router {
    create_router(state)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(server.max_body_bytes))
        .layer(cors_layer(server, environment))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(propagate_request_id))
}

/// Build the CORS layer
///
/// An empty origin list allows everything in development and nothing in
/// production.
pub fn cors_layer(server: &ServerConfig, environment: Environment) -> CorsLayer {
    if server.cors_allowed_origins.is_empty() {
        if environment.is_production() {
            return CorsLayer::new();
        }
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = server
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| {
            origin
                .parse()
                .inspect_err(|_| warn!(origin = %origin, "Ignoring invalid CORS origin"))
                .ok()
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers(Any)
}
