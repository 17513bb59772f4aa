//! End-to-end tests of the HTTP API over an in-memory database

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use application::{
    ApplicationError, FailurePolicy,
    ports::{EmailDraft, EmailError, EmailPort, WeatherPort},
};
use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use domain::{Location, WeatherSnapshot};
use infrastructure::{AsyncDatabase, SqliteUserStore, WeatherReportJobConfig};
use parking_lot::Mutex;
use presentation_http::{AppState, create_router};
use serde_json::{Value, json};

/// Weather provider that answers for any city except the ones it is told to fail
#[derive(Default)]
struct FakeWeather {
    calls: AtomicUsize,
    unknown: Vec<String>,
}

impl FakeWeather {
    fn failing_for(cities: &[&str]) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            unknown: cities.iter().map(ToString::to_string).collect(),
        }
    }
}

#[async_trait]
impl WeatherPort for FakeWeather {
    async fn fetch_current(&self, location: &Location) -> Result<WeatherSnapshot, ApplicationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unknown.iter().any(|c| c == location.as_str()) {
            return Err(ApplicationError::Upstream(format!(
                "Location not found: {}",
                location.as_str()
            )));
        }
        Ok(WeatherSnapshot::from_value(json!({
            "name": location.as_str(),
            "sys": {"country": "FR"},
            "weather": [{"main": "Clear", "description": "clear sky"}],
            "main": {"temp": 18.2, "feels_like": 17.5, "humidity": 60},
            "wind": {"speed": 3.1}
        }))?)
    }
}

/// Mail relay that records drafts, optionally rejecting every send
#[derive(Default)]
struct Outbox {
    sent: Mutex<Vec<EmailDraft>>,
    reject: bool,
}

#[async_trait]
impl EmailPort for Outbox {
    async fn send_email(&self, draft: &EmailDraft) -> Result<String, EmailError> {
        if self.reject {
            return Err(EmailError::ServiceUnavailable("relay down".to_string()));
        }
        self.sent.lock().push(draft.clone());
        Ok(format!("<{}@test>", self.sent.lock().len()))
    }

    async fn is_available(&self) -> bool {
        !self.reject
    }
}

struct Harness {
    server: TestServer,
    weather: Arc<FakeWeather>,
    outbox: Arc<Outbox>,
}

async fn harness_with(weather: FakeWeather, outbox: Outbox, policy: FailurePolicy) -> Harness {
    let db = AsyncDatabase::in_memory().await.unwrap();
    db.migrate().await.unwrap();

    let weather = Arc::new(weather);
    let outbox = Arc::new(outbox);
    let job = WeatherReportJobConfig {
        failure_policy: policy,
        ..WeatherReportJobConfig::default()
    };
    let state = AppState::from_ports(
        Arc::new(SqliteUserStore::new(db.pool().clone())),
        weather.clone(),
        outbox.clone(),
        &job,
    )
    .with_database(db);

    Harness {
        server: TestServer::new(create_router(state)).unwrap(),
        weather,
        outbox,
    }
}

async fn harness() -> Harness {
    harness_with(FakeWeather::default(), Outbox::default(), FailurePolicy::Isolate).await
}

async fn create_user(server: &TestServer, email: &str, location: &str) -> Value {
    let response = server
        .post("/users")
        .json(&json!({"email": email, "location": location}))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    response.json::<Value>()
}

fn id_of(user: &Value) -> String {
    user["id"].as_str().unwrap().to_string()
}

// ---------------------------------------------------------------------------
// POST /users
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_user_returns_201_with_empty_history() {
    let h = harness().await;

    let user = create_user(&h.server, "a@example.com", "Paris").await;

    assert_eq!(user["email"], "a@example.com");
    assert_eq!(user["location"], "Paris");
    assert_eq!(user["weatherHistory"], json!([]));
    assert!(user["id"].as_str().is_some_and(|id| !id.is_empty()));
}

#[tokio::test]
async fn create_user_requires_both_fields() {
    let h = harness().await;

    for body in [
        json!({"location": "Paris"}),
        json!({"email": "a@example.com"}),
        json!({"email": "   ", "location": "Paris"}),
        json!({"email": "a@example.com", "location": ""}),
        json!({}),
    ] {
        let response = h.server.post("/users").json(&body).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(response.json::<Value>()["code"], "validation_error");
    }
}

#[tokio::test]
async fn create_user_rejects_malformed_json() {
    let h = harness().await;

    let response = h
        .server
        .post("/users")
        .content_type("application/json")
        .bytes("{\"email\": ".into())
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_user_accepts_long_fields() {
    let h = harness().await;
    let location = format!("{}, FR", "Saint-Remy-".repeat(20));
    let email = format!("{}@example.com", "a".repeat(300));

    let user = create_user(&h.server, &email, &location).await;

    assert_eq!(user["location"], location.as_str());
    assert_eq!(user["email"], email.as_str());
}

// ---------------------------------------------------------------------------
// PUT /users/{id}/location
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_location_replaces_location_and_keeps_history() {
    let h = harness().await;
    let user = create_user(&h.server, "a@example.com", "Paris").await;
    let id = id_of(&user);

    h.server.get(&format!("/users/{id}/weather")).await;

    let response = h
        .server
        .put(&format!("/users/{id}/location"))
        .json(&json!({"location": "Berlin"}))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let updated = response.json::<Value>();
    assert_eq!(updated["location"], "Berlin");
    assert_eq!(updated["email"], "a@example.com");
    assert_eq!(updated["weatherHistory"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn update_location_of_unknown_user_is_404() {
    let h = harness().await;

    let response = h
        .server
        .put(&format!("/users/{}/location", domain::UserId::new()))
        .json(&json!({"location": "Berlin"}))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["code"], "not_found");
}

#[tokio::test]
async fn update_location_requires_location() {
    let h = harness().await;
    let id = id_of(&create_user(&h.server, "a@example.com", "Paris").await);

    for body in [json!({}), json!({"location": "  "})] {
        let response = h
            .server
            .put(&format!("/users/{id}/location"))
            .json(&body)
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "{body}");
    }
}

#[tokio::test]
async fn update_location_with_malformed_id_is_400() {
    let h = harness().await;

    let response = h
        .server
        .put("/users/not-an-id/location")
        .json(&json!({"location": "Berlin"}))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "bad_request");
}

// ---------------------------------------------------------------------------
// GET /users/{id}/weather
// ---------------------------------------------------------------------------

#[tokio::test]
async fn weather_returns_plain_text_report_and_records_history() {
    let h = harness().await;
    let id = id_of(&create_user(&h.server, "a@example.com", "Paris").await);

    let response = h.server.get(&format!("/users/{id}/weather")).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(
        response
            .header("content-type")
            .to_str()
            .unwrap()
            .starts_with("text/plain")
    );
    assert_eq!(
        response.text(),
        "Weather Report for Paris, FR:\n\
         Main: Clear (clear sky)\n\
         Temperature: 18.2°C (Feels like: 17.5°C)\n\
         Humidity: 60%\n\
         Wind Speed: 3.1 m/s\n"
    );

    h.server.get(&format!("/users/{id}/weather")).await;
    let user = h
        .server
        .put(&format!("/users/{id}/location"))
        .json(&json!({"location": "Paris"}))
        .await
        .json::<Value>();
    let history = user["weatherHistory"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["weather"]["name"], "Paris");
    assert!(history[0]["date"].is_string());
}

#[tokio::test]
async fn weather_for_unknown_user_is_404_without_fetching() {
    let h = harness().await;

    let response = h
        .server
        .get(&format!("/users/{}/weather", domain::UserId::new()))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(h.weather.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn weather_with_malformed_id_is_400() {
    let h = harness().await;

    let response = h.server.get("/users/42/weather").await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(h.weather.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn weather_upstream_failure_is_500_and_records_nothing() {
    let h = harness_with(
        FakeWeather::failing_for(&["Atlantis"]),
        Outbox::default(),
        FailurePolicy::Isolate,
    )
    .await;
    let id = id_of(&create_user(&h.server, "a@example.com", "Atlantis").await);

    let response = h.server.get(&format!("/users/{id}/weather")).await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json::<Value>()["code"], "upstream_error");

    let user = h
        .server
        .put(&format!("/users/{id}/location"))
        .json(&json!({"location": "Atlantis"}))
        .await
        .json::<Value>();
    assert_eq!(user["weatherHistory"], json!([]));
}

// ---------------------------------------------------------------------------
// POST /jobs/weather-reports
// ---------------------------------------------------------------------------

#[tokio::test]
async fn batch_updates_and_mails_every_user() {
    let h = harness().await;
    create_user(&h.server, "a@example.com", "Paris").await;
    create_user(&h.server, "b@example.com", "Lyon").await;

    let response = h.server.post("/jobs/weather-reports").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.text(),
        "Weather data updated and emails sent successfully"
    );

    let sent = h.outbox.sent.lock().clone();
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|d| d.subject == "Hourly Weather Report"));
    assert!(sent.iter().any(|d| d.to == "b@example.com" && d.body.contains("Lyon")));
}

#[tokio::test]
async fn batch_with_no_users_succeeds() {
    let h = harness().await;

    let response = h.server.post("/jobs/weather-reports").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(h.weather.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn batch_isolates_failing_users() {
    let h = harness_with(
        FakeWeather::failing_for(&["Atlantis"]),
        Outbox::default(),
        FailurePolicy::Isolate,
    )
    .await;
    create_user(&h.server, "a@example.com", "Atlantis").await;
    create_user(&h.server, "b@example.com", "Lyon").await;

    let response = h.server.post("/jobs/weather-reports").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.text(),
        "Weather data updated for 1 of 2 users (1 failed)"
    );
    assert_eq!(h.outbox.sent.lock().len(), 1);
}

#[tokio::test]
async fn batch_abort_policy_fails_the_run() {
    let h = harness_with(
        FakeWeather::failing_for(&["Atlantis"]),
        Outbox::default(),
        FailurePolicy::Abort,
    )
    .await;
    create_user(&h.server, "a@example.com", "Atlantis").await;
    create_user(&h.server, "b@example.com", "Lyon").await;

    let response = h.server.post("/jobs/weather-reports").await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.text(), "Error in executing cron job");
}

#[tokio::test]
async fn batch_ignores_mail_failures() {
    let h = harness_with(
        FakeWeather::default(),
        Outbox {
            reject: true,
            ..Outbox::default()
        },
        FailurePolicy::Isolate,
    )
    .await;
    let id = id_of(&create_user(&h.server, "a@example.com", "Paris").await);

    let response = h.server.post("/jobs/weather-reports").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.text(),
        "Weather data updated and emails sent successfully"
    );

    let user = h
        .server
        .put(&format!("/users/{id}/location"))
        .json(&json!({"location": "Paris"}))
        .await
        .json::<Value>();
    assert_eq!(user["weatherHistory"].as_array().unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_is_ok() {
    let h = harness().await;

    let response = h.server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["status"], "ok");
}

#[tokio::test]
async fn readiness_reports_database_and_relay() {
    let h = harness_with(
        FakeWeather::default(),
        Outbox {
            reject: true,
            ..Outbox::default()
        },
        FailurePolicy::Isolate,
    )
    .await;

    let response = h.server.get("/ready").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["ready"], true);
    assert_eq!(body["database"], true);
    assert_eq!(body["mail_relay"], false);
}
