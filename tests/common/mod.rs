#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;
use uuid::Uuid;

use rehab_server::{routes, AppState};

pub struct TestApp {
    pub router: Router,
    pub report_dir: std::path::PathBuf,
}

/// Fresh app over an in-memory SQLite database with migrations applied.
/// A single pool connection keeps every query on the same in-memory database.
pub async fn spawn_app() -> TestApp {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite should connect");

    sqlx::migrate!("./src/db/migrations")
        .run(&pool)
        .await
        .expect("migrations should apply");

    let report_dir = std::env::temp_dir().join(format!("rehab-report-test-{}", Uuid::new_v4()));
    let state = AppState {
        db: pool,
        jwt_secret: "test-secret".to_string(),
        report_dir: report_dir.to_string_lossy().into_owned(),
    };

    TestApp {
        router: routes::api_router(state),
        report_dir,
    }
}

/// Drive one request through the router and return the status plus parsed JSON body.
pub async fn send(
    app: &TestApp,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app
        .router
        .clone()
        .oneshot(request)
        .await
        .expect("request should not fail at the transport level");
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

pub async fn register(app: &TestApp, name: &str, email: &str, role: &str) {
    let (status, body) = send(
        app,
        Method::POST,
        "/register",
        None,
        Some(json!({
            "name": name,
            "email": email,
            "password": "password123",
            "role": role,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
}

pub async fn login(app: &TestApp, email: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "email": email, "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["access_token"].as_str().unwrap().to_string()
}

pub async fn register_and_login(app: &TestApp, name: &str, email: &str, role: &str) -> String {
    register(app, name, email, role).await;
    login(app, email).await
}

/// Look a patient's id up via the therapist roster.
pub async fn patient_id(app: &TestApp, therapist_token: &str, email: &str) -> Uuid {
    let (status, body) = send(app, Method::GET, "/get_users", Some(therapist_token), None).await;
    assert_eq!(status, StatusCode::OK, "roster fetch failed: {body}");
    let id = body["users"]
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["email"] == email)
        .unwrap_or_else(|| panic!("patient {email} not in roster"))["id"]
        .as_str()
        .unwrap()
        .to_string();
    id.parse().unwrap()
}

/// Register a therapist and a patient; returns (therapist token, patient token, patient id).
pub async fn setup_therapist_and_patient(app: &TestApp) -> (String, String, Uuid) {
    let therapist = register_and_login(app, "Tess", "tess@clinic.test", "therapist").await;
    let patient = register_and_login(app, "Pat", "pat@example.test", "patient").await;
    let id = patient_id(app, &therapist, "pat@example.test").await;
    (therapist, patient, id)
}

/// Create an assignment as the therapist and return its JSON representation.
pub async fn add_todo(
    app: &TestApp,
    therapist_token: &str,
    patient: Uuid,
    date: &str,
    name: &str,
    sets: i64,
) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/add_exercise_todo",
        Some(therapist_token),
        Some(json!({
            "user_id": patient,
            "date": date,
            "name": name,
            "repetitions": 10,
            "sets": sets,
            "rest_time": 60,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "add_exercise_todo failed: {body}");
    body
}
