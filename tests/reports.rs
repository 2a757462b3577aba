mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{add_todo, send, setup_therapist_and_patient, spawn_app};

#[tokio::test]
async fn inverted_date_range_is_rejected() {
    let app = spawn_app().await;
    let (therapist, _, patient) = setup_therapist_and_patient(&app).await;

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/generate_report/{patient}?start_date=2024-02-10&end_date=2024-02-01"),
        Some(&therapist),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn empty_range_reports_not_found() {
    let app = spawn_app().await;
    let (therapist, _, patient) = setup_therapist_and_patient(&app).await;

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/generate_report/{patient}?start_date=2024-02-01&end_date=2024-02-10"),
        Some(&therapist),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn report_covers_inclusive_range_and_is_written_to_disk() {
    let app = spawn_app().await;
    let (therapist, _, patient) = setup_therapist_and_patient(&app).await;

    let todo = add_todo(&app, &therapist, patient, "2024-02-01", "Squats", 2).await;
    add_todo(&app, &therapist, patient, "2024-02-10", "Plank", 1).await;
    // Outside the range; must not appear.
    add_todo(&app, &therapist, patient, "2024-02-11", "Lunges", 4).await;

    let id = todo["id"].as_i64().unwrap();
    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/update_exercise_completion_state/{id}"),
        Some(&therapist),
        Some(json!({ "completion_state": [true, true] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/generate_report/{patient}?start_date=2024-02-01&end_date=2024-02-10"),
        Some(&therapist),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let report_path = body["report_path"].as_str().unwrap();
    assert!(report_path.ends_with(".txt"));

    let content = std::fs::read_to_string(report_path).expect("report file should exist");
    assert!(content.contains("Squats: 2/2 sets"));
    assert!(content.contains("Plank: 0/1 sets"));
    assert!(!content.contains("Lunges"));
    assert!(content.contains("Overall: 2/3 sets completed (66%)"));
}

#[tokio::test]
async fn patient_can_fetch_own_report_but_not_anothers() {
    let app = spawn_app().await;
    let (therapist, patient_token, patient) = setup_therapist_and_patient(&app).await;
    add_todo(&app, &therapist, patient, "2024-02-01", "Squats", 2).await;

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/generate_report/{patient}?start_date=2024-02-01&end_date=2024-02-01"),
        Some(&patient_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let other = common::register_and_login(&app, "OtherPat", "other@example.test", "patient").await;
    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/generate_report/{patient}?start_date=2024-02-01&end_date=2024-02-01"),
        Some(&other),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}
