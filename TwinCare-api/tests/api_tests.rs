use std::sync::{Arc, Once};

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use twin_care_api::api::{create_app, AppState, SharedPatientService, SharedVitalsService};
use twin_care_data::repository::{PatientRepository, VitalsRepository};
use twin_care_domain::services::{PatientService, VitalsService};
use twin_care_domain::testing::{fixture_monitoring_service, MockHealthService};

// Ensure tracing is initialized only once
static INIT: Once = Once::new();

fn initialize() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

/// Router over in-memory repositories, the fixture artifacts and unpaced sessions
fn test_app(ticks: u32) -> Router {
    initialize();

    let patients: SharedPatientService = Arc::new(PatientService::new(PatientRepository::in_memory()));
    let vitals: SharedVitalsService = Arc::new(VitalsService::new(VitalsRepository::in_memory()));
    let monitoring = fixture_monitoring_service(vitals.clone(), ticks);

    create_app(
        AppState::new(patients, vitals, monitoring),
        Arc::new(MockHealthService::new()),
    )
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn register(app: &Router, name: &str) -> String {
    let (status, body) = send(app, post_json("/api/v1/patients", json!({
        "name": name,
        "age": 64,
        "gender": "Female",
        "contact": "555-0100",
        "notes": "type 2 diabetes"
    }))).await;

    assert_eq!(status, StatusCode::CREATED, "registration failed: {}", body);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check() {
    let app = test_app(1);
    let (status, body) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["components"]["database"]["status"], "ok");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = test_app(1);
    let (status, body) = send(&app, get("/api-docs/openapi.json")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/v1/patients/{id}/monitoring"].is_object());
}

#[tokio::test]
async fn test_register_and_fetch_patient() {
    let app = test_app(1);
    let id = register(&app, "Jane Doe").await;
    assert!(id.starts_with("jane_doe_"));

    let (status, body) = send(&app, get(&format!("/api/v1/patients/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Jane Doe");
    assert_eq!(body["conditions"], json!(["type 2 diabetes"]));

    let (status, body) = send(&app, get("/api/v1/patients")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_patient_is_not_found() {
    let app = test_app(1);

    for uri in [
        "/api/v1/patients/nobody_20240101000000",
        "/api/v1/patients/nobody_20240101000000/ehr",
        "/api/v1/patients/nobody_20240101000000/vitals",
    ] {
        let (status, body) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(body["error"], "not_found");
    }

    let (status, _) = send(&app, post_json("/api/v1/patients/nobody_20240101000000/monitoring", json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_registration_is_rejected() {
    let app = test_app(1);

    let (status, body) = send(&app, post_json("/api/v1/patients", json!({
        "name": "John Roe",
        "age": 40,
        "gender": "Unknown"
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert!(body["message"].as_str().unwrap().contains("gender"));

    let (status, body) = send(&app, post_json("/api/v1/patients", json!({
        "name": "",
        "age": 40,
        "gender": "Male"
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    // age missing entirely
    let (status, body) = send(&app, post_json("/api/v1/patients", json!({
        "name": "John Roe",
        "gender": "Male"
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let (_, body) = send(&app, get("/api/v1/patients")).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_ehr_records() {
    let app = test_app(1);
    let id = register(&app, "Ada Smith").await;
    let uri = format!("/api/v1/patients/{}/ehr", id);

    let (status, body) = send(&app, post_json(&uri, json!({
        "diagnosis": "Hypertension",
        "treatment": "Lifestyle changes",
        "medications": "lisinopril, , amlodipine"
    }))).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["medications"], json!(["lisinopril", "amlodipine"]));
    assert_eq!(body["patient_id"], id.as_str());

    let (status, body) = send(&app, post_json(&uri, json!({ "diagnosis": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, body) = send(&app, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["diagnosis"], "Hypertension");
}

#[tokio::test]
async fn test_monitoring_session_is_persisted() {
    let app = test_app(5);
    let id = register(&app, "Grace Hopper").await;

    let (status, session) = send(&app, post_json(&format!("/api/v1/patients/{}/monitoring", id), json!({}))).await;
    assert_eq!(status, StatusCode::OK, "{}", session);

    let ticks = session["ticks"].as_array().unwrap();
    assert_eq!(ticks.len(), 5);
    assert_eq!(ticks[0]["second"], 1);
    assert_eq!(session["persist_failures"], 0);
    assert_eq!(session["averages"]["tick_count"], 5);

    let mean_heart = ticks.iter()
        .map(|t| t["score"]["heart_risk"].as_f64().unwrap())
        .sum::<f64>() / 5.0;
    let reported = session["averages"]["heart_risk"].as_f64().unwrap();
    assert!((mean_heart - reported).abs() < 1e-9);
    assert!(session["averages"]["stress_level"].is_f64());

    // newest first
    let (status, history) = send(&app, get(&format!("/api/v1/patients/{}/vitals", id))).await;
    assert_eq!(status, StatusCode::OK);
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), 5);
    assert_eq!(history[0]["reading"], ticks[4]["reading"]);
    assert_eq!(history[4]["reading"], ticks[0]["reading"]);

    let (_, limited) = send(&app, get(&format!("/api/v1/patients/{}/vitals?limit=2", id))).await;
    assert_eq!(limited.as_array().unwrap().len(), 2);

    let (status, _) = send(&app, get(&format!("/api/v1/patients/{}/vitals?limit=0", id))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_vitals_history_defaults_to_ten_entries() {
    let app = test_app(12);
    let id = register(&app, "Alan Turing").await;

    let (status, _) = send(&app, post_json(&format!("/api/v1/patients/{}/monitoring", id), json!({}))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, history) = send(&app, get(&format!("/api/v1/patients/{}/vitals", id))).await;
    assert_eq!(history.as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_monitoring_stream_emits_ticks_and_summary() {
    let app = test_app(3);
    let id = register(&app, "Mary Jackson").await;

    let response = app.clone()
        .oneshot(get(&format!("/api/v1/patients/{}/monitoring/stream", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert_eq!(text.matches("event: tick").count(), 3);
    assert_eq!(text.matches("event: summary").count(), 1);

    let (_, history) = send(&app, get(&format!("/api/v1/patients/{}/vitals", id))).await;
    assert_eq!(history.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_score_orders_worst_case_above_mid_range() {
    let app = test_app(1);

    let (status, worst) = send(&app, post_json("/api/v1/score", json!({
        "heart_rate": 140, "spo2": 85, "bp_sys": 180, "bp_dia": 120
    }))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, mid) = send(&app, post_json("/api/v1/score", json!({
        "heart_rate": 100, "spo2": 95, "bp_sys": 130, "bp_dia": 80
    }))).await;

    let worst_heart = worst["heart_risk"].as_f64().unwrap();
    let mid_heart = mid["heart_risk"].as_f64().unwrap();
    assert!(worst_heart > mid_heart);
    assert!((0.0..=1.0).contains(&worst_heart));
    assert!(worst["stress_level"].as_u64().unwrap() <= 2);
}

#[tokio::test]
async fn test_score_rejects_out_of_range_reading() {
    let app = test_app(1);

    let (status, body) = send(&app, post_json("/api/v1/score", json!({
        "heart_rate": 80, "spo2": 140, "bp_sys": 120, "bp_dia": 80
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert!(body["message"].as_str().unwrap().contains("spo2"));
}
