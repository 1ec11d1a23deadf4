#![cfg(feature = "http_api")]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use health_records::{
    DeviceCalibration, ExamResult, ExamSummary, HealthExamRecord, MemoryStore, OverallStatus, Stored, http_api,
};
use serde_json::{Value, json};
use tower::util::ServiceExt;

fn new_router() -> axum::Router {
    let state = http_api::AppState::new(
        Arc::new(MemoryStore::<HealthExamRecord>::new()),
        Arc::new(MemoryStore::<DeviceCalibration>::new()),
    );
    http_api::router(state)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn read_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn exam_lifecycle_via_http_api() {
    let app = new_router();

    let draft = json!({
        "personnel_name": "Ali Demir",
        "department": "Acil",
        "exams": [
            {"category": "general", "date": "2025-01-10", "result": "Uygun"},
            {"category": "chest_xray", "date": "2025-01-11", "result": "Uygun Değil"}
        ]
    });
    let response = app
        .clone()
        .oneshot(json_request("POST", "/exams", draft))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Stored<HealthExamRecord> = read_json(response).await;
    assert_eq!(created.id, 1);
    assert_eq!(created.value.summary.overall_status, OverallStatus::Risky);

    let response = app.clone().oneshot(get_request("/exams/1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: Stored<HealthExamRecord> = read_json(response).await;
    assert_eq!(fetched, created);

    let update = json!({
        "personnel_name": "Ali Demir",
        "exams": [{"category": "general", "date": "2025-01-10", "result": "Şartlı Uygun"}]
    });
    let response = app
        .clone()
        .oneshot(json_request("PUT", "/exams/1", update))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Stored<HealthExamRecord> = read_json(response).await;
    assert_eq!(
        updated.value.summary.overall_result,
        Some(ExamResult::ConditionallyFit)
    );

    let response = app.clone().oneshot(get_request("/exams")).await.unwrap();
    let all: Vec<Stored<HealthExamRecord>> = read_json(response).await;
    assert_eq!(all.len(), 1);

    let response = app.oneshot(get_request("/exams/42")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_exam_set_is_a_bad_request() {
    let app = new_router();
    let response = app
        .oneshot(json_request(
            "POST",
            "/exams",
            json!({"personnel_name": "Ali Demir", "exams": []}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = read_json(response).await;
    assert_eq!(body["error"], "invalid_request");
}

#[tokio::test]
async fn exam_date_without_result_is_rejected_before_storage() {
    let app = new_router();
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/exams",
            json!({
                "personnel_name": "Ali Demir",
                "exams": [
                    {"category": "general", "date": "2025-01-10", "result": "Uygun"},
                    {"category": "audiometry", "date": "2025-05-30"}
                ]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = app.oneshot(get_request("/exams")).await.unwrap();
    let all: Vec<Value> = read_json(response).await;
    assert!(all.is_empty());
}

#[tokio::test]
async fn updating_missing_record_is_not_found() {
    let app = new_router();
    let response = app
        .oneshot(json_request(
            "PUT",
            "/exams/5",
            json!({
                "personnel_name": "Ali Demir",
                "exams": [{"category": "general", "date": "2025-01-10", "result": "Uygun"}]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn summary_preview_does_not_store() {
    let app = new_router();
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/exams/summary",
            json!([{"category": "blood_count", "date": "2024-02-29", "result": "Uygun"}]),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let summary: ExamSummary = read_json(response).await;
    assert_eq!(summary.next_check_date.map(|d| d.to_string()), Some("2025-02-28".to_string()));

    let response = app.oneshot(get_request("/exams")).await.unwrap();
    let all: Vec<Value> = read_json(response).await;
    assert!(all.is_empty());
}

#[tokio::test]
async fn devices_report_status() {
    let app = new_router();
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/devices",
            json!({"device_name": "Ventilatör", "interval_months": 6}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Value = read_json(response).await;
    assert_eq!(created["status"], "Planlandı");

    let response = app
        .oneshot(json_request(
            "POST",
            "/devices",
            json!({"device_name": "Pompa", "interval_months": 0}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn refresh_returns_summary() {
    let app = new_router();
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/exams",
            json!({
                "personnel_name": "Zeynep Ak",
                "exams": [{"category": "general", "date": "2020-01-10", "result": "Uygun Değil"}]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/exams/refresh")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let report: Value = read_json(response).await;
    assert_eq!(report["summary"]["record_count"], 1);
    assert_eq!(report["summary"]["risky_count"], 1);
}
