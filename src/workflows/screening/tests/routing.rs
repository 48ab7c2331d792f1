use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::workflows::screening::{screening_router, JudgmentValue, ScreeningService};

fn build_router() -> (axum::Router, Arc<ScreeningService<ScriptedOracle>>) {
    let oracle = ScriptedOracle::new()
        .with_reply("q-exp", JudgmentValue::Score(7.0))
        .with_reply("q-visa", JudgmentValue::Answer(true));
    let service = build_service(oracle);
    (screening_router(service.clone()), service)
}

fn batch_payload() -> Value {
    json!({
        "questions": [
            {"id": "q-exp", "text": "Relevant experience?", "type": "score", "weight": 2},
            {"id": "q-visa", "text": "EU work permit?", "type": "yesno",
             "is_filter": true, "expected_answer": true}
        ],
        "guidance": "Weigh production systems experience heavily.",
        "candidates": [
            {"name": "Ada Lovelace", "text": "Analytical engines and Rust."},
            {"name": "Grace Hopper", "text": "Compilers, COBOL, leadership."}
        ]
    })
}

fn post(uri: &str, payload: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_vec(payload).expect("serialize payload"),
        ))
        .expect("request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

async fn read_json(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

async fn wait_until_finished(router: &axum::Router, total: u64) {
    for _ in 0..200 {
        let response = router
            .clone()
            .oneshot(get("/api/v1/screening/batch/progress"))
            .await
            .expect("router dispatch");
        let payload = read_json(response).await;
        let processed = payload.get("processed").and_then(Value::as_u64);
        let running = payload.get("running").and_then(Value::as_bool);
        if processed == Some(total) && running == Some(false) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("batch did not finish in time");
}

#[tokio::test]
async fn admitting_a_batch_returns_counts() {
    let (router, _service) = build_router();

    let response = router
        .clone()
        .oneshot(post("/api/v1/screening/batch", &batch_payload()))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let payload = read_json(response).await;
    assert_eq!(payload.get("admitted"), Some(&json!(2)));
    assert_eq!(payload.get("questions"), Some(&json!(2)));
}

#[tokio::test]
async fn invalid_question_sets_are_rejected_with_422() {
    let (router, _service) = build_router();

    let mut payload = batch_payload();
    payload["questions"][1]
        .as_object_mut()
        .expect("question object")
        .remove("expected_answer");

    let response = router
        .clone()
        .oneshot(post("/api/v1/screening/batch", &payload))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json(response).await;
    assert!(body
        .get("error")
        .and_then(Value::as_str)
        .expect("error message")
        .contains("expected answer"));
}

#[tokio::test]
async fn run_processes_the_batch_and_results_reflect_outcomes() {
    let (router, _service) = build_router();

    let response = router
        .clone()
        .oneshot(post("/api/v1/screening/batch", &batch_payload()))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let response = router
        .clone()
        .oneshot(post("/api/v1/screening/batch/run", &json!({})))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    wait_until_finished(&router, 2).await;

    let response = router
        .clone()
        .oneshot(get(
            "/api/v1/screening/results?sort_by=name&direction=asc&status=completed",
        ))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);

    let payload = read_json(response).await;
    let results = payload.as_array().expect("array of views");
    assert_eq!(results.len(), 2);
    assert_eq!(
        results[0].get("name").and_then(Value::as_str),
        Some("Ada Lovelace")
    );
    assert_eq!(results[0].get("status"), Some(&json!("completed")));
    assert_eq!(results[0].get("percentage"), Some(&json!(70.0)));
    assert_eq!(results[0].get("excluded"), Some(&json!(false)));
    assert!(results[0]
        .get("judgments")
        .and_then(|judgments| judgments.get("q-exp"))
        .and_then(|judgment| judgment.get("value"))
        .and_then(Value::as_str)
        .is_some_and(|value| value == "7/10"));
}

#[tokio::test]
async fn results_respect_search_and_score_filters() {
    let (router, _service) = build_router();

    router
        .clone()
        .oneshot(post("/api/v1/screening/batch", &batch_payload()))
        .await
        .expect("router dispatch");
    router
        .clone()
        .oneshot(post("/api/v1/screening/batch/run", &json!({})))
        .await
        .expect("router dispatch");
    wait_until_finished(&router, 2).await;

    let response = router
        .clone()
        .oneshot(get("/api/v1/screening/results?search=grace"))
        .await
        .expect("router dispatch");
    let payload = read_json(response).await;
    let results = payload.as_array().expect("array of views");
    assert_eq!(results.len(), 1);
    assert_eq!(
        results[0].get("name").and_then(Value::as_str),
        Some("Grace Hopper")
    );

    // Both candidates score 70%; the [0, 20) bucket is empty.
    let response = router
        .clone()
        .oneshot(get("/api/v1/screening/results?score_range=0"))
        .await
        .expect("router dispatch");
    let payload = read_json(response).await;
    assert!(payload.as_array().expect("array").is_empty());
}

#[tokio::test]
async fn export_streams_csv_with_attachment_headers() {
    let (router, _service) = build_router();

    router
        .clone()
        .oneshot(post("/api/v1/screening/batch", &batch_payload()))
        .await
        .expect("router dispatch");
    router
        .clone()
        .oneshot(post("/api/v1/screening/batch/run", &json!({})))
        .await
        .expect("router dispatch");
    wait_until_finished(&router, 2).await;

    let response = router
        .clone()
        .oneshot(get("/api/v1/screening/export"))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("content-type")
            .and_then(|value| value.to_str().ok()),
        Some("text/csv")
    );
    assert!(response
        .headers()
        .get("content-disposition")
        .and_then(|value| value.to_str().ok())
        .expect("disposition header")
        .contains("cv_analysis_results.csv"));

    let body = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    let csv = String::from_utf8(body.to_vec()).expect("utf-8 csv");
    assert!(csv.starts_with("Candidate Name,Total Score,Percentage,Excluded"));
    assert!(csv.contains("Ada Lovelace,14/20,70%,No"));
}

#[tokio::test]
async fn export_before_any_completion_is_header_only() {
    let (router, _service) = build_router();

    router
        .clone()
        .oneshot(post("/api/v1/screening/batch", &batch_payload()))
        .await
        .expect("router dispatch");

    let response = router
        .clone()
        .oneshot(get("/api/v1/screening/export"))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    let csv = String::from_utf8(body.to_vec()).expect("utf-8 csv");
    assert_eq!(csv.lines().count(), 1, "header row only");
}
