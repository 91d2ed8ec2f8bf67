mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::json;

use common::{get_request, json_request, send, token_for};

#[tokio::test]
async fn health_reports_ok() {
    let (status, body) = send(get_request("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn plans_use_the_success_envelope() {
    let (status, body) = send(get_request("/api/payment/plans", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let plans = body["data"].as_array().unwrap();
    assert_eq!(plans.len(), 3);
    assert_eq!(plans[0]["plan"], "basic");
    assert_eq!(plans[0]["amount"], 999);
    assert_eq!(plans[2]["duration_days"], 365);
}

#[tokio::test]
async fn openapi_document_lists_job_paths() {
    let (status, body) = send(get_request("/api/docs/openapi.json", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/jobs"].is_object());
    assert!(body["paths"]["/api/jobs/{id}"].is_object());
    assert!(body["components"]["schemas"]["JobResponse"].is_object());
}

#[tokio::test]
async fn register_validates_before_anything_else() {
    let payload = json!({
        "name": "Ada",
        "email": "not-an-email",
        "password": "longenough",
        "role": "seeker"
    });
    let (status, body) = send(json_request("POST", "/api/auth/register", None, &payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn admin_role_cannot_be_self_assigned() {
    let payload = json!({
        "name": "Mallory",
        "email": "mallory@example.com",
        "password": "longenough",
        "role": "admin"
    });
    let (status, _) = send(json_request("POST", "/api/auth/register", None, &payload)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unknown_role_is_a_bad_request() {
    let payload = json!({
        "name": "Eve",
        "email": "eve@example.com",
        "password": "longenough",
        "role": "wizard"
    });
    let (status, _) = send(json_request("POST", "/api/auth/register", None, &payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn short_otp_is_rejected() {
    let payload = json!({ "email": "ada@example.com", "otp": "123" });
    let (status, _) = send(json_request("POST", "/api/auth/verify-otp", None, &payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn job_payload_is_validated() {
    let token = token_for("employer");
    let payload = json!({
        "title": "",
        "description": "Build things",
        "location": "Remote"
    });
    let (status, _) = send(json_request("POST", "/api/jobs", Some(&token), &payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let payload = json!({
        "title": "Rust Dev",
        "description": "Build things",
        "location": "Remote",
        "salary_min": 90000,
        "salary_max": 50000
    });
    let (status, _) = send(json_request("POST", "/api/jobs", Some(&token), &payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let token = token_for("employer");
    let req = Request::builder()
        .method("POST")
        .uri("/api/companies")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from("{not json"))
        .unwrap();
    let resp = tower::ServiceExt::oneshot(common::app(), req).await.unwrap();
    assert!(resp.status().is_client_error());
}

#[tokio::test]
async fn unknown_plan_is_a_bad_request() {
    let token = token_for("seeker");
    let payload = json!({ "plan": "platinum" });
    let (status, body) =
        send(json_request("POST", "/api/payment/create-intent", Some(&token), &payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn unconfigured_payment_provider_is_unavailable() {
    let token = token_for("seeker");
    let payload = json!({ "plan": "basic" });
    let (status, _) =
        send(json_request("POST", "/api/payment/create-intent", Some(&token), &payload)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn webhook_without_secret_is_unavailable() {
    let req = Request::builder()
        .method("POST")
        .uri("/api/payment/webhook")
        .header("stripe-signature", "t=1,v1=00")
        .body(Body::from(r#"{"type":"payment_intent.succeeded"}"#))
        .unwrap();
    let (status, _) = send(req).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn external_search_needs_an_api_key() {
    let (status, body) = send(get_request("/api/jobs/external?keywords=rust", None)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn confirm_rejects_intent_ids_that_are_not_ids() {
    let token = token_for("seeker");
    let payload = json!({ "payment_intent_id": "pi_1/cancel" });
    let (status, body) =
        send(json_request("POST", "/api/payment/confirm", Some(&token), &payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let payload = json!({ "payment_intent_id": "pi_3NxYz0AbCdEf" });
    let (status, _) =
        send(json_request("POST", "/api/payment/confirm", Some(&token), &payload)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn student_template_is_an_xlsx_download() {
    let token = token_for("employer");
    let resp = tower::ServiceExt::oneshot(
        common::app(),
        get_request("/api/students/template", Some(&token)),
    )
    .await
    .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers()["content-type"].to_str().unwrap();
    assert!(content_type.contains("spreadsheetml"));
}
