use super::common::*;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

use crate::applications::domain::{ApplicationStatus, StatusDecision};
use crate::applications::router::{dashboard_view, submit_handler, TREND_DAYS};
use crate::applications::store::TransitionPolicy;
use crate::applications::validation::{FormInput, EMPLOYMENT_REQUIRED, PURPOSE_REQUIRED};

fn post_json(uri: &str, body: serde_json::Value) -> Request<axum::body::Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            serde_json::to_vec(&body).expect("serialize body"),
        ))
        .expect("request builds")
}

fn get(uri: &str) -> Request<axum::body::Body> {
    Request::get(uri)
        .body(axum::body::Body::empty())
        .expect("request builds")
}

#[tokio::test]
async fn submit_route_creates_pending_application() {
    let (store, _) = build_store();
    let router = router_with_store(store);

    let body = serde_json::to_value(submission()).expect("submission json");
    let response = router
        .oneshot(post_json("/api/v1/applications", body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["status"], "pending");
    assert!(payload.get("id").is_some());
    assert!(payload.get("createdAt").is_some());
}

#[tokio::test]
async fn submit_handler_rejects_invalid_forms_without_touching_the_store() {
    let (store, _) = build_store();
    let store = Arc::new(store);
    let mut invalid = submission();
    invalid.email = "nope".to_string();
    invalid.annual_income = 0.0;

    let form = FormInput::from(invalid);
    let response = submit_handler(State(store.clone()), Ok(axum::Json(form))).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["errors"]["email"], "Invalid email address");
    assert_eq!(payload["errors"]["annualIncome"], "Annual income must be positive");
    assert!(store.is_empty());
}

#[tokio::test]
async fn submit_route_reports_empty_categories_per_field() {
    let (store, _) = build_store();
    let store = Arc::new(store);
    let router = crate::applications::router::application_router(store.clone());

    let mut body = serde_json::to_value(submission()).expect("submission json");
    body["purpose"] = json!("");
    body["employmentStatus"] = json!("");
    let response = router
        .oneshot(post_json("/api/v1/applications", body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["errors"]["purpose"], PURPOSE_REQUIRED);
    assert_eq!(payload["errors"]["employmentStatus"], EMPLOYMENT_REQUIRED);
    assert!(store.is_empty());
}

#[tokio::test]
async fn submit_route_reports_missing_fields_and_unknown_categories() {
    let (store, _) = build_store();
    let router = router_with_store(store);

    let body = json!({
        "fullName": "Casey Nguyen",
        "email": "casey@example.com",
        "phone": "5155550123",
        "purpose": "yacht",
        "employmentStatus": "Full-time",
        "annualIncome": 52000.0,
    });
    let response = router
        .oneshot(post_json("/api/v1/applications", body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    let errors = payload["errors"].as_object().expect("errors map");
    assert_eq!(errors.len(), 2);
    assert_eq!(errors["loanAmount"], "Loan amount must be positive");
    assert!(errors.contains_key("purpose"));
}

#[tokio::test]
async fn submit_route_answers_malformed_json_with_a_json_error() {
    let (store, _) = build_store();
    let router = router_with_store(store);

    let request = Request::post("/api/v1/applications")
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from("{not json"))
        .expect("request builds");
    let response = router.oneshot(request).await.expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert!(payload["error"].is_string());
}

#[tokio::test]
async fn list_route_returns_insertion_order() {
    let seeded = vec![
        application("first", 100.0, ApplicationStatus::Pending, timestamp(2025, 10, 1, 9)),
        application("second", 200.0, ApplicationStatus::Approved, timestamp(2025, 10, 2, 9)),
    ];
    let (store, _) = build_store_with(&seeded, TransitionPolicy::Reject);
    let router = router_with_store(store);

    let response = router
        .oneshot(get("/api/v1/applications"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload[0]["id"], "first");
    assert_eq!(payload[1]["id"], "second");
}

#[tokio::test]
async fn application_route_returns_not_found_for_unknown_ids() {
    let (store, _) = build_store();
    let router = router_with_store(store);

    let response = router
        .oneshot(get("/api/v1/applications/missing"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn status_route_applies_decisions() {
    let seeded = vec![application(
        "app-1",
        1500.0,
        ApplicationStatus::Pending,
        timestamp(2025, 10, 1, 9),
    )];
    let (store, _) = build_store_with(&seeded, TransitionPolicy::Reject);
    let router = router_with_store(store);

    let response = router
        .oneshot(post_json(
            "/api/v1/applications/app-1/status",
            json!({ "status": "approved" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["application"]["status"], "approved");
    assert_eq!(payload["previousStatus"], "pending");
    assert_eq!(payload["changed"], true);
}

#[tokio::test]
async fn status_route_maps_store_errors() {
    let seeded = vec![application(
        "app-1",
        1500.0,
        ApplicationStatus::Rejected,
        timestamp(2025, 10, 1, 9),
    )];
    let (store, _) = build_store_with(&seeded, TransitionPolicy::Reject);
    let router = router_with_store(store);

    let conflict = router
        .clone()
        .oneshot(post_json(
            "/api/v1/applications/app-1/status",
            json!({ "status": "approved" }),
        ))
        .await
        .expect("route executes");
    assert_eq!(conflict.status(), StatusCode::CONFLICT);

    let missing = router
        .oneshot(post_json(
            "/api/v1/applications/ghost/status",
            json!({ "status": "rejected" }),
        ))
        .await
        .expect("route executes");
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn status_route_refuses_pending_as_a_target() {
    let seeded = vec![application(
        "app-1",
        1500.0,
        ApplicationStatus::Approved,
        timestamp(2025, 10, 1, 9),
    )];
    let (store, _) = build_store_with(&seeded, TransitionPolicy::Allow);
    let router = router_with_store(store);

    let response = router
        .oneshot(post_json(
            "/api/v1/applications/app-1/status",
            json!({ "status": "pending" }),
        ))
        .await
        .expect("route executes");

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn dashboard_route_reports_stats_and_series() {
    let (store, _) = build_store();
    let router = router_with_store(store);

    let response = router
        .oneshot(get("/api/v1/dashboard"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["stats"]["totalApplications"], 0);
    assert_eq!(payload["hasStatusData"], false);
    assert_eq!(
        payload["trend"].as_array().map(Vec::len),
        Some(TREND_DAYS as usize)
    );
}

#[tokio::test]
async fn dashboard_view_uses_one_consistent_snapshot() {
    let (store, _) = build_store();
    let first = store.submit(submission()).await;
    store.submit(submission()).await;
    store
        .update_status(&first.id, StatusDecision::Rejected)
        .expect("known application");

    let today = first.created_at.date_naive();
    let view = dashboard_view(&store, today);

    assert_eq!(view.stats.total_applications, 2);
    assert_eq!(view.rejection_rate, 50.0);
    assert!(view.has_status_data);
    assert_eq!(view.trend.last().map(|point| point.count), Some(2));
    assert_eq!(view.purposes.len(), 1);
    assert_eq!(view.purposes[0].count, 2);
}
