/// Deployment webhook integration tests
/// Drives POST /update_server through the router with a recording sync
mod common;

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
};
use common::{body_json, webhook_request, TestApp, DEPLOY_REF};
use roster_server::services::{webhook::SIGNATURE_HEADER, PullOutcome};
use tower::util::ServiceExt;

fn push_body(git_ref: &str) -> String {
    serde_json::json!({ "ref": git_ref, "after": "0d1a26e6" }).to_string()
}

async fn assert_rejected(response: axum::response::Response) {
    assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn test_push_to_deploy_branch_updates() {
    let app = TestApp::new().await;
    let body = push_body(DEPLOY_REF);

    let response = app
        .router
        .clone()
        .oneshot(webhook_request("push", &body).body(Body::from(body)).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(
        json["msg"],
        "Updated server to commit 0d1a26e67d8f5eaf1f6ba5c57fc3c7d91ac0fd1c"
    );
    assert_eq!(json["commit"], "0d1a26e67d8f5eaf1f6ba5c57fc3c7d91ac0fd1c");
    assert_eq!(app.sync.calls(), 1);
}

#[tokio::test]
async fn test_missing_signature_is_rejected_without_sync() {
    let app = TestApp::new().await;
    let body = push_body(DEPLOY_REF);

    let mut request = webhook_request("push", &body).body(Body::from(body)).unwrap();
    request.headers_mut().remove(SIGNATURE_HEADER);

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_rejected(response).await;
    assert_eq!(app.sync.calls(), 0);
}

#[tokio::test]
async fn test_bad_signature_is_rejected() {
    let app = TestApp::new().await;
    let body = push_body(DEPLOY_REF);

    // Signed over a different body
    let request = webhook_request("push", "{}")
        .body(Body::from(body))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_rejected(response).await;
    assert_eq!(app.sync.calls(), 0);
}

#[tokio::test]
async fn test_foreign_user_agent_is_rejected() {
    let app = TestApp::new().await;
    let body = push_body(DEPLOY_REF);

    let mut request = webhook_request("push", &body).body(Body::from(body)).unwrap();
    request
        .headers_mut()
        .insert(header::USER_AGENT, HeaderValue::from_static("curl/8.4.0"));

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_rejected(response).await;
    assert_eq!(app.sync.calls(), 0);
}

#[tokio::test]
async fn test_ping_is_acknowledged_without_sync() {
    let app = TestApp::new().await;
    let body = r#"{"zen":"Design for failure.","hook_id":1}"#.to_string();

    let response = app
        .router
        .clone()
        .oneshot(webhook_request("ping", &body).body(Body::from(body)).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["msg"], "Hi!");
    assert_eq!(app.sync.calls(), 0);
}

#[tokio::test]
async fn test_other_branch_is_acknowledged_without_sync() {
    let app = TestApp::new().await;
    let body = push_body("refs/heads/feature/x");

    let response = app
        .router
        .clone()
        .oneshot(webhook_request("push", &body).body(Body::from(body)).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["msg"],
        "Not the deployment branch; ignoring"
    );
    assert_eq!(app.sync.calls(), 0);
}

#[tokio::test]
async fn test_unchanged_pull_reports_nothing_to_do() {
    let app = TestApp::with_outcome(PullOutcome::Unchanged).await;
    let body = push_body(DEPLOY_REF);

    let response = app
        .router
        .clone()
        .oneshot(webhook_request("push", &body).body(Body::from(body)).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["msg"], "Didn't pull any information from remote!");
    assert!(json.get("commit").is_none());
    assert_eq!(app.sync.calls(), 1);
}
