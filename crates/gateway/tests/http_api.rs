//! HTTP contract of the chat API, exercised in-process with `oneshot`.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use common::*;
use serde_json::{json, Value};
use tower::ServiceExt;
use ts_gateway::api;
use ts_sessions::SessionStore;
use ts_tasks::TASKS_READY_REPLY;

fn app(h: &Harness) -> Router {
    api::router().with_state(h.state.clone())
}

fn post_chat(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /chat
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn missing_message_is_rejected() {
    let h = harness(Vec::new());

    for body in [r#"{}"#, r#"{"message": ""}"#, r#"{"message": "   "}"#] {
        let (status, value) = send(app(&h), post_chat(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(value["error"], "message is required");
    }
    assert!(h.llm.requests().is_empty());
    assert_eq!(h.state.sessions.len(), 0);
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let h = harness(Vec::new());
    let (status, value) = send(app(&h), post_chat("{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(value["error"].is_string());
}

#[tokio::test]
async fn new_conversation_gets_a_session_id() {
    let h = harness(vec![text("What is your website address?")]);

    let (status, value) = send(
        app(&h),
        post_chat(r#"{"message": "I need help with my SEO"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let session_id = value["sessionId"].as_str().expect("sessionId");
    assert!(!session_id.is_empty());
    assert_eq!(value["tasks"], json!([]));
    assert_eq!(value["reply"], "What is your website address?");
    assert!(h.state.sessions.get(session_id).is_some());
}

#[tokio::test]
async fn tasks_use_camel_case_fields() {
    let h = harness(vec![text(THREE_TASKS_JSON)]);

    let (status, value) = send(
        app(&h),
        post_chat(r#"{"message": "Give me my tasks please", "sessionId": "http-tasks"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["sessionId"], "http-tasks");
    assert_eq!(value["reply"], TASKS_READY_REPLY);
    let tasks = value["tasks"].as_array().expect("tasks array");
    assert_eq!(tasks.len(), 3);
    for task in tasks {
        assert!(task["title"].is_string());
        assert!(task["description"].is_string());
        assert!(task["timeEstimate"].is_string());
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET / DELETE /chat/:session_id
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn unknown_session_is_not_found() {
    let h = harness(Vec::new());
    let (status, value) = send(app(&h), empty(Method::GET, "/chat/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(value["error"].as_str().unwrap().contains("nope"));
}

#[tokio::test]
async fn snapshot_reports_progress() {
    let h = harness(vec![text("What is your website address?")]);
    send(
        app(&h),
        post_chat(r#"{"message": "I need help with my SEO", "sessionId": "snap"}"#),
    )
    .await;

    let (status, value) = send(app(&h), empty(Method::GET, "/chat/snap")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["sessionId"], "snap");
    assert_eq!(value["domain"], "website");
    assert_eq!(value["transcriptLen"], 2);
    assert!(value["lastTaskSet"].is_null());
}

#[tokio::test]
async fn delete_is_idempotent() {
    let h = harness(vec![text("What is your website address?")]);
    send(
        app(&h),
        post_chat(r#"{"message": "I need help with my SEO", "sessionId": "gone"}"#),
    )
    .await;
    assert!(h.state.sessions.get("gone").is_some());

    for _ in 0..2 {
        let (status, value) = send(app(&h), empty(Method::DELETE, "/chat/gone")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value, json!({ "success": true }));
    }
    assert!(h.state.sessions.get("gone").is_none());
}

#[tokio::test]
async fn health_reports_session_count() {
    let h = harness(vec![text("What is your website address?")]);
    send(
        app(&h),
        post_chat(r#"{"message": "I need help with my SEO", "sessionId": "h1"}"#),
    )
    .await;

    let (status, value) = send(app(&h), empty(Method::GET, "/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["status"], "ok");
    assert_eq!(value["sessions"], 1);
}
