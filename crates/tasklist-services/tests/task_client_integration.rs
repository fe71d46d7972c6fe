//! Integration tests for TaskClient using wiremock.
//!
//! These tests verify the wire contract against a mock task store.

use std::time::Duration;

use tasklist_auth::SessionGate;
use tasklist_services::{TaskApiError, TaskClient, TaskCreateRequest, TaskUpdateRequest};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Helper to create a task as the store returns it
fn store_task(id: &str, title: &str, completed: bool) -> serde_json::Value {
    serde_json::json!({
        "_id": id,
        "title": title,
        "completed": completed,
        "createdAt": "2026-01-30T12:00:00Z",
        "updatedAt": "2026-01-30T12:00:00Z"
    })
}

fn client_for(server: &MockServer, gate: SessionGate) -> TaskClient {
    TaskClient::new(&server.uri(), gate, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_list_tasks_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/todos"))
        .and(header("Authorization", "Bearer test-token"))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            store_task("1", "First task", false),
            store_task("2", "Second task", true),
        ])))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, SessionGate::with_token("test-token"));
    let tasks = client.list_tasks().await.unwrap();

    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].id, "1");
    assert_eq!(tasks[0].title, "First task");
    assert!(!tasks[0].completed);
    assert_eq!(tasks[1].id, "2");
    assert!(tasks[1].completed);
}

#[tokio::test]
async fn test_list_tasks_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/todos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, SessionGate::with_token("t"));
    assert!(client.list_tasks().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_request_without_token_is_still_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/todos"))
        .respond_with(|req: &Request| {
            if req.headers.contains_key("authorization") {
                ResponseTemplate::new(200).set_body_json(serde_json::json!([]))
            } else {
                ResponseTemplate::new(401).set_body_json(serde_json::json!({
                    "message": "No token, authorization denied"
                }))
            }
        })
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, SessionGate::new());
    let err = client.list_tasks().await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.remote_message(), Some("No token, authorization denied"));
}

#[tokio::test]
async fn test_create_task_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/todos"))
        .and(body_json(serde_json::json!({ "title": "New task" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(store_task("new-id", "New task", false)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, SessionGate::with_token("t"));
    let task = client
        .create_task(TaskCreateRequest {
            title: "New task".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(task.id, "new-id");
    assert_eq!(task.title, "New task");
    assert!(!task.completed);
}

#[tokio::test]
async fn test_update_task_sends_partial_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/todos/abc123"))
        .and(body_json(serde_json::json!({ "completed": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(store_task("abc123", "Task", true)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, SessionGate::with_token("t"));
    let task = client
        .update_task("abc123", TaskUpdateRequest::completed(true))
        .await
        .unwrap();

    assert_eq!(task.id, "abc123");
    assert!(task.completed);
}

#[tokio::test]
async fn test_update_task_not_found_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/todos/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "message": "Todo not found"
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, SessionGate::with_token("t"));
    let err = client
        .update_task("missing", TaskUpdateRequest::title("x"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        TaskApiError::Status {
            status: 404,
            message: Some("Todo not found".to_string())
        }
    );
}

#[tokio::test]
async fn test_delete_task_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/todos/abc123"))
        .and(header("Authorization", "Bearer t"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "Todo deleted"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, SessionGate::with_token("t"));
    assert!(client.delete_task("abc123").await.is_ok());
}

#[tokio::test]
async fn test_malformed_response_is_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/todos"))
        .respond_with(ResponseTemplate::new(201).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, SessionGate::with_token("t"));
    let err = client
        .create_task(TaskCreateRequest {
            title: "x".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, TaskApiError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_client_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/todos"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([]))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let client = TaskClient::new(
        &mock_server.uri(),
        SessionGate::with_token("t"),
        Duration::from_millis(100),
    )
    .unwrap();

    let err = client.list_tasks().await.unwrap_err();
    assert_eq!(err, TaskApiError::Timeout);
}

#[tokio::test]
async fn test_no_retry_on_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/todos"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, SessionGate::with_token("t"));
    let err = client.list_tasks().await.unwrap_err();

    assert_eq!(
        err,
        TaskApiError::Status {
            status: 500,
            message: None
        }
    );
}
