//! Integration tests for the HTTP API.
//!
//! These tests drive the router in-process and check both the response
//! envelopes and what ends up in the store file.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use parking_lot::RwLock;
use serde_json::{Value, json};
use tower::ServiceExt;

use reasongraph_common::{Format, OpenRouterClient, ProjectStore, decode_auto};
use reasongraph_server::{AppState, SharedStore, create_router};

/// Helper to create an in-memory store and its router.
fn create_app() -> (SharedStore, Router) {
    let store = Arc::new(RwLock::new(ProjectStore::in_memory()));
    let router = create_router(AppState::new(store.clone()));
    (store, router)
}

/// Helper to send a request and decode the JSON body.
async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::delete(uri).body(Body::empty()).unwrap()
}

fn with_json(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Helper to create a project through the API and return its id.
async fn create_project(router: &Router, name: &str) -> String {
    let (status, body) = send(
        router,
        with_json("POST", "/api/projects", json!({ "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["id"].as_str().unwrap().to_string()
}

/// Helper to add a node through the API.
async fn add_node(router: &Router, project: &str, node: Value) -> (StatusCode, Value) {
    send(
        router,
        with_json("POST", &format!("/api/projects/{}/nodes", project), node),
    )
    .await
}

#[tokio::test]
async fn test_health() {
    let (_, router) = create_app();

    let (status, body) = send(&router, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_project_lifecycle() {
    let (store, router) = create_app();

    let (status, body) = send(&router, get("/api/projects")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], json!([]));

    let id = create_project(&router, "Climate").await;
    assert_eq!(store.read().list().len(), 1);

    let (status, body) = send(&router, get(&format!("/api/projects/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Climate");
    assert_eq!(body["data"]["settings"]["model"], "openai/gpt-5");

    let (status, body) = send(
        &router,
        with_json(
            "PUT",
            &format!("/api/projects/{}", id),
            json!({ "description": "Sea level", "settings": { "temperature": 0.2 } }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Climate");
    assert_eq!(body["data"]["description"], "Sea level");
    assert_eq!(body["data"]["settings"]["temperature"], 0.2);
    assert_eq!(body["data"]["settings"]["model"], "openai/gpt-5");

    let (status, body) = send(&router, delete(&format!("/api/projects/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Project deleted successfully");
    assert!(store.read().list().is_empty());

    let (status, body) = send(&router, delete(&format!("/api/projects/{}", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Project not found");
}

#[tokio::test]
async fn test_create_project_requires_name() {
    let (_, router) = create_app();

    let (status, body) = send(
        &router,
        with_json("POST", "/api/projects", json!({ "name": "  " })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Project name is required");
}

#[tokio::test]
async fn test_node_lifecycle() {
    let (store, router) = create_app();
    let project = create_project(&router, "Climate").await;

    let (status, body) = add_node(
        &router,
        &project,
        json!({
            "id": "q1",
            "type": "question",
            "content": "Why is the sea rising?",
            "position": { "x": 10.0, "y": 20.0 }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["nodes"][0]["id"], "q1");
    assert_eq!(body["data"]["nodes"][0]["metadata"]["aiGenerated"], false);

    let (status, _) = add_node(
        &router,
        &project,
        json!({ "id": "r1", "type": "reasoning", "connections": ["q1"] }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &router,
        with_json(
            "PUT",
            &format!("/api/projects/{}/nodes/q1", project),
            json!({ "content": "Why are seas rising?", "connections": ["r1"] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["nodes"][0]["content"], "Why are seas rising?");
    assert_eq!(body["data"]["nodes"][0]["connections"], json!(["r1"]));

    // Deleting a node removes every link to it.
    let (status, body) = send(
        &router,
        delete(&format!("/api/projects/{}/nodes/r1", project)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["nodes"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["data"]["nodes"][0]["connections"], json!([]));

    let stored = store.read().get(&project).cloned().unwrap();
    assert_eq!(stored.nodes.len(), 1);
    assert_eq!(stored.nodes[0].content, "Why are seas rising?");
}

#[tokio::test]
async fn test_add_node_errors() {
    let (_, router) = create_app();
    let project = create_project(&router, "Climate").await;

    let (status, body) = add_node(&router, &project, json!({ "content": "untyped" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Node type is required");

    let (status, body) = add_node(&router, "missing", json!({ "type": "branch" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Project not found");

    let (status, _) = add_node(&router, &project, json!({ "id": "a", "type": "branch" })).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = add_node(&router, &project, json!({ "id": "a", "type": "branch" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_missing_node() {
    let (_, router) = create_app();
    let project = create_project(&router, "Climate").await;

    let (status, body) = send(
        &router,
        with_json(
            "PUT",
            &format!("/api/projects/{}/nodes/nope", project),
            json!({ "content": "x" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Node not found");
}

#[tokio::test]
async fn test_export_endpoints() {
    let (_, router) = create_app();
    let project = create_project(&router, "Climate").await;
    add_node(
        &router,
        &project,
        json!({ "type": "hypothesis", "content": "Thermal expansion dominates" }),
    )
    .await;

    let response = router
        .clone()
        .oneshot(get(&format!("/api/export/json/{}", project)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(disposition, "attachment; filename=\"Climate.json\"");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let exported: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(exported["name"], "Climate");

    let response = router
        .clone()
        .oneshot(get(&format!("/api/export/markdown/{}", project)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers().get(header::CONTENT_TYPE).unwrap();
    assert!(content_type.to_str().unwrap().starts_with("text/markdown"));
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let markdown = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(markdown.starts_with("# Climate"));
    assert!(markdown.contains("Thermal expansion dominates"));

    let (status, body) = send(&router, get("/api/export/markdown/missing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Project not found");
}

#[tokio::test]
async fn test_reason_validation() {
    let (_, router) = create_app();
    let project = create_project(&router, "Climate").await;
    add_node(&router, &project, json!({ "id": "q1", "type": "question" })).await;

    let (status, body) = send(
        &router,
        with_json("POST", "/api/ai/reason", json!({ "nodeId": "q1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "nodeId and projectId are required");

    let (status, body) = send(
        &router,
        with_json(
            "POST",
            "/api/ai/reason",
            json!({ "nodeId": "q1", "projectId": project, "aiSettings": {} }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "AI API key is required");

    let (status, body) = send(
        &router,
        with_json(
            "POST",
            "/api/ai/reason",
            json!({ "nodeId": "q1", "projectId": "missing", "aiSettings": { "apiKey": "k" } }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Project not found");

    let (status, body) = send(
        &router,
        with_json(
            "POST",
            "/api/ai/reason",
            json!({ "nodeId": "zz", "projectId": project, "aiSettings": { "apiKey": "k" } }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Node not found");
}

#[tokio::test]
async fn test_reason_upstream_failure() {
    let store = Arc::new(RwLock::new(ProjectStore::in_memory()));
    // Nothing listens on the discard port.
    let client = OpenRouterClient::new("http://127.0.0.1:9/api/v1/chat/completions");
    let router = create_router(AppState::with_client(store.clone(), client));
    let project = create_project(&router, "Climate").await;
    add_node(&router, &project, json!({ "id": "q1", "type": "question" })).await;

    let (status, body) = send(
        &router,
        with_json(
            "POST",
            "/api/ai/reason",
            json!({ "nodeId": "q1", "projectId": project, "aiSettings": { "apiKey": "k" } }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to generate AI reasoning");
    assert!(body["message"].is_string());
    assert_eq!(store.read().get(&project).unwrap().nodes.len(), 1);
}

#[tokio::test]
async fn test_mutations_reach_store_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("projects.cbor");
    let store = ProjectStore::open(&path, Format::Cbor).unwrap();
    let router = create_router(AppState::new(Arc::new(RwLock::new(store))));

    let project = create_project(&router, "Persisted").await;
    add_node(&router, &project, json!({ "id": "c1", "type": "conclusion" })).await;

    let data = std::fs::read(&path).unwrap();
    let projects: Vec<reasongraph_common::ReasoningProject> = decode_auto(&data).unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].name, "Persisted");
    assert_eq!(projects[0].nodes[0].id, "c1");

    // A fresh store sees the same data.
    let reopened = ProjectStore::open(&path, Format::Cbor).unwrap();
    assert_eq!(reopened.list()[0].nodes.len(), 1);
}
