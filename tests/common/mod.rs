//! Shared test infrastructure for todos integration tests.
//!
//! `TestEnv` wraps an on-disk store; `TestApp` drives the HTTP router
//! in-process; `spawn_server` runs it on a real local port.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use std::net::SocketAddr;
use tempfile::TempDir;
use todos::api::{self, AppState};
use todos::{ITEMS_PER_PAGE, ListFilter, NewTask, Status, Store, StoreError, StoreHandle, Task, TaskPage};
use tower::ServiceExt;

/// Test environment with automatic cleanup.
pub struct TestEnv {
    pub temp_dir: TempDir,
    pub store: Store,
}

impl TestEnv {
    /// Create a new test environment with a fresh store file.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = Store::open(&temp_dir.path().join("todos.db")).expect("Failed to open store");
        Self { temp_dir, store }
    }

    /// Create a pending task.
    pub fn create_task(&mut self, title: &str) -> Task {
        self.store
            .create(NewTask::new(title, "details"))
            .expect("Failed to create task")
    }

    /// Create a task with the given status.
    pub fn create_task_with_status(&mut self, title: &str, status: Status) -> Task {
        self.store
            .create(NewTask::new(title, "details").status(status))
            .expect("Failed to create task")
    }

    /// First page of an unfiltered list.
    pub fn first_page(&self) -> TaskPage {
        self.store
            .list(ListFilter::new(), 1, ITEMS_PER_PAGE)
            .expect("Failed to list tasks")
    }

    /// Page `page` of tasks with `status`.
    pub fn page_with_status(&self, status: Status, page: u32) -> TaskPage {
        self.store
            .list(ListFilter::new().status(status), page, ITEMS_PER_PAGE)
            .expect("Failed to list tasks")
    }

    /// Assert that a lookup of `id` fails with NotFound.
    pub fn assert_not_found(&self, id: &str) {
        let err = self.store.get(id).expect_err("Expected lookup to fail");
        assert!(
            matches!(StoreError::find(&err), Some(StoreError::NotFound(_))),
            "Expected NotFound for {}, got: {}",
            id,
            err
        );
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// The HTTP router backed by an in-memory store.
pub struct TestApp {
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Store::open_in_memory().expect("Failed to open store");
        let handle = StoreHandle::spawn(store).expect("Failed to spawn store worker");
        Self {
            router: api::router(AppState::new(handle)),
        }
    }

    /// Send a request and return the status with the decoded body.
    /// Non-JSON bodies come back as a JSON string.
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        self.send_request(request).await
    }

    pub async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router failed");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();

        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, None).await
    }

    /// Create a task through the API and return its JSON.
    pub async fn create(&self, title: &str, description: &str, status: &str) -> Value {
        let (code, body) = self
            .post(
                "/api/todos/create",
                serde_json::json!({ "title": title, "description": description, "status": status }),
            )
            .await;
        assert_eq!(code, StatusCode::CREATED, "create failed: {}", body);
        body
    }

    /// Ids of the tasks on a list page.
    pub async fn listed_ids(&self, uri: &str) -> Vec<String> {
        let (code, body) = self.get(uri).await;
        assert_eq!(code, StatusCode::OK, "list failed: {}", body);
        body["todos"]
            .as_array()
            .expect("todos array")
            .iter()
            .map(|t| t["id"].as_str().expect("id").to_string())
            .collect()
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Serve the API on an ephemeral local port and return its address.
pub async fn spawn_server() -> SocketAddr {
    let store = Store::open_in_memory().expect("Failed to open store");
    let handle = StoreHandle::spawn(store).expect("Failed to spawn store worker");
    let router = api::router(AppState::new(handle));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to read address");

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Server failed");
    });

    addr
}
