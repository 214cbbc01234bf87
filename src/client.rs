//! HTTP client for the task API.

use crate::api::dto::{CreateTaskRequest, ListResponse, MessageResponse};
use crate::types::{Status, Task, TaskPatch};
use crate::ui::{Effect, Event, ViewState};
use eyre::{Context, Result};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default base URL of a locally running server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// A non-success answer from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    pub status: u16,
    pub message: String,
}

impl std::fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (HTTP {})", self.message, self.status)
    }
}

impl std::error::Error for ApiFailure {}

impl ApiFailure {
    /// Find the `ApiFailure` carried by a report, if any.
    pub fn find(report: &eyre::Report) -> Option<&ApiFailure> {
        report.chain().find_map(|cause| cause.downcast_ref::<ApiFailure>())
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

/// Client for communicating with the task server.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// Create a client for the server at `base_url` (e.g. `http://localhost:5000`).
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/todos/{}", self.base, path)
    }

    /// Fetch one page of tasks, optionally filtered by status.
    pub async fn list(&self, status: Option<Status>, page: u32) -> Result<ListResponse> {
        let mut query = vec![("page", page.to_string())];
        if let Some(status) = status {
            query.push(("status", status.to_string()));
        }

        let response = self
            .http
            .get(self.url("all"))
            .query(&query)
            .send()
            .await
            .context("Failed to fetch tasks")?;
        decode(response).await
    }

    /// Get a task by ID.
    pub async fn get(&self, id: &str) -> Result<Task> {
        let response = self
            .http
            .get(self.url(id))
            .send()
            .await
            .context("Failed to fetch task")?;
        decode(response).await
    }

    /// Create a new task.
    pub async fn create(&self, title: &str, description: &str, status: Status) -> Result<Task> {
        let body = CreateTaskRequest {
            title: Some(title.to_string()),
            description: Some(description.to_string()),
            status: Some(status),
        };

        let response = self
            .http
            .post(self.url("create"))
            .json(&body)
            .send()
            .await
            .context("Failed to create task")?;
        decode(response).await
    }

    /// Apply a partial update.
    pub async fn update(&self, id: &str, patch: &TaskPatch) -> Result<Task> {
        let response = self
            .http
            .put(self.url(&format!("update/{}", id)))
            .json(patch)
            .send()
            .await
            .context("Failed to update task")?;
        decode(response).await
    }

    /// Delete a task. Returns the server's confirmation message.
    pub async fn delete(&self, id: &str) -> Result<String> {
        let response = self
            .http
            .delete(self.url(&format!("delete/{}", id)))
            .send()
            .await
            .context("Failed to delete task")?;
        let body: MessageResponse = decode(response).await?;
        Ok(body.message)
    }

    /// Perform a view-state effect and report its outcome as an event.
    pub async fn perform(&self, effect: Effect) -> Event {
        match effect {
            Effect::Fetch { status, page } => match self.list(status, page).await {
                Ok(body) => Event::Loaded {
                    tasks: body.todos,
                    total_pages: body.total_pages,
                },
                Err(e) => Event::LoadFailed(format!("Error loading tasks: {:#}", e)),
            },
            Effect::Create {
                title,
                description,
                status,
            } => match self.create(&title, &description, status).await {
                Ok(task) => Event::Saved(task),
                Err(e) => Event::SaveFailed(format!("Error saving task: {:#}", e)),
            },
            Effect::Update { id, patch } => match self.update(&id, &patch).await {
                Ok(task) => Event::Saved(task),
                Err(e) => Event::SaveFailed(format!("Error saving task: {:#}", e)),
            },
            Effect::Delete { id } => match self.delete(&id).await {
                Ok(_) => Event::Deleted,
                Err(e) => Event::DeleteFailed(format!("Error deleting task: {:#}", e)),
            },
        }
    }

    /// Apply `event` to `state`, then perform effects until the state settles.
    pub async fn dispatch(&self, state: &mut ViewState, event: Event) {
        let mut next = state.apply(event);
        while let Some(effect) = next {
            log::debug!("effect {:?}", effect);
            let outcome = self.perform(effect).await;
            next = state.apply(outcome);
        }
    }
}

/// Decode a success body, or turn an error status into an `ApiFailure`.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();

    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<MessageResponse>(&text)
            .map(|body| body.message)
            .unwrap_or_else(|_| {
                if text.is_empty() {
                    status.canonical_reason().unwrap_or("request failed").to_string()
                } else {
                    text
                }
            });
        return Err(eyre::eyre!(ApiFailure {
            status: status.as_u16(),
            message,
        }));
    }

    response.json::<T>().await.context("Failed to decode response body")
}
