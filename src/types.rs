//! Core data types for the task store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Number of tasks returned per page by the list endpoint.
pub const ITEMS_PER_PAGE: u32 = 10;

/// A single to-do record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier: "td-" + 10 hex chars, assigned at creation
    pub id: String,

    /// Short summary of the work
    pub title: String,

    /// Longer free-form text
    pub description: String,

    /// Current state
    pub status: Status,

    /// When created
    pub created_at: DateTime<Utc>,
}

/// Task status states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Pending,
    Completed,
}

impl Status {
    /// The stored and wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Completed => "completed",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl std::fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown status '{}': expected pending or completed", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for Status {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Status::Pending),
            "completed" => Ok(Status::Completed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Fields for a task about to be created.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    /// Falls back to `Status::Pending` when absent
    pub status: Option<Status>,
}

impl NewTask {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            status: None,
        }
    }

    pub fn status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }
}

/// A partial update. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.status.is_none()
    }

    /// Merge this patch onto an existing task.
    pub fn apply_to(self, existing: Task) -> Task {
        Task {
            title: self.title.map(|t| t.trim().to_string()).unwrap_or(existing.title),
            description: self
                .description
                .map(|d| d.trim().to_string())
                .unwrap_or(existing.description),
            status: self.status.unwrap_or(existing.status),
            ..existing
        }
    }
}

/// Equality filter applied to list queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListFilter {
    pub status: Option<Status>,
}

impl ListFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }
}

/// One page of a list query.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskPage {
    /// Tasks on this page, newest first
    pub items: Vec<Task>,

    /// Count of all tasks matching the filter, ignoring pagination
    pub total_count: u64,
}

/// Number of pages needed to show `total_items`. Zero items means zero pages.
pub fn total_pages(total_items: u64, page_size: u32) -> u64 {
    let page_size = u64::from(page_size.max(1));
    total_items.div_ceil(page_size)
}

/// Validation errors for tasks.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyTitle,
    EmptyDescription,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyTitle => write!(f, "Please add a Title"),
            ValidationError::EmptyDescription => write!(f, "Please add a Description"),
        }
    }
}

impl std::error::Error for ValidationError {}

impl Task {
    /// Validate the task's fields.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        Ok(())
    }
}
