//! Request and response bodies of the HTTP API.

use crate::types::{Status, Task};
use serde::{Deserialize, Serialize};

/// Query string of `GET /api/todos/all`.
///
/// Both values stay raw strings so that an empty `status=` or a junk `page`
/// can be handled leniently instead of failing extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
}

impl ListQuery {
    /// Requested page, 1-indexed. Missing, unparsable or zero values mean
    /// page 1; numbers beyond `u32::MAX` saturate so they stay past the end.
    pub fn page(&self) -> u32 {
        let Some(raw) = self.page.as_deref().map(str::trim) else {
            return 1;
        };
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return 1;
        }
        raw.parse::<u32>().unwrap_or(u32::MAX).max(1)
    }
}

/// Body of `GET /api/todos/all`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub page: u32,
    pub total_pages: u64,
    pub total_items: u64,
    pub items_per_page: u32,
    pub todos: Vec<Task>,
}

/// Body of `POST /api/todos/create`. All fields are required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<Status>,
}

/// Body carrying only a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
