//! Message types exchanged between request handlers and the store worker.

use crate::types::{ListFilter, NewTask, Task, TaskPatch};

/// Request sent to the store worker.
#[derive(Debug, Clone)]
pub enum Request {
    /// Create a new task.
    Create { task: NewTask },

    /// Get a task by ID.
    Get { id: String },

    /// List one page of tasks.
    List {
        filter: ListFilter,
        page: u32,
        page_size: u32,
    },

    /// Apply a partial update.
    Update { id: String, patch: TaskPatch },

    /// Delete a task.
    Delete { id: String },
}

/// Response sent back by the store worker.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Single task response.
    Task { task: Task },

    /// One page of a list query.
    Page { items: Vec<Task>, total_count: u64 },

    /// Operation succeeded with nothing to return.
    Ok,

    /// Task not found.
    NotFound { id: String },

    /// The request carried invalid field values.
    Invalid { message: String },

    /// Storage failure.
    Error { message: String },
}

impl Response {
    /// Create an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}
