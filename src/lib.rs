//! todos: a small task-tracking service.
//!
//! Tasks live in a SQLite-backed [`Store`]. A single store worker owns the
//! store and serves requests coming from the axum HTTP API, so handlers can
//! run concurrently without sharing the connection. The client side is an
//! HTTP [`ApiClient`] plus a pure view-state machine in [`ui`].
//!
//! # Example
//!
//! ```no_run
//! use todos::{ListFilter, NewTask, Status, Store, TaskPatch, ITEMS_PER_PAGE};
//!
//! let mut store = Store::open_in_memory().unwrap();
//!
//! let task = store.create(NewTask::new("Buy milk", "2%")).unwrap();
//! assert_eq!(task.status, Status::Pending);
//!
//! store
//!     .update(&task.id, TaskPatch { status: Some(Status::Completed), ..Default::default() })
//!     .unwrap();
//!
//! let page = store
//!     .list(ListFilter::new().status(Status::Completed), 1, ITEMS_PER_PAGE)
//!     .unwrap();
//! assert_eq!(page.total_count, 1);
//!
//! store.delete(&task.id).unwrap();
//! ```

mod id;
mod storage;
mod store;
mod types;

pub mod api;
pub mod client;
pub mod config;
pub mod protocol;
pub mod service;
pub mod ui;

// Re-export public API
pub use client::{ApiClient, ApiFailure};
pub use config::{DatabaseTarget, ServerConfig};
pub use protocol::{Request, Response};
pub use service::StoreHandle;
pub use store::{Store, StoreError};
pub use types::{
    ITEMS_PER_PAGE, ListFilter, NewTask, Status, Task, TaskPage, TaskPatch, UnknownStatus, ValidationError,
    total_pages,
};
