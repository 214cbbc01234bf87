//! High-level store API for tasks.

use crate::id::generate_id;
use crate::storage::Storage;
use crate::types::{ListFilter, NewTask, Task, TaskPage, TaskPatch, ValidationError};
use chrono::{SubsecRound, Utc};
use eyre::{Context, Result};
use std::path::Path;

/// Errors that can occur during store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Task not found.
    NotFound(String),
    /// Validation error.
    Validation(ValidationError),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound(id) => write!(f, "task not found: {}", id),
            StoreError::Validation(e) => write!(f, "validation error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

impl StoreError {
    /// Find the `StoreError` carried by a report, if any.
    pub fn find(report: &eyre::Report) -> Option<&StoreError> {
        report.chain().find_map(|cause| cause.downcast_ref::<StoreError>())
    }
}

/// The task store.
pub struct Store {
    storage: Storage,
}

impl Store {
    /// Open the store backed by the database file at `path`, creating it if needed.
    pub fn open(path: &Path) -> Result<Self> {
        let storage = Storage::open(path)?;
        Ok(Self { storage })
    }

    /// Open a store that lives only as long as this value.
    pub fn open_in_memory() -> Result<Self> {
        let storage = Storage::open_in_memory()?;
        Ok(Self { storage })
    }

    /// Create a new task.
    pub fn create(&mut self, new: NewTask) -> Result<Task> {
        let now = Utc::now().trunc_subsecs(6);
        let title = new.title.trim().to_string();

        let task = Task {
            id: generate_id(&title, now),
            title,
            description: new.description.trim().to_string(),
            status: new.status.unwrap_or_default(),
            created_at: now,
        };

        // Validate before persisting
        task.validate().map_err(|e| eyre::eyre!(StoreError::Validation(e)))?;

        self.storage.insert_task(&task).context("Failed to persist task")?;
        log::debug!("Created task {}", task.id);

        Ok(task)
    }

    /// Get a task by ID.
    pub fn get(&self, id: &str) -> Result<Task> {
        self.storage
            .get_task(id)?
            .ok_or_else(|| eyre::eyre!(StoreError::NotFound(id.to_string())))
    }

    /// List one page of tasks matching `filter`, newest first.
    ///
    /// `page` is 1-indexed; values below 1 are treated as 1. A page past the
    /// end yields no items but still reports the full `total_count`.
    pub fn list(&self, filter: ListFilter, page: u32, page_size: u32) -> Result<TaskPage> {
        let page = page.max(1);
        let page_size = page_size.max(1);
        let offset = u64::from(page - 1) * u64::from(page_size);

        let total_count = self.storage.count_tasks(&filter)?;
        let items = self.storage.list_tasks(&filter, offset, u64::from(page_size))?;

        Ok(TaskPage { items, total_count })
    }

    /// Count tasks matching `filter`.
    pub fn count(&self, filter: ListFilter) -> Result<u64> {
        self.storage.count_tasks(&filter)
    }

    /// Apply a partial update. Fields absent from `patch` keep their value.
    pub fn update(&mut self, id: &str, patch: TaskPatch) -> Result<Task> {
        let existing = self.get(id)?;
        let updated = patch.apply_to(existing);

        // Validate before persisting
        updated.validate().map_err(|e| eyre::eyre!(StoreError::Validation(e)))?;

        if !self
            .storage
            .replace_task(&updated)
            .context("Failed to persist updated task")?
        {
            return Err(eyre::eyre!(StoreError::NotFound(id.to_string())));
        }
        log::debug!("Updated task {}", id);

        Ok(updated)
    }

    /// Permanently remove a task.
    pub fn delete(&mut self, id: &str) -> Result<()> {
        if !self.storage.delete_task(id).context("Failed to delete task")? {
            return Err(eyre::eyre!(StoreError::NotFound(id.to_string())));
        }
        log::debug!("Deleted task {}", id);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ITEMS_PER_PAGE, Status};
    use tempfile::TempDir;

    fn setup_test_store() -> Store {
        Store::open_in_memory().unwrap()
    }

    fn is_not_found(report: &eyre::Report) -> bool {
        matches!(StoreError::find(report), Some(StoreError::NotFound(_)))
    }

    #[test]
    fn test_create_and_get() {
        let mut store = setup_test_store();

        let task = store.create(NewTask::new("Buy milk", "2%")).unwrap();

        assert!(task.id.starts_with("td-"));
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.description, "2%");
        assert_eq!(task.status, Status::Pending);

        let retrieved = store.get(&task.id).unwrap();
        assert_eq!(retrieved, task);
    }

    #[test]
    fn test_create_with_explicit_status() {
        let mut store = setup_test_store();

        let task = store
            .create(NewTask::new("Ship it", "release 1.0").status(Status::Completed))
            .unwrap();
        assert_eq!(task.status, Status::Completed);
    }

    #[test]
    fn test_create_trims_fields() {
        let mut store = setup_test_store();

        let task = store.create(NewTask::new("  Buy milk ", "\t2%\n")).unwrap();
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.description, "2%");
    }

    #[test]
    fn test_create_empty_fields_rejected() {
        let mut store = setup_test_store();

        for (title, description) in [("", "2%"), ("Buy milk", ""), ("   ", "2%"), ("", "")] {
            let err = store.create(NewTask::new(title, description)).unwrap_err();
            assert!(
                matches!(StoreError::find(&err), Some(StoreError::Validation(_))),
                "expected validation error for ({:?}, {:?})",
                title,
                description
            );
        }
        assert_eq!(store.count(ListFilter::new()).unwrap(), 0);
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let store = setup_test_store();
        let err = store.get("td-nonexistent").unwrap_err();
        assert!(is_not_found(&err));
    }

    #[test]
    fn test_update_only_supplied_fields() {
        let mut store = setup_test_store();

        let task = store.create(NewTask::new("Original", "Keep me")).unwrap();
        let updated = store
            .update(
                &task.id,
                TaskPatch {
                    title: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.description, "Keep me");
        assert_eq!(updated.status, Status::Pending);
        assert_eq!(updated.created_at, task.created_at);
        assert_eq!(store.get(&task.id).unwrap(), updated);
    }

    #[test]
    fn test_update_rejects_empty_title() {
        let mut store = setup_test_store();

        let task = store.create(NewTask::new("Original", "Keep me")).unwrap();
        let err = store
            .update(
                &task.id,
                TaskPatch {
                    title: Some("  ".to_string()),
                    ..Default::default()
                },
            )
            .unwrap_err();

        assert!(matches!(
            StoreError::find(&err),
            Some(StoreError::Validation(ValidationError::EmptyTitle))
        ));
        assert_eq!(store.get(&task.id).unwrap().title, "Original");
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let mut store = setup_test_store();
        let err = store.update("td-nonexistent", TaskPatch::default()).unwrap_err();
        assert!(is_not_found(&err));
    }

    #[test]
    fn test_delete_then_get_is_not_found() {
        let mut store = setup_test_store();

        let task = store.create(NewTask::new("Short lived", "gone soon")).unwrap();
        store.delete(&task.id).unwrap();

        assert!(is_not_found(&store.get(&task.id).unwrap_err()));
        assert!(is_not_found(&store.delete(&task.id).unwrap_err()));
    }

    #[test]
    fn test_list_pagination() {
        let mut store = setup_test_store();
        for i in 0..25 {
            store
                .create(NewTask::new(format!("Task {}", i), "bulk"))
                .unwrap();
        }

        let first = store.list(ListFilter::new(), 1, ITEMS_PER_PAGE).unwrap();
        assert_eq!(first.total_count, 25);
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.items[0].title, "Task 24");

        let third = store.list(ListFilter::new(), 3, ITEMS_PER_PAGE).unwrap();
        assert_eq!(third.items.len(), 5);
        assert_eq!(third.items[4].title, "Task 0");

        let fourth = store.list(ListFilter::new(), 4, ITEMS_PER_PAGE).unwrap();
        assert!(fourth.items.is_empty());
        assert_eq!(fourth.total_count, 25);
    }

    #[test]
    fn test_list_page_zero_clamped_to_first() {
        let mut store = setup_test_store();
        store.create(NewTask::new("Only", "one")).unwrap();

        let page = store.list(ListFilter::new(), 0, ITEMS_PER_PAGE).unwrap();
        assert_eq!(page.items.len(), 1);
    }

    #[test]
    fn test_store_persists_across_open() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("todos.db");

        let id = {
            let mut store = Store::open(&path).unwrap();
            store.create(NewTask::new("Durable", "on disk")).unwrap().id
        };

        let store = Store::open(&path).unwrap();
        assert_eq!(store.get(&id).unwrap().title, "Durable");
    }
}
