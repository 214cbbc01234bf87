//! Storage layer: a single SQLite table of task documents.

use crate::types::{ListFilter, Status, Task};
use chrono::{DateTime, Utc};
use eyre::{Context, Result};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, params};
use std::fs;
use std::path::Path;

/// Storage handle for reading/writing tasks.
pub struct Storage {
    db: Connection,
}

impl Storage {
    /// Open (or create) the database file at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).context("Failed to create database directory")?;
        }

        let db = Connection::open(path).context("Failed to open SQLite database")?;
        let storage = Self { db };
        storage.init_schema()?;

        log::debug!("Opened task database at {}", path.display());
        Ok(storage)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let db = Connection::open_in_memory().context("Failed to open in-memory database")?;
        let storage = Self { db };
        storage.init_schema()?;
        Ok(storage)
    }

    /// Initialize SQLite schema.
    fn init_schema(&self) -> Result<()> {
        self.db
            .execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS tasks (
                    seq INTEGER PRIMARY KEY AUTOINCREMENT,
                    id TEXT NOT NULL UNIQUE,
                    title TEXT NOT NULL CHECK (length(title) > 0),
                    description TEXT NOT NULL CHECK (length(description) > 0),
                    status TEXT NOT NULL CHECK (status IN ('pending', 'completed')),
                    created_at INTEGER NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_tasks_created ON tasks(created_at DESC, seq DESC);
                CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status, created_at DESC);
            "#,
            )
            .context("Failed to initialize schema")?;

        Ok(())
    }

    /// Insert a new task.
    pub fn insert_task(&self, task: &Task) -> Result<()> {
        self.db
            .execute(
                r#"
                INSERT INTO tasks (id, title, description, status, created_at)
                VALUES (?, ?, ?, ?, ?)
                "#,
                params![
                    task.id,
                    task.title,
                    task.description,
                    task.status.as_str(),
                    task.created_at.timestamp_micros(),
                ],
            )
            .context("Failed to insert task")?;

        Ok(())
    }

    /// Overwrite the mutable fields of a stored task. Returns false if no row matched.
    pub fn replace_task(&self, task: &Task) -> Result<bool> {
        let changed = self
            .db
            .execute(
                "UPDATE tasks SET title = ?, description = ?, status = ? WHERE id = ?",
                params![task.title, task.description, task.status.as_str(), task.id],
            )
            .context("Failed to update task")?;

        Ok(changed > 0)
    }

    /// Delete a task. Returns false if no row matched.
    pub fn delete_task(&self, id: &str) -> Result<bool> {
        let changed = self
            .db
            .execute("DELETE FROM tasks WHERE id = ?", params![id])
            .context("Failed to delete task")?;

        Ok(changed > 0)
    }

    /// Get a task by ID.
    pub fn get_task(&self, id: &str) -> Result<Option<Task>> {
        let task = self
            .db
            .query_row(
                "SELECT id, title, description, status, created_at FROM tasks WHERE id = ?",
                params![id],
                Self::row_to_task,
            )
            .optional()
            .context("Failed to read task")?;

        Ok(task)
    }

    /// List tasks matching `filter`, newest first, skipping `offset` and returning up to `limit`.
    pub fn list_tasks(&self, filter: &ListFilter, offset: u64, limit: u64) -> Result<Vec<Task>> {
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let tasks = match filter.status {
            Some(status) => {
                let mut stmt = self.db.prepare(
                    r#"
                    SELECT id, title, description, status, created_at
                    FROM tasks WHERE status = ?
                    ORDER BY created_at DESC, seq DESC
                    LIMIT ? OFFSET ?
                    "#,
                )?;
                let rows = stmt
                    .query_map(params![status.as_str(), limit, offset], Self::row_to_task)?
                    .collect::<rusqlite::Result<Vec<_>>>();
                rows
            }
            None => {
                let mut stmt = self.db.prepare(
                    r#"
                    SELECT id, title, description, status, created_at
                    FROM tasks
                    ORDER BY created_at DESC, seq DESC
                    LIMIT ? OFFSET ?
                    "#,
                )?;
                let rows = stmt
                    .query_map(params![limit, offset], Self::row_to_task)?
                    .collect::<rusqlite::Result<Vec<_>>>();
                rows
            }
        };

        tasks.context("Failed to list tasks")
    }

    /// Count tasks matching `filter`.
    pub fn count_tasks(&self, filter: &ListFilter) -> Result<u64> {
        let count: i64 = match filter.status {
            Some(status) => self.db.query_row(
                "SELECT COUNT(*) FROM tasks WHERE status = ?",
                params![status.as_str()],
                |row| row.get(0),
            ),
            None => self.db.query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get(0)),
        }
        .context("Failed to count tasks")?;

        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// Convert a database row to a Task.
    fn row_to_task(row: &rusqlite::Row) -> rusqlite::Result<Task> {
        let status_str: String = row.get(3)?;
        let status = status_str
            .parse::<Status>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;

        let created_at_micros: i64 = row.get(4)?;
        let created_at = DateTime::<Utc>::from_timestamp_micros(created_at_micros)
            .ok_or(rusqlite::Error::IntegralValueOutOfRange(4, created_at_micros))?;

        Ok(Task {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            status,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    fn make_task(id: &str, status: Status, created_at: DateTime<Utc>) -> Task {
        Task {
            id: id.to_string(),
            title: format!("Task {}", id),
            description: "Something to do".to_string(),
            status,
            created_at,
        }
    }

    fn base_time() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp_micros(1_700_000_000_000_000).unwrap()
    }

    #[test]
    fn test_open_creates_file_and_parent_dir() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("todos.db");
        let _storage = Storage::open(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_insert_and_get_task() {
        let storage = Storage::open_in_memory().unwrap();
        let task = make_task("td-0000000001", Status::Pending, base_time());

        storage.insert_task(&task).unwrap();

        let retrieved = storage.get_task("td-0000000001").unwrap();
        assert_eq!(retrieved, Some(task));
        assert!(storage.get_task("td-missing000").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let storage = Storage::open_in_memory().unwrap();
        let task = make_task("td-0000000001", Status::Pending, base_time());

        storage.insert_task(&task).unwrap();
        assert!(storage.insert_task(&task).is_err());
    }

    #[test]
    fn test_list_newest_first_with_offset() {
        let storage = Storage::open_in_memory().unwrap();
        for i in 0..5 {
            let task = make_task(
                &format!("td-000000000{}", i),
                Status::Pending,
                base_time() + Duration::seconds(i),
            );
            storage.insert_task(&task).unwrap();
        }

        let all = storage.list_tasks(&ListFilter::new(), 0, 10).unwrap();
        let ids: Vec<&str> = all.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["td-0000000004", "td-0000000003", "td-0000000002", "td-0000000001", "td-0000000000"]
        );

        let page = storage.list_tasks(&ListFilter::new(), 2, 2).unwrap();
        let ids: Vec<&str> = page.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["td-0000000002", "td-0000000001"]);

        assert!(storage.list_tasks(&ListFilter::new(), 10, 2).unwrap().is_empty());
    }

    #[test]
    fn test_same_timestamp_orders_by_insertion() {
        let storage = Storage::open_in_memory().unwrap();
        storage
            .insert_task(&make_task("td-aaaaaaaaaa", Status::Pending, base_time()))
            .unwrap();
        storage
            .insert_task(&make_task("td-bbbbbbbbbb", Status::Pending, base_time()))
            .unwrap();

        let all = storage.list_tasks(&ListFilter::new(), 0, 10).unwrap();
        assert_eq!(all[0].id, "td-bbbbbbbbbb");
        assert_eq!(all[1].id, "td-aaaaaaaaaa");
    }

    #[test]
    fn test_filter_and_count_by_status() {
        let storage = Storage::open_in_memory().unwrap();
        for i in 0..3 {
            let status = if i == 2 { Status::Completed } else { Status::Pending };
            storage
                .insert_task(&make_task(&format!("td-000000000{}", i), status, base_time()))
                .unwrap();
        }

        let completed = ListFilter::new().status(Status::Completed);
        let pending = ListFilter::new().status(Status::Pending);

        assert_eq!(storage.count_tasks(&ListFilter::new()).unwrap(), 3);
        assert_eq!(storage.count_tasks(&pending).unwrap(), 2);
        assert_eq!(storage.count_tasks(&completed).unwrap(), 1);

        let listed = storage.list_tasks(&completed, 0, 10).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].status, Status::Completed);
    }

    #[test]
    fn test_replace_and_delete() {
        let storage = Storage::open_in_memory().unwrap();
        let mut task = make_task("td-0000000001", Status::Pending, base_time());
        storage.insert_task(&task).unwrap();

        task.status = Status::Completed;
        assert!(storage.replace_task(&task).unwrap());
        assert_eq!(
            storage.get_task(&task.id).unwrap().map(|t| t.status),
            Some(Status::Completed)
        );

        assert!(storage.delete_task(&task.id).unwrap());
        assert!(!storage.delete_task(&task.id).unwrap());
        assert!(!storage.replace_task(&task).unwrap());
    }

    #[test]
    fn test_data_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("todos.db");
        let task = make_task("td-0000000001", Status::Completed, base_time());

        {
            let storage = Storage::open(&path).unwrap();
            storage.insert_task(&task).unwrap();
        }

        let storage = Storage::open(&path).unwrap();
        assert_eq!(storage.get_task(&task.id).unwrap(), Some(task));
    }
}
