//! SQLite-backed task and app-state storage.
//!
//! Provides persistent storage for:
//! - Tasks with their subtasks (subtasks kept as a JSON column)
//! - Key-value store holding the app-state document

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use super::app_state::{default_document, merge_documents, AppStatePatch, AppStateStore, PersistedAppState};
use super::data_dir;
use super::task_store::TaskStore;
use crate::error::{CoreError, StoreError};
use crate::task::{new_id, non_blank, Effort, NewTask, Subtask, SubtaskPatch, Task, TaskPatch, Urgency};

const APP_STATE_KEY: &str = "app_state";

/// SQLite database implementing [`TaskStore`] and [`AppStateStore`].
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Default location, `<data_dir>/magictask.db`.
    pub fn default_path() -> Result<PathBuf, CoreError> {
        Ok(data_dir()?.join("magictask.db"))
    }

    /// Open (creating if needed) the database at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("database lock poisoned".into()))
    }

    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StoreError> {
        kv_get(&*self.conn()?, key)
    }

    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        kv_set(&*self.conn()?, key, value)
    }

    /// The raw app-state document, including keys the core does not model.
    pub fn app_state_document(&self) -> Result<Value, StoreError> {
        load_document(&*self.conn()?)
    }

    /// Read, change and write back one task under a single lock.
    fn modify_task<R>(
        &self,
        id: &str,
        change: impl FnOnce(&mut Task) -> Result<R, StoreError>,
    ) -> Result<R, StoreError> {
        let conn = self.conn()?;
        let mut task = load_task(&conn, id)?;
        let out = change(&mut task)?;
        save_task(&conn, &task)?;
        Ok(out)
    }
}

fn migrate(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS tasks (
            id           TEXT PRIMARY KEY,
            position     INTEGER NOT NULL,
            title        TEXT NOT NULL,
            urgency      INTEGER NOT NULL DEFAULT 0,
            effort       INTEGER NOT NULL DEFAULT 1,
            completed    INTEGER NOT NULL DEFAULT 0,
            created_at   TEXT NOT NULL,
            completed_at TEXT,
            collapsed    INTEGER NOT NULL DEFAULT 0,
            subtasks     TEXT NOT NULL DEFAULT '[]'
        );

        CREATE TABLE IF NOT EXISTS kv (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_tasks_position ON tasks(position);",
    )
}

fn kv_get(conn: &Connection, key: &str) -> Result<Option<String>, StoreError> {
    let value = conn
        .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(value)
}

fn kv_set(conn: &Connection, key: &str, value: &str) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO kv (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )?;
    Ok(())
}

fn load_document(conn: &Connection) -> Result<Value, StoreError> {
    match kv_get(conn, APP_STATE_KEY)? {
        Some(raw) => {
            let doc: Value = serde_json::from_str(&raw)?;
            if doc.as_object().is_some_and(|map| !map.is_empty()) {
                Ok(doc)
            } else {
                Ok(default_document())
            }
        }
        None => Ok(default_document()),
    }
}

impl AppStateStore for Database {
    fn read(&self) -> Result<PersistedAppState, StoreError> {
        PersistedAppState::from_document(&self.app_state_document()?)
    }

    fn merge(&self, patch: &AppStatePatch) -> Result<PersistedAppState, StoreError> {
        let conn = self.conn()?;
        let mut doc = load_document(&conn)?;
        merge_documents(&mut doc, &patch.to_value());
        kv_set(&conn, APP_STATE_KEY, &serde_json::to_string(&doc)?)?;
        PersistedAppState::from_document(&doc)
    }
}

// ── Tasks ────────────────────────────────────────────────────────────

const TASK_COLUMNS: &str =
    "id, title, urgency, effort, completed, created_at, completed_at, collapsed, subtasks";

/// A row as SQLite hands it back, before validation.
struct TaskRow {
    id: String,
    title: String,
    urgency: u8,
    effort: u8,
    completed: bool,
    created_at: String,
    completed_at: Option<String>,
    collapsed: bool,
    subtasks: String,
}

impl TaskRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            urgency: row.get(2)?,
            effort: row.get(3)?,
            completed: row.get(4)?,
            created_at: row.get(5)?,
            completed_at: row.get(6)?,
            collapsed: row.get(7)?,
            subtasks: row.get(8)?,
        })
    }

    fn into_task(self) -> Result<Task, StoreError> {
        let corrupt = |message: String| StoreError::Corrupt {
            id: self.id.clone(),
            message,
        };
        let created_at = parse_time(&self.created_at).map_err(corrupt)?;
        let completed_at = self
            .completed_at
            .as_deref()
            .map(parse_time)
            .transpose()
            .map_err(corrupt)?;
        let subtasks: Vec<Subtask> =
            serde_json::from_str(&self.subtasks).map_err(|e| corrupt(e.to_string()))?;
        Ok(Task {
            urgency: Urgency::try_from(self.urgency)?,
            effort: Effort::try_from(self.effort)?,
            id: self.id,
            title: self.title,
            completed: self.completed,
            created_at,
            completed_at,
            subtasks,
            collapsed: self.collapsed,
        })
    }
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("bad timestamp '{raw}': {e}"))
}

fn load_task(conn: &Connection, id: &str) -> Result<Task, StoreError> {
    let row = conn
        .query_row(
            &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
            params![id],
            TaskRow::from_row,
        )
        .optional()?
        .ok_or_else(|| StoreError::task_not_found(id))?;
    row.into_task()
}

fn save_task(conn: &Connection, task: &Task) -> Result<(), StoreError> {
    conn.execute(
        "UPDATE tasks SET title = ?2, urgency = ?3, effort = ?4, completed = ?5,
            completed_at = ?6, collapsed = ?7, subtasks = ?8
         WHERE id = ?1",
        params![
            task.id,
            task.title,
            u8::from(task.urgency),
            u8::from(task.effort),
            task.completed,
            task.completed_at.map(|t| t.to_rfc3339()),
            task.collapsed,
            serde_json::to_string(&task.subtasks)?,
        ],
    )?;
    Ok(())
}

fn find_subtask<'a>(task: &'a mut Task, subtask_id: &str) -> Result<&'a mut Subtask, StoreError> {
    task.subtasks
        .iter_mut()
        .find(|s| s.id == subtask_id)
        .ok_or_else(|| StoreError::subtask_not_found(subtask_id))
}

impl TaskStore for Database {
    fn list(&self) -> Result<Vec<Task>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks ORDER BY position ASC"
        ))?;
        let rows = stmt.query_map([], TaskRow::from_row)?;
        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?.into_task()?);
        }
        Ok(tasks)
    }

    fn get(&self, id: &str) -> Result<Task, StoreError> {
        load_task(&*self.conn()?, id)
    }

    fn create(&self, new: &NewTask) -> Result<Task, StoreError> {
        let task = Task {
            id: new_id(),
            title: new.validated_title()?,
            urgency: new.urgency,
            effort: new.effort,
            completed: false,
            created_at: Utc::now(),
            completed_at: None,
            subtasks: Vec::new(),
            collapsed: false,
        };
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO tasks (id, position, title, urgency, effort, completed, created_at, collapsed, subtasks)
             VALUES (?1, (SELECT COALESCE(MAX(position), 0) + 1 FROM tasks), ?2, ?3, ?4, 0, ?5, 0, '[]')",
            params![
                task.id,
                task.title,
                u8::from(task.urgency),
                u8::from(task.effort),
                task.created_at.to_rfc3339(),
            ],
        )?;
        Ok(task)
    }

    fn update(&self, id: &str, patch: &TaskPatch) -> Result<Task, StoreError> {
        self.modify_task(id, |task| {
            patch.apply(task)?;
            Ok(task.clone())
        })
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        let removed = self
            .conn()?
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        if removed == 0 {
            return Err(StoreError::task_not_found(id));
        }
        Ok(())
    }

    fn complete(&self, id: &str) -> Result<Task, StoreError> {
        self.modify_task(id, |task| {
            if !task.completed {
                task.completed = true;
                task.completed_at = Some(Utc::now());
            }
            Ok(task.clone())
        })
    }

    fn uncomplete(&self, id: &str) -> Result<Task, StoreError> {
        self.modify_task(id, |task| {
            task.completed = false;
            task.completed_at = None;
            Ok(task.clone())
        })
    }

    fn add_subtask(&self, task_id: &str, title: &str) -> Result<Subtask, StoreError> {
        let title = non_blank(title, "Subtask")?;
        self.modify_task(task_id, |task| {
            let subtask = Subtask {
                id: new_id(),
                title,
                completed: false,
                created_at: Utc::now(),
                completed_at: None,
            };
            task.subtasks.push(subtask.clone());
            Ok(subtask)
        })
    }

    fn update_subtask(
        &self,
        task_id: &str,
        subtask_id: &str,
        patch: &SubtaskPatch,
    ) -> Result<Subtask, StoreError> {
        self.modify_task(task_id, |task| {
            let subtask = find_subtask(task, subtask_id)?;
            patch.apply(subtask, Utc::now())?;
            Ok(subtask.clone())
        })
    }

    fn delete_subtask(&self, task_id: &str, subtask_id: &str) -> Result<(), StoreError> {
        self.modify_task(task_id, |task| {
            let before = task.subtasks.len();
            task.subtasks.retain(|s| s.id != subtask_id);
            if task.subtasks.len() == before {
                return Err(StoreError::subtask_not_found(subtask_id));
            }
            Ok(())
        })
    }
}
