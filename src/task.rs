//! Task records and the task store.
//!
//! Tasks live as one ordered collection inside the `tasks` document.
//! Every mutation is a read-modify-write of the whole collection followed
//! by a single persist. The cycle is not atomic across await points: when
//! two logical operations interleave, the later persist wins. Accepted for
//! a single-user local tool; callers that care must serialize their own
//! writes.
//!
//! Each successful mutation broadcasts a [`TasksChanged`] token after the
//! persist completes, so subscribers (the reminder scheduler) invalidate
//! strictly after the mutation that triggered it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::warn;

use crate::document::{DocumentHandle, VERSION_FIELD};
use crate::error::Result;

/// Storage key of the backing document.
pub const TASKS_KEY: &str = "tasks";

/// Field holding the task collection.
const TASKS_FIELD: &str = "tasks";

/// Current schema version of the tasks document.
const TASKS_SCHEMA_VERSION: u64 = 1;

/// Capacity of the change-token channel. Tokens carry no payload, so a
/// lagging receiver only misses redundant clears.
const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// Token broadcast after any task mutation is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TasksChanged;

/// Task priority, ordinal on the wire (0 = low, 2 = high).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        match priority {
            Priority::Low => 0,
            Priority::Medium => 1,
            Priority::High => 2,
        }
    }
}

impl TryFrom<u8> for Priority {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(Priority::Low),
            1 => Ok(Priority::Medium),
            2 => Ok(Priority::High),
            other => Err(format!("priority out of range: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: u64,
    pub title: String,
    pub completed: bool,
}

/// One task record.
///
/// Ids are caller-assigned, unique within the collection, and monotonic by
/// convention. The deadline stays in its caller-supplied string form; a
/// value that does not parse as an RFC 3339 instant is treated as "no
/// deadline" by consumers rather than an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
}

impl TaskRecord {
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            priority: Priority::Medium,
            deadline: None,
            tags: Vec::new(),
            subtasks: Vec::new(),
            completed: false,
            hidden: None,
        }
    }

    /// Parsed deadline instant, `None` when absent or unparseable.
    pub fn deadline_instant(&self) -> Option<DateTime<Utc>> {
        let raw = self.deadline.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// CRUD over the ordered task collection.
#[derive(Debug, Clone)]
pub struct TaskStore {
    doc: DocumentHandle,
    changes: broadcast::Sender<TasksChanged>,
}

impl TaskStore {
    /// Wrap an opened `tasks` document. Call [`TaskStore::init`] before any
    /// other operation.
    pub fn new(doc: DocumentHandle) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self { doc, changes }
    }

    /// Seed the schema version and an empty collection on first run.
    /// Idempotent: an already-initialized document is left untouched.
    pub async fn init(&self) -> Result<()> {
        if self.doc.is_initialized().await {
            return Ok(());
        }
        self.doc
            .set(VERSION_FIELD, TASKS_SCHEMA_VERSION.into())
            .await;
        self.doc.set_as(TASKS_FIELD, &Vec::<TaskRecord>::new()).await?;
        self.doc.persist().await
    }

    /// Subscribe to change tokens. Mutations send strictly after their
    /// persist completes.
    pub fn subscribe(&self) -> broadcast::Receiver<TasksChanged> {
        self.changes.subscribe()
    }

    /// All tasks in stored order. An unreadable or missing collection
    /// yields an empty list, never an error.
    pub async fn list(&self) -> Vec<TaskRecord> {
        self.doc.get_as(TASKS_FIELD).await.unwrap_or_default()
    }

    /// Overwrite the whole collection.
    pub async fn replace_all(&self, tasks: &[TaskRecord]) -> Result<()> {
        self.save(tasks).await
    }

    /// Append one task and persist.
    pub async fn add(&self, task: TaskRecord) -> Result<()> {
        let mut tasks = self.list().await;
        tasks.push(task);
        self.save(&tasks).await
    }

    /// Replace the task at `index`. Out-of-range indices are a silent
    /// no-op, preserved for compatibility.
    pub async fn update(&self, index: usize, task: TaskRecord) -> Result<()> {
        let mut tasks = self.list().await;
        if index >= tasks.len() {
            warn!(index, len = tasks.len(), "task update out of range, ignoring");
            return Ok(());
        }
        tasks[index] = task;
        self.save(&tasks).await
    }

    /// Remove the task at `index`. Out-of-range indices are a silent
    /// no-op, preserved for compatibility.
    pub async fn delete(&self, index: usize) -> Result<()> {
        let mut tasks = self.list().await;
        if index >= tasks.len() {
            warn!(index, len = tasks.len(), "task delete out of range, ignoring");
            return Ok(());
        }
        tasks.remove(index);
        self.save(&tasks).await
    }

    async fn save(&self, tasks: &[TaskRecord]) -> Result<()> {
        self.doc.set_as(TASKS_FIELD, &tasks).await?;
        self.doc.persist().await?;
        // No receivers is fine; the token only matters to live subscribers.
        let _ = self.changes.send(TasksChanged);
        Ok(())
    }
}
