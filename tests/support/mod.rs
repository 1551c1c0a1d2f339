use std::path::{Path, PathBuf};

use tempfile::TempDir;
use trak::document::DocumentStore;
use trak::focus::{FocusStore, FOCUS_KEY};
use trak::settings::{SettingsStore, SETTINGS_KEY};
use trak::task::{TaskRecord, TaskStore, TASKS_KEY};

/// Temporary data directory plus fully wired, initialized stores.
pub struct TestEnv {
    dir: TempDir,
    pub tasks: TaskStore,
    pub focus: FocusStore,
    pub settings: SettingsStore,
}

impl TestEnv {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let (tasks, focus, settings) = open_stores(dir.path()).await;
        Self {
            dir,
            tasks,
            focus,
            settings,
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn document_path(&self, key: &str) -> PathBuf {
        self.dir.path().join(format!("{key}.json"))
    }

    /// Re-open every store from disk, as a fresh process would.
    pub async fn reopen(&mut self) {
        let (tasks, focus, settings) = open_stores(self.dir.path()).await;
        self.tasks = tasks;
        self.focus = focus;
        self.settings = settings;
    }

    pub fn read_document(&self, key: &str) -> serde_json::Value {
        let raw = std::fs::read_to_string(self.document_path(key)).expect("read document");
        serde_json::from_str(&raw).expect("parse document")
    }
}

async fn open_stores(dir: &Path) -> (TaskStore, FocusStore, SettingsStore) {
    let docs = DocumentStore::new(dir);

    let tasks = TaskStore::new(docs.open(TASKS_KEY).await.expect("open tasks"));
    tasks.init().await.expect("init tasks");

    let focus = FocusStore::new(docs.open(FOCUS_KEY).await.expect("open focus"));
    focus.init().await.expect("init focus");

    let settings = SettingsStore::new(docs.open(SETTINGS_KEY).await.expect("open settings"));
    settings.init().await.expect("init settings");

    (tasks, focus, settings)
}

/// A task due `minutes` from now.
pub fn task_due_in(minutes: i64, id: u64, title: &str) -> TaskRecord {
    let mut task = TaskRecord::new(id, title);
    task.deadline = Some((chrono::Utc::now() + chrono::Duration::minutes(minutes)).to_rfc3339());
    task
}
