//! Versioned key-value documents.
//!
//! Every domain store persists through one [`Document`]: a named JSON file
//! under the data directory holding a flat bag of fields plus a
//! `__version__` marker. A document is considered initialized once that
//! marker is present and non-zero; its absence is the only first-run
//! signal the domain stores look at.
//!
//! Writes are buffered in memory until `persist()` flushes the whole
//! document atomically (temp file + rename), so callers batch `set` calls
//! and persist once.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::{Error, Result};

/// Field name carrying the document schema version.
pub const VERSION_FIELD: &str = "__version__";

/// Opens and caches documents by storage key.
///
/// `open` is idempotent: the first caller performs the physical load, and
/// every later caller for the same key gets a clone of the same handle.
/// One handle per key per process.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    data_dir: PathBuf,
    open_docs: Arc<Mutex<HashMap<String, DocumentHandle>>>,
}

/// Shared handle to a single open document.
pub type DocumentHandle = Arc<Document>;

#[derive(Debug)]
pub struct Document {
    key: String,
    path: PathBuf,
    fields: Mutex<Map<String, Value>>,
}

impl DocumentStore {
    /// Create a store rooted at `data_dir`. Cheap and synchronous; no I/O
    /// happens until the first `open`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            open_docs: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Directory the documents live in.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the document file for `key`.
    pub fn document_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{key}.json"))
    }

    /// Open the document for `key`, loading it from disk on first access.
    ///
    /// The registry lock is held across the load, so concurrent opens of
    /// the same key never read the file twice: later callers wait and then
    /// observe the already-loaded handle. A missing file yields an empty
    /// field map; an unreadable or corrupt file is logged and also yields
    /// an empty map, so the owning domain store re-seeds its defaults.
    pub async fn open(&self, key: &str) -> Result<DocumentHandle> {
        let mut docs = self.open_docs.lock().await;
        if let Some(handle) = docs.get(key) {
            return Ok(handle.clone());
        }

        let path = self.document_path(key);
        let fields = match load_fields(key, &path).await {
            Ok(fields) => fields,
            Err(err) => {
                warn!(key, error = %err, "document unreadable, starting from empty");
                Map::new()
            }
        };

        let handle = Arc::new(Document {
            key: key.to_string(),
            path,
            fields: Mutex::new(fields),
        });
        docs.insert(key.to_string(), handle.clone());
        Ok(handle)
    }
}

async fn load_fields(key: &str, path: &Path) -> Result<Map<String, Value>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
        Err(err) => {
            return Err(Error::DocumentLoad {
                key: key.to_string(),
                path: path.to_path_buf(),
                reason: err.to_string(),
            })
        }
    };

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(Error::DocumentLoad {
            key: key.to_string(),
            path: path.to_path_buf(),
            reason: format!("expected a JSON object, found {}", value_kind(&other)),
        }),
        Err(err) => Err(Error::DocumentLoad {
            key: key.to_string(),
            path: path.to_path_buf(),
            reason: err.to_string(),
        }),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl Document {
    /// Storage key this document was opened under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read one field, if present.
    pub async fn get(&self, field: &str) -> Option<Value> {
        self.fields.lock().await.get(field).cloned()
    }

    /// Read one field and deserialize it. `None` when the field is absent
    /// or does not match the expected shape.
    pub async fn get_as<T: DeserializeOwned>(&self, field: &str) -> Option<T> {
        let value = self.get(field).await?;
        serde_json::from_value(value).ok()
    }

    /// Write one field in memory. Not flushed until `persist`.
    pub async fn set(&self, field: &str, value: Value) {
        self.fields.lock().await.insert(field.to_string(), value);
    }

    /// Serialize `value` into one field. Not flushed until `persist`.
    pub async fn set_as<T: Serialize>(&self, field: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.set(field, value).await;
        Ok(())
    }

    /// Schema version field, or 0 when absent or malformed.
    pub async fn schema_version(&self) -> u64 {
        self.get(VERSION_FIELD)
            .await
            .and_then(|value| value.as_u64())
            .unwrap_or(0)
    }

    /// Whether the version marker is present and non-zero.
    pub async fn is_initialized(&self) -> bool {
        self.schema_version().await != 0
    }

    /// Flush the whole document to disk atomically (temp file + rename).
    ///
    /// Failures are recoverable errors; the document keeps its in-memory
    /// state and the caller decides whether to retry.
    pub async fn persist(&self) -> Result<()> {
        let json = {
            let fields = self.fields.lock().await;
            serde_json::to_string_pretty(&Value::Object(fields.clone()))?
        };
        write_atomic(&self.path, json.as_bytes()).await
    }
}

/// Write data atomically using temp file + rename, so readers never see a
/// partial document.
async fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let temp_path = path.with_extension("tmp");
    let mut file = tokio::fs::File::create(&temp_path).await?;
    file.write_all(data).await?;
    file.sync_all().await?;
    drop(file);

    tokio::fs::rename(&temp_path, path).await?;
    Ok(())
}
