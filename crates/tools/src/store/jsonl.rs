//! JSONL store: one JSON object per line, one file per log.
//!
//! Storage location: `<dir>/<log>.jsonl`, e.g. `logs/leads.jsonl`.
//! The directory is created on first write. Appends are serialized
//! through a mutex so concurrent runs never interleave partial lines.

use async_trait::async_trait;
use levain_core::error::StoreError;
use levain_core::store::RecordStore;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

/// A file-backed store writing JSON lines under a directory.
pub struct JsonlStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlStore {
    /// Create a store rooted at `dir`. Nothing touches disk until the first append.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `log`.
    pub fn log_path(&self, log: &str) -> PathBuf {
        self.dir.join(format!("{log}.jsonl"))
    }
}

#[async_trait]
impl RecordStore for JsonlStore {
    fn name(&self) -> &str {
        "jsonl"
    }

    async fn append(&self, log: &str, record: Map<String, Value>) -> Result<(), StoreError> {
        let mut line = serde_json::to_string(&record)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        line.push('\n');

        let write_failed = |e: std::io::Error| StoreError::WriteFailed {
            log: log.to_string(),
            reason: e.to_string(),
        };

        let _guard = self.write_lock.lock().await;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(write_failed)?;

        let path = self.log_path(log);
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(write_failed)?;
        file.write_all(line.as_bytes()).await.map_err(write_failed)?;
        file.flush().await.map_err(write_failed)?;

        debug!(path = %path.display(), "Record appended");
        Ok(())
    }
}
