//! RecordStore trait: durable sink for tool side effects.
//!
//! Tools never touch storage directly: they hand a JSON record to a
//! store under a log name ("leads", "feedback", ...). Implementations
//! must serialize their own writes, since concurrent runs may share one
//! store.

use crate::error::StoreError;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// An append-only sink for structured records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// A human-readable name for this store (e.g., "jsonl", "in_memory").
    fn name(&self) -> &str;

    /// Append one record to the named log.
    async fn append(&self, log: &str, record: Map<String, Value>) -> Result<(), StoreError>;
}
