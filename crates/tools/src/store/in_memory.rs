//! In-memory store: useful for testing and dry runs.

use async_trait::async_trait;
use levain_core::error::StoreError;
use levain_core::store::RecordStore;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A store that keeps every appended record in memory, in order.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    records: Arc<RwLock<Vec<(String, Map<String, Value>)>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records appended to `log`, oldest first.
    pub async fn records(&self, log: &str) -> Vec<Map<String, Value>> {
        self.records
            .read()
            .await
            .iter()
            .filter(|(name, _)| name == log)
            .map(|(_, record)| record.clone())
            .collect()
    }

    /// Total number of records across all logs.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn append(&self, log: &str, record: Map<String, Value>) -> Result<(), StoreError> {
        self.records.write().await.push((log.to_string(), record));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_are_grouped_by_log() {
        let store = InMemoryStore::new();
        let mut a = Map::new();
        a.insert("question".into(), "gluten free?".into());
        store.append("feedback", a.clone()).await.unwrap();
        store.append("leads", Map::new()).await.unwrap();

        assert_eq!(store.len().await, 2);
        assert_eq!(store.records("feedback").await, vec![a]);
        assert!(store.records("cake_orders").await.is_empty());
    }

    #[tokio::test]
    async fn clones_share_records() {
        let store = InMemoryStore::new();
        let handle = store.clone();
        store.append("leads", Map::new()).await.unwrap();
        assert_eq!(handle.len().await, 1);
    }
}
