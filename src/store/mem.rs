use crate::store::{Record, Store, StoreResult};
use async_trait::async_trait;
use dashmap::DashMap;

/// Ephemeral store, used by the shell when no database is configured and by tests.
#[derive(Default)]
pub struct MemoryStore {
    records: DashMap<String, Record>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self { records: DashMap::new() }
    }

    /// Seeds a record, replacing whatever was there.
    pub fn insert(&self, id: impl Into<String>, record: Record) {
        self.records.insert(id.into(), record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_item(&self, id: &str) -> StoreResult<Record> {
        Ok(self.records.get(id).map(|r| r.clone()).unwrap_or_default())
    }

    async fn set_item(&self, id: &str, partial: Record) -> StoreResult<()> {
        let mut entry = self.records.entry(id.to_string()).or_default();
        for (key, value) in partial {
            entry.insert(key, value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn record(v: Value) -> Record {
        v.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn unknown_id_is_empty() {
        let store = MemoryStore::new();
        assert!(store.get_item("nobody").await.unwrap().is_empty());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn set_merges_by_top_level_key() {
        let store = MemoryStore::new();
        store.insert("u1", record(json!({"money": 5, "name": "Ada"})));

        store.set_item("u1", record(json!({"money": 9}))).await.unwrap();

        let r = store.get_item("u1").await.unwrap();
        assert_eq!(Value::Object(r), json!({"money": 9, "name": "Ada"}));
    }

    #[tokio::test]
    async fn query_returns_partial_record() {
        let store = MemoryStore::new();
        store.insert("u1", record(json!({"money": 5, "name": "Ada"})));

        let r = store.query_item("u1", "money").await.unwrap();
        assert_eq!(Value::Object(r), json!({"money": 5}));
    }
}
