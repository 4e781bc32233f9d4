//! KV-table capability (spec §4.13): partition key + optional sort key,
//! with upsert-on-unique-key semantics so every writer in the pipeline
//! (spec §5) can be idempotent without in-process locking. An in-memory
//! implementation backs tests; it stands in for the managed KV tables
//! (`opportunities`, `companies`, `matches`, `match_cache`,
//! `batch_coordination`, `progress_tracking`, `weight_configuration`,
//! `vector_index`, `audit_log`) named as external collaborators in §1.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KvError {
    #[error("item not found for key {0}")]
    NotFound(String),
}

#[async_trait]
pub trait KvTable<V>: Send + Sync
where
    V: Clone + Send + Sync,
{
    async fn upsert(&self, key: String, value: V);
    async fn get(&self, key: &str) -> Option<V>;
    async fn delete(&self, key: &str) -> Option<V>;
    /// Items whose key starts with `prefix`, in key order — used to
    /// model secondary-index-like scans (e.g. all batch-progress rows
    /// for one coordination_id) without a real secondary index.
    async fn scan_prefix(&self, prefix: &str) -> Vec<(String, V)>;
}

#[derive(Debug, Default)]
pub struct InMemoryKvTable<V> {
    items: Mutex<BTreeMap<String, V>>,
}

impl<V> InMemoryKvTable<V> {
    pub fn new() -> Self {
        Self { items: Mutex::new(BTreeMap::new()) }
    }
}

#[async_trait]
impl<V> KvTable<V> for InMemoryKvTable<V>
where
    V: Clone + Send + Sync,
{
    async fn upsert(&self, key: String, value: V) {
        self.items.lock().expect("kv lock poisoned").insert(key, value);
    }

    async fn get(&self, key: &str) -> Option<V> {
        self.items.lock().expect("kv lock poisoned").get(key).cloned()
    }

    async fn delete(&self, key: &str) -> Option<V> {
        self.items.lock().expect("kv lock poisoned").remove(key)
    }

    async fn scan_prefix(&self, prefix: &str) -> Vec<(String, V)> {
        self.items
            .lock()
            .expect("kv lock poisoned")
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}
