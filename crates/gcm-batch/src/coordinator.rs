//! Coordinator (spec §4.12): partitions work items into batches,
//! enqueues them as typed messages in groups of ≤10 per send, and opens
//! a coordination record to track the run.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use gcm_core::batch::{CoordinationRecord, CoordinationStatus};
use gcm_storage::KvTable;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

const MAX_MESSAGES_PER_SEND: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueMessage {
    pub coordination_id: Uuid,
    pub batch_id: String,
    pub batch_index: u32,
    pub batch_data: serde_json::Value,
}

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("queue send failed: {0}")]
    SendFailed(String),
}

/// The managed queue is an external collaborator out of scope per spec
/// §1; this trait is its capability contract. [`LocalQueueSink`] backs
/// tests and local development with an in-process buffer.
#[async_trait]
pub trait QueueSink: Send + Sync {
    async fn send_batch(&self, messages: &[QueueMessage]) -> Result<(), QueueError>;
}

#[derive(Debug, Default)]
pub struct LocalQueueSink {
    sent: tokio::sync::Mutex<Vec<QueueMessage>>,
}

impl LocalQueueSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent_messages(&self) -> Vec<QueueMessage> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl QueueSink for LocalQueueSink {
    async fn send_batch(&self, messages: &[QueueMessage]) -> Result<(), QueueError> {
        self.sent.lock().await.extend_from_slice(messages);
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CoordinationOutcome {
    pub coordination_id: Uuid,
    pub batches_created: u32,
    pub total_items: usize,
}

pub struct Coordinator {
    coordination_table: Arc<dyn KvTable<CoordinationRecord>>,
    queue: Arc<dyn QueueSink>,
}

impl Coordinator {
    pub fn new(coordination_table: Arc<dyn KvTable<CoordinationRecord>>, queue: Arc<dyn QueueSink>) -> Self {
        Self { coordination_table, queue }
    }

    /// Creates the coordination record, partitions `items` into batches
    /// of `batch_size`, and enqueues each batch, ≤10 messages per queue
    /// API call (spec §4.12 coordinator steps 1-4).
    pub async fn coordinate(
        &self,
        processing_type: &str,
        items: Vec<serde_json::Value>,
        batch_size: u32,
    ) -> Result<CoordinationOutcome, QueueError> {
        let total_items = items.len();
        let started_at = Utc::now();
        let coordination_id = Uuid::new_v4();

        let batch_size = batch_size.max(1) as usize;
        let batches: Vec<QueueMessage> = items
            .chunks(batch_size)
            .enumerate()
            .map(|(index, chunk)| QueueMessage {
                coordination_id,
                batch_id: format!("{coordination_id}-batch-{index}"),
                batch_index: index as u32,
                batch_data: serde_json::Value::Array(chunk.to_vec()),
            })
            .collect();

        let mut record = CoordinationRecord::new(processing_type, batches.len() as u32, started_at);
        record.coordination_id = coordination_id;
        record.status = if batches.is_empty() { CoordinationStatus::Completed } else { CoordinationStatus::Processing };
        self.coordination_table.upsert(coordination_id.to_string(), record).await;

        for group in batches.chunks(MAX_MESSAGES_PER_SEND) {
            self.queue.send_batch(group).await?;
        }

        Ok(CoordinationOutcome { coordination_id, batches_created: batches.len() as u32, total_items })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcm_storage::InMemoryKvTable;

    fn coordinator() -> (Coordinator, Arc<LocalQueueSink>) {
        let queue = Arc::new(LocalQueueSink::new());
        (Coordinator::new(Arc::new(InMemoryKvTable::new()), queue.clone()), queue)
    }

    #[tokio::test]
    async fn partitions_items_into_batches_of_requested_size() {
        let (coordinator, queue) = coordinator();
        let items: Vec<serde_json::Value> = (0..25).map(|i| serde_json::json!({ "i": i })).collect();
        let outcome = coordinator.coordinate("opportunity_match", items, 10).await.unwrap();
        assert_eq!(outcome.batches_created, 3);
        assert_eq!(outcome.total_items, 25);
        assert_eq!(queue.sent_messages().await.len(), 3);
    }

    #[tokio::test]
    async fn sends_in_groups_of_at_most_ten() {
        let (coordinator, queue) = coordinator();
        let items: Vec<serde_json::Value> = (0..150).map(|i| serde_json::json!({ "i": i })).collect();
        coordinator.coordinate("opportunity_match", items, 1).await.unwrap();
        assert_eq!(queue.sent_messages().await.len(), 150);
    }

    #[tokio::test]
    async fn persists_a_coordination_record() {
        let (coordinator, _queue) = coordinator();
        let outcome = coordinator.coordinate("opportunity_match", vec![serde_json::json!(1)], 10).await.unwrap();
        let record = coordinator.coordination_table.get(&outcome.coordination_id.to_string()).await.unwrap();
        assert_eq!(record.total_batches, 1);
        assert_eq!(record.status, CoordinationStatus::Processing);
    }
}
