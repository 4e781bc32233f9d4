//! Queue hand-off from C6 to C5 (spec §4.6): rows are emitted to the
//! processor in groups of at most 10, FIFO ordering not required,
//! content-hash dedup required (handled upstream by
//! [`crate::hooks::ContentHashDedupHook`]). The managed queue itself is
//! out of scope (spec §1) — `QueueSink` is the capability seam, backed
//! by an in-process implementation for tests and single-node runs.

use async_trait::async_trait;

use crate::hooks::StagedOpportunity;

pub const MAX_BATCH_SIZE: usize = 10;

#[async_trait]
pub trait QueueSink: Send + Sync {
    async fn send_batch(&self, batch: Vec<StagedOpportunity>) -> anyhow::Result<()>;
}

/// Splits `items` into chunks of at most [`MAX_BATCH_SIZE`] and sends
/// each through `sink` in turn.
pub async fn emit_in_batches(sink: &dyn QueueSink, items: Vec<StagedOpportunity>) -> anyhow::Result<usize> {
    let mut sent = 0usize;
    for chunk in items.chunks(MAX_BATCH_SIZE) {
        sink.send_batch(chunk.to_vec()).await?;
        sent += chunk.len();
    }
    Ok(sent)
}

/// In-process queue double: appends every batch it receives to a shared
/// buffer, for assembling end-to-end tests without a managed queue.
#[derive(Default)]
pub struct LocalQueueSink {
    received: tokio::sync::Mutex<Vec<Vec<StagedOpportunity>>>,
}

impl LocalQueueSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn drain(&self) -> Vec<Vec<StagedOpportunity>> {
        std::mem::take(&mut *self.received.lock().await)
    }
}

#[async_trait]
impl QueueSink for LocalQueueSink {
    async fn send_batch(&self, batch: Vec<StagedOpportunity>) -> anyhow::Result<()> {
        self.received.lock().await.push(batch);
        Ok(())
    }
}
