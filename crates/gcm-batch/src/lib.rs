//! Batch Orchestrator (C12, spec §4.12): the adaptive batch-size
//! optimizer, coordinator, failure handler, progress tracker, health
//! monitor, and schedule manager that together drive the nightly
//! `OptimizeBatchSize → CoordinateBatches → Fan-out(Process →
//! UpdateProgress) → Finalize` pipeline. The managed queue named as an
//! external collaborator in spec §1 is a trait ([`coordinator::QueueSink`]);
//! only its capability contract is reimplemented here.

pub mod batch_size;
pub mod coordinator;
pub mod failure_handler;
pub mod health_monitor;
pub mod progress_tracker;
pub mod schedule_manager;

pub use batch_size::{optimize_batch_size, BatchSizeDecision, ConcurrencyConfig, RecentPerformance, RetryConfig};
pub use coordinator::{Coordinator, CoordinationOutcome, LocalQueueSink, QueueError, QueueMessage, QueueSink};
pub use failure_handler::{ErrorInfo, FailureDecision, FailureHandler, MAX_RETRY_ATTEMPTS};
pub use health_monitor::{CoordinationHealth, HealthMonitor, HealthStatus};
pub use progress_tracker::{ProgressTracker, ProgressUpdate};
pub use schedule_manager::{ExecutionHandle, ScheduleDefinition, ScheduleError, ScheduleManager};

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error(transparent)]
    Queue(#[from] QueueError),
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

pub const CRATE_NAME: &str = "gcm-batch";

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gcm_core::batch::{BatchStatus, CoordinationRecord};
    use gcm_storage::{InMemoryKvTable, KvTable};
    use std::sync::Arc;

    /// Runs one full nightly pipeline end-to-end across all six pieces:
    /// optimize batch size, coordinate items onto the queue, record
    /// progress for each resulting batch, then check the coordination's
    /// resulting health (spec §4.12 state-machine shape).
    #[tokio::test]
    async fn full_pipeline_from_optimize_to_health_check() {
        let decision = optimize_batch_size(60.0, 50, 4, None);
        assert_eq!(decision.optimized_batch_size, 50);

        let queue = Arc::new(LocalQueueSink::new());
        let coordination_table: Arc<dyn KvTable<CoordinationRecord>> = Arc::new(InMemoryKvTable::new());
        let coordinator = Coordinator::new(coordination_table.clone(), queue.clone());

        let items: Vec<serde_json::Value> = (0..10).map(|i| serde_json::json!({ "opportunity": i })).collect();
        let outcome = coordinator.coordinate("opportunity_match", items, decision.optimized_batch_size).await.unwrap();
        assert_eq!(outcome.batches_created, 1);

        let progress_table = Arc::new(InMemoryKvTable::new());
        let tracker = ProgressTracker::new(progress_table.clone(), coordination_table.clone());
        let crossed = tracker
            .record(ProgressUpdate {
                coordination_id: outcome.coordination_id,
                batch_id: format!("{}-batch-0", outcome.coordination_id),
                items_processed: 10,
                items_total: 10,
                errors_count: 0,
                processing_duration_ms: 500,
                status: BatchStatus::Completed,
            })
            .await;
        assert_eq!(crossed, vec![25.0, 50.0, 75.0, 90.0, 100.0]);

        let monitor = HealthMonitor::new(coordination_table.clone(), progress_table);
        let record = coordination_table.get(&outcome.coordination_id.to_string()).await.unwrap();
        let health = monitor.classify(&record, Utc::now()).await;
        assert_eq!(health.status, HealthStatus::Healthy);
    }
}
