//! Progress tracker (spec §4.12): folds per-batch updates into the
//! coordination's aggregate progress, derives overall status, emits
//! gauges, and reports which completion thresholds this update newly
//! crossed.

use std::sync::Arc;

use chrono::Utc;
use gcm_core::batch::{BatchProgressRecord, BatchStatus, CoordinationRecord, CoordinationStatus};
use gcm_storage::KvTable;
use uuid::Uuid;

/// Percentages a coordination notifies on exactly once each, ascending
/// (spec §4.12: "once per crossing of 25/50/75/90/100% thresholds").
const NOTIFICATION_THRESHOLDS: [f64; 5] = [25.0, 50.0, 75.0, 90.0, 100.0];

#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    pub coordination_id: Uuid,
    pub batch_id: String,
    pub items_processed: u32,
    pub items_total: u32,
    pub errors_count: u32,
    pub processing_duration_ms: u64,
    pub status: BatchStatus,
}

fn progress_key(coordination_id: &str, batch_id: &str) -> String {
    format!("{coordination_id}/{batch_id}")
}

pub struct ProgressTracker {
    progress_table: Arc<dyn KvTable<BatchProgressRecord>>,
    coordination_table: Arc<dyn KvTable<CoordinationRecord>>,
}

impl ProgressTracker {
    pub fn new(
        progress_table: Arc<dyn KvTable<BatchProgressRecord>>,
        coordination_table: Arc<dyn KvTable<CoordinationRecord>>,
    ) -> Self {
        Self { progress_table, coordination_table }
    }

    /// Persists `update`, recomputes the parent coordination's
    /// `progress_percentage` and `status` from every known batch, and
    /// returns the thresholds this update newly crossed (spec §4.12).
    pub async fn record(&self, update: ProgressUpdate) -> Vec<f64> {
        let now = Utc::now();
        let coordination_id_str = update.coordination_id.to_string();

        let record = BatchProgressRecord {
            coordination_id: update.coordination_id,
            batch_id: update.batch_id.clone(),
            items_processed: update.items_processed,
            items_total: update.items_total,
            errors_count: update.errors_count,
            processing_duration_ms: update.processing_duration_ms,
            status: update.status,
            updated_at: now,
            ttl: now + chrono::Duration::days(7),
        };
        self.progress_table.upsert(progress_key(&coordination_id_str, &update.batch_id), record).await;

        tracing::info!(
            target: "metrics",
            gauge = "BatchCompletionPercentage",
            coordination_id = %coordination_id_str,
            batch_id = %update.batch_id,
            value = (update.items_processed as f64 / update.items_total.max(1) as f64) * 100.0,
        );

        let Some(mut coordination) = self.coordination_table.get(&coordination_id_str).await else {
            return Vec::new();
        };
        let previous_percentage = coordination.progress_percentage;

        let rows = self.progress_table.scan_prefix(&format!("{coordination_id_str}/")).await;
        let total_items_processed: u64 = rows.iter().map(|(_, r)| r.items_processed as u64).sum();
        let total_items: u64 = rows.iter().map(|(_, r)| r.items_total as u64).sum();
        let total_errors: u64 = rows.iter().map(|(_, r)| r.errors_count as u64).sum();
        let completed = rows.iter().filter(|(_, r)| r.status == BatchStatus::Completed).count() as u32;
        let failed = rows.iter().filter(|(_, r)| r.status == BatchStatus::Failed).count() as u32;
        let processing = rows.iter().filter(|(_, r)| r.status == BatchStatus::Processing).count() as u32;

        coordination.total_items_processed = total_items_processed;
        coordination.total_errors = total_errors;
        coordination.completed_batches = completed;
        coordination.failed_batches = failed;
        coordination.processing_batches = processing;
        coordination.progress_percentage =
            if total_items == 0 { 0.0 } else { (total_items_processed as f64 / total_items as f64) * 100.0 };

        let all_settled = coordination.total_batches > 0 && completed + failed >= coordination.total_batches;
        coordination.status = if all_settled {
            if coordination.ended_at.is_none() {
                coordination.ended_at = Some(now);
            }
            if failed > 0 { CoordinationStatus::CompletedWithErrors } else { CoordinationStatus::Completed }
        } else {
            CoordinationStatus::Processing
        };

        tracing::info!(
            target: "metrics",
            gauge = "OverallProgressPercentage",
            coordination_id = %coordination_id_str,
            value = coordination.progress_percentage,
        );
        tracing::info!(
            target: "metrics",
            gauge = "ProcessingErrors",
            coordination_id = %coordination_id_str,
            value = coordination.total_errors as f64,
        );

        self.coordination_table.upsert(coordination_id_str, coordination.clone()).await;

        NOTIFICATION_THRESHOLDS
            .iter()
            .copied()
            .filter(|t| previous_percentage < *t && coordination.progress_percentage >= *t)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcm_storage::InMemoryKvTable;

    fn tracker() -> ProgressTracker {
        ProgressTracker::new(Arc::new(InMemoryKvTable::new()), Arc::new(InMemoryKvTable::new()))
    }

    async fn seed_coordination(tracker: &ProgressTracker, total_batches: u32) -> Uuid {
        let record = CoordinationRecord::new("opportunity_match", total_batches, Utc::now());
        let id = record.coordination_id;
        tracker.coordination_table.upsert(id.to_string(), record).await;
        id
    }

    #[tokio::test]
    async fn crosses_fifty_percent_exactly_once() {
        let tracker = tracker();
        let id = seed_coordination(&tracker, 2).await;

        let crossed_first = tracker
            .record(ProgressUpdate {
                coordination_id: id,
                batch_id: "batch-0".into(),
                items_processed: 50,
                items_total: 100,
                errors_count: 0,
                processing_duration_ms: 10,
                status: BatchStatus::Completed,
            })
            .await;
        assert_eq!(crossed_first, vec![25.0, 50.0]);
    }

    #[tokio::test]
    async fn completes_with_errors_when_any_batch_failed() {
        let tracker = tracker();
        let id = seed_coordination(&tracker, 2).await;

        tracker
            .record(ProgressUpdate {
                coordination_id: id,
                batch_id: "batch-0".into(),
                items_processed: 50,
                items_total: 50,
                errors_count: 0,
                processing_duration_ms: 10,
                status: BatchStatus::Completed,
            })
            .await;
        tracker
            .record(ProgressUpdate {
                coordination_id: id,
                batch_id: "batch-1".into(),
                items_processed: 0,
                items_total: 50,
                errors_count: 50,
                processing_duration_ms: 10,
                status: BatchStatus::Failed,
            })
            .await;

        let coordination = tracker.coordination_table.get(&id.to_string()).await.unwrap();
        assert_eq!(coordination.status, CoordinationStatus::CompletedWithErrors);
        assert!(coordination.ended_at.is_some());
    }
}
