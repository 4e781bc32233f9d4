//! Failure handler (spec §4.12): decide whether a failed batch should
//! retry with exponential backoff (≤3 attempts) or be marked
//! permanently failed, updating the coordination's counters either way.

use std::sync::Arc;

use gcm_core::batch::CoordinationRecord;
use gcm_storage::KvTable;
use serde::{Deserialize, Serialize};

pub const MAX_RETRY_ATTEMPTS: u32 = 3;
const BASE_BACKOFF_MS: u64 = 1_000;
const MAX_BACKOFF_MS: u64 = 30_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub error_type: String,
    pub error_message: String,
    pub retry_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FailureDecision {
    Retry { backoff_ms: u64 },
    MarkFailed,
}

/// Exponential backoff doubling from 1s, capped at 30s (mirrors
/// `gcm-storage`'s HTTP retry policy), up to [`MAX_RETRY_ATTEMPTS`].
pub fn decide(error: &ErrorInfo) -> FailureDecision {
    if error.retry_count < MAX_RETRY_ATTEMPTS {
        let backoff_ms = BASE_BACKOFF_MS.saturating_mul(1u64 << error.retry_count).min(MAX_BACKOFF_MS);
        FailureDecision::Retry { backoff_ms }
    } else {
        FailureDecision::MarkFailed
    }
}

pub struct FailureHandler {
    coordination_table: Arc<dyn KvTable<CoordinationRecord>>,
}

impl FailureHandler {
    pub fn new(coordination_table: Arc<dyn KvTable<CoordinationRecord>>) -> Self {
        Self { coordination_table }
    }

    /// Applies [`decide`]'s outcome; a permanent failure increments the
    /// coordination's `failed_batches` counter (spec §4.12).
    pub async fn handle(&self, coordination_id: &str, error: &ErrorInfo) -> FailureDecision {
        let decision = decide(error);
        if matches!(decision, FailureDecision::MarkFailed) {
            if let Some(mut record) = self.coordination_table.get(coordination_id).await {
                record.failed_batches += 1;
                record.processing_batches = record.processing_batches.saturating_sub(1);
                self.coordination_table.upsert(coordination_id.to_string(), record).await;
            }
        }
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcm_core::batch::CoordinationStatus;
    use gcm_storage::InMemoryKvTable;
    use chrono::Utc;

    fn error(retry_count: u32) -> ErrorInfo {
        ErrorInfo { error_type: "timeout".into(), error_message: "boom".into(), retry_count }
    }

    #[test]
    fn retries_with_doubling_backoff_under_the_cap() {
        assert_eq!(decide(&error(0)), FailureDecision::Retry { backoff_ms: 1_000 });
        assert_eq!(decide(&error(1)), FailureDecision::Retry { backoff_ms: 2_000 });
        assert_eq!(decide(&error(2)), FailureDecision::Retry { backoff_ms: 4_000 });
    }

    #[test]
    fn marks_failed_after_max_attempts() {
        assert_eq!(decide(&error(3)), FailureDecision::MarkFailed);
        assert_eq!(decide(&error(10)), FailureDecision::MarkFailed);
    }

    #[tokio::test]
    async fn mark_failed_increments_coordination_failed_batches() {
        let table: Arc<dyn KvTable<CoordinationRecord>> = Arc::new(InMemoryKvTable::new());
        let mut record = CoordinationRecord::new("opportunity_match", 10, Utc::now());
        record.status = CoordinationStatus::Processing;
        record.processing_batches = 3;
        table.upsert(record.coordination_id.to_string(), record.clone()).await;

        let handler = FailureHandler::new(table.clone());
        let decision = handler.handle(&record.coordination_id.to_string(), &error(5)).await;
        assert_eq!(decision, FailureDecision::MarkFailed);

        let updated = table.get(&record.coordination_id.to_string()).await.unwrap();
        assert_eq!(updated.failed_batches, 1);
        assert_eq!(updated.processing_batches, 2);
    }
}
