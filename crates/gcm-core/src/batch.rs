//! Coordination + batch-progress records (spec §3, §4.12).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinationStatus {
    Pending,
    Processing,
    Completed,
    CompletedWithErrors,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinationRecord {
    pub coordination_id: Uuid,
    pub processing_type: String,
    pub status: CoordinationStatus,
    pub total_batches: u32,
    pub completed_batches: u32,
    pub failed_batches: u32,
    pub processing_batches: u32,
    pub total_items_processed: u64,
    pub total_errors: u64,
    pub progress_percentage: f64,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl CoordinationRecord {
    pub fn new(processing_type: impl Into<String>, total_batches: u32, started_at: DateTime<Utc>) -> Self {
        Self {
            coordination_id: Uuid::new_v4(),
            processing_type: processing_type.into(),
            status: CoordinationStatus::Pending,
            total_batches,
            completed_batches: 0,
            failed_batches: 0,
            processing_batches: 0,
            total_items_processed: 0,
            total_errors: 0,
            progress_percentage: 0.0,
            started_at,
            ended_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchProgressRecord {
    pub coordination_id: Uuid,
    pub batch_id: String,
    pub items_processed: u32,
    pub items_total: u32,
    pub errors_count: u32,
    pub processing_duration_ms: u64,
    pub status: BatchStatus,
    pub updated_at: DateTime<Utc>,
    pub ttl: DateTime<Utc>,
}
