//! Health monitor (spec §4.12): scans coordinations active within the
//! last 6h and classifies each as healthy, degraded, stalled, or error.

use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use gcm_core::batch::{BatchProgressRecord, BatchStatus, CoordinationRecord, CoordinationStatus};
use gcm_storage::KvTable;
use serde::Serialize;

const STALLED_AFTER_MINUTES: i64 = 60;
const DEGRADED_FAILURE_FRACTION: f64 = 0.1;
const ACTIVE_WINDOW_HOURS: i64 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Stalled,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoordinationHealth {
    pub coordination_id: String,
    pub status: HealthStatus,
    pub stalled_batches: u32,
}

pub struct HealthMonitor {
    coordination_table: Arc<dyn KvTable<CoordinationRecord>>,
    progress_table: Arc<dyn KvTable<BatchProgressRecord>>,
}

impl HealthMonitor {
    pub fn new(
        coordination_table: Arc<dyn KvTable<CoordinationRecord>>,
        progress_table: Arc<dyn KvTable<BatchProgressRecord>>,
    ) -> Self {
        Self { coordination_table, progress_table }
    }

    /// Classifies one coordination (spec §4.12): `error` if the
    /// coordination itself failed outright, else `degraded` if more
    /// than 10% of its batches failed, else `stalled` if any batch has
    /// sat in `processing` for over 60 minutes, else `healthy`.
    pub async fn classify(&self, coordination: &CoordinationRecord, now: DateTime<Utc>) -> CoordinationHealth {
        let rows = self.progress_table.scan_prefix(&format!("{}/", coordination.coordination_id)).await;
        let stalled_batches = rows
            .iter()
            .filter(|(_, r)| r.status == BatchStatus::Processing)
            .filter(|(_, r)| now - r.updated_at > ChronoDuration::minutes(STALLED_AFTER_MINUTES))
            .count() as u32;

        let status = if coordination.status == CoordinationStatus::Failed {
            HealthStatus::Error
        } else if coordination.total_batches > 0
            && coordination.failed_batches as f64 / coordination.total_batches as f64 > DEGRADED_FAILURE_FRACTION
        {
            HealthStatus::Degraded
        } else if stalled_batches > 0 {
            HealthStatus::Stalled
        } else {
            HealthStatus::Healthy
        };

        CoordinationHealth { coordination_id: coordination.coordination_id.to_string(), status, stalled_batches }
    }

    /// Scans every coordination started within the last 6h, or still
    /// open regardless of age, and classifies it (spec §4.12).
    pub async fn scan_active(&self, now: DateTime<Utc>) -> Vec<CoordinationHealth> {
        let rows = self.coordination_table.scan_prefix("").await;
        let mut results = Vec::with_capacity(rows.len());
        for (_, record) in rows {
            let active = record.ended_at.is_none() || now - record.started_at <= ChronoDuration::hours(ACTIVE_WINDOW_HOURS);
            if active {
                results.push(self.classify(&record, now).await);
            }
        }
        results
    }
}
