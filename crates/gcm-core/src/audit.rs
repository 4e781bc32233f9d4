//! Audit log entry (spec §3, §4.11, §7). Partition key `tenant_id`, sort
//! key `timestamp`; TTL 90 days enforced by the storage layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub tenant_id: String,
    pub timestamp: DateTime<Utc>,
    pub caller_identity: String,
    pub target_resource: String,
    pub action_type: String,
    pub details: serde_json::Value,
}

impl AuditLogEntry {
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.timestamp + chrono::Duration::days(90)
    }
}
