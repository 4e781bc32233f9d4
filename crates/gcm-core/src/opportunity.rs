//! The `Opportunity` aggregate (spec §3) and its status-derivation invariant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessingStatus {
    Pending,
    Completed,
    Error,
    AlreadyExists,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Contact {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PlaceOfPerformance {
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AwardInfo {
    pub number: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub amount: Option<String>,
    pub awardee: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EmbeddingMetadata {
    pub summary_key: Option<String>,
    pub section_keys: Vec<String>,
    pub chunk_keys: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub attachment_id: String,
    pub filename: String,
    pub url: String,
}

/// `notice_id`-keyed partition record. Writes are upserts; see
/// [`derive_status`] for the single source of truth on `active`/`status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub notice_id: String,
    pub title: String,
    pub solicitation_number: Option<String>,
    pub department: Option<String>,
    pub agency: Option<String>,
    pub office: Option<String>,
    pub posted_date: DateTime<Utc>,
    pub response_deadline: Option<DateTime<Utc>>,
    pub archive_date: Option<DateTime<Utc>>,
    pub notice_type: Option<String>,
    pub naics_code: Option<String>,
    pub set_aside_code: Option<String>,
    pub set_aside_label: Option<String>,
    pub place_of_performance: PlaceOfPerformance,
    pub award: Option<AwardInfo>,
    pub primary_contact: Contact,
    pub secondary_contact: Contact,
    pub description: Option<String>,
    pub active: bool,
    pub attachments: Vec<Attachment>,
    pub embedding_metadata: EmbeddingMetadata,
    pub processing_status: ProcessingStatus,
    pub error_message: Option<String>,
    pub retry_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Opportunity status, as derived from the date-arithmetic invariant in
/// spec §3: `archive_date ≤ now ⇒ active=false ∧ status=archived`;
/// `response_deadline < now ∧ archive_date > now ⇒ status=expired`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpportunityStatus {
    Active,
    Expired,
    Archived,
}

/// Single source of truth for the `(active, status)` pair, given the
/// opportunity's own dates, the CSV-reported `active` flag, and `now`.
///
/// Archive takes priority over expiry: an opportunity with an
/// `archive_date` in the past is `archived` even if its deadline also
/// already passed.
pub fn derive_status(
    archive_date: Option<DateTime<Utc>>,
    response_deadline: Option<DateTime<Utc>>,
    csv_active: bool,
    now: DateTime<Utc>,
) -> (bool, OpportunityStatus) {
    if let Some(archive_date) = archive_date {
        if archive_date <= now {
            return (false, OpportunityStatus::Archived);
        }
    }
    if let Some(deadline) = response_deadline {
        if deadline < now {
            if let Some(archive_date) = archive_date {
                if archive_date > now {
                    return (false, OpportunityStatus::Expired);
                }
            } else {
                return (false, OpportunityStatus::Expired);
            }
        }
    }
    (csv_active, OpportunityStatus::Active)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 27, 12, 0, 0).single().unwrap()
    }

    #[test]
    fn archive_date_equal_to_now_is_inactive() {
        let (active, status) = derive_status(Some(now()), None, true, now());
        assert!(!active);
        assert_eq!(status, OpportunityStatus::Archived);
    }

    #[test]
    fn archive_in_future_deadline_past_is_expired() {
        let n = now();
        let (active, status) = derive_status(Some(n + Duration::days(10)), Some(n - Duration::days(1)), true, n);
        assert!(!active);
        assert_eq!(status, OpportunityStatus::Expired);
    }

    #[test]
    fn no_archive_no_deadline_trusts_csv_active() {
        let (active, status) = derive_status(None, None, true, now());
        assert!(active);
        assert_eq!(status, OpportunityStatus::Active);
    }

    #[test]
    fn archive_takes_priority_over_expiry() {
        let n = now();
        let (active, status) = derive_status(Some(n - Duration::days(1)), Some(n - Duration::days(5)), true, n);
        assert!(!active);
        assert_eq!(status, OpportunityStatus::Archived);
    }

    #[test]
    fn status_is_a_pure_function_of_its_inputs() {
        let n = now();
        let a = derive_status(Some(n + Duration::days(1)), Some(n + Duration::days(2)), true, n);
        let b = derive_status(Some(n + Duration::days(1)), Some(n + Duration::days(2)), true, n);
        assert_eq!(a, b);
    }
}
