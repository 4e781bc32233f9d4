//! Company profile aggregate (spec §3): per-tenant documents, past
//! performance, and the embedding-metadata contract shared with
//! opportunities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevenueRange {
    Under1M,
    OneToFiveM,
    FiveToTwentyFiveM,
    TwentyFiveToHundredM,
    OverHundredM,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmployeeCount {
    Under10,
    TenTo49,
    FiftyTo249,
    TwoFiftyTo999,
    OneThousandPlus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentStatus {
    Uploading,
    Uploaded,
    Processed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyDocument {
    pub document_id: String,
    pub filename: String,
    pub category: String,
    pub s3_key: String,
    pub status: DocumentStatus,
    pub size: u64,
    pub mime: String,
    pub tags: Vec<String>,
    pub version: u32,
}

impl CompanyDocument {
    /// Invariant from spec §3: every document's `s3_key` begins with
    /// `tenants/<company_id>/`.
    pub fn key_is_scoped_to(&self, company_id: &str) -> bool {
        self.s3_key.starts_with(&format!("tenants/{company_id}/"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PastPerformanceEntry {
    pub client: String,
    pub description: String,
    pub value: Option<rust_decimal::Decimal>,
    pub period_start: Option<DateTime<Utc>>,
    pub period_end: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ContactInfo {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CompanyLocation {
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CompanyEmbeddingMetadata {
    pub summary_key: Option<String>,
    pub section_keys: Vec<String>,
    pub document_chunk_keys: Vec<String>,
}

/// `company_id`-keyed record, isolated per `tenant_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub company_id: String,
    pub tenant_id: String,
    pub legal_name: String,
    pub primary_contact: ContactInfo,
    pub website_url: Option<String>,
    pub naics_codes: Vec<String>,
    pub certifications: Vec<String>,
    pub revenue_range: Option<RevenueRange>,
    pub employee_count: Option<EmployeeCount>,
    pub locations: Vec<CompanyLocation>,
    pub capability_statement: Option<String>,
    pub past_performance: Vec<PastPerformanceEntry>,
    pub documents: Vec<CompanyDocument>,
    pub embedding_metadata: CompanyEmbeddingMetadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(key: &str) -> CompanyDocument {
        CompanyDocument {
            document_id: "doc-1".into(),
            filename: "resume.pdf".into(),
            category: "team-resumes".into(),
            s3_key: key.into(),
            status: DocumentStatus::Uploaded,
            size: 1024,
            mime: "application/pdf".into(),
            tags: vec![],
            version: 1,
        }
    }

    #[test]
    fn document_key_must_be_tenant_scoped() {
        let scoped = doc("tenants/acme-co/raw/doc-1/resume.pdf");
        assert!(scoped.key_is_scoped_to("acme-co"));
        assert!(!scoped.key_is_scoped_to("other-co"));

        let unscoped = doc("raw/doc-1/resume.pdf");
        assert!(!unscoped.key_is_scoped_to("acme-co"));
    }
}
