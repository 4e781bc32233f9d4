//! Dedup/enrichment hook seam, reused from the staged-pipeline shape
//! this crate is grounded on: tag/risk enrichment and content-hash
//! dedup operate on a `StagedOpportunity` wrapper rather than mutating
//! the bare `Opportunity`, so hooks can annotate without owning
//! normalization. Distinct from C9's NAICS/keyword scoring, which never
//! runs here.

use gcm_core::opportunity::Opportunity;
use gcm_storage::keys::stable_content_hash;

#[derive(Debug, Clone)]
pub struct StagedOpportunity {
    pub content_hash: String,
    pub tags: Vec<String>,
    pub risk_flags: Vec<String>,
    pub opportunity: Opportunity,
}

impl StagedOpportunity {
    pub fn new(opportunity: Opportunity) -> Self {
        let content_hash = stable_content_hash(&serde_json::json!({
            "notice_id": opportunity.notice_id,
            "title": opportunity.title,
            "posted_date": opportunity.posted_date,
            "description": opportunity.description,
        }));
        Self { content_hash, tags: Vec::new(), risk_flags: Vec::new(), opportunity }
    }
}

pub trait DedupHook: Send + Sync {
    fn apply(&self, items: Vec<StagedOpportunity>) -> anyhow::Result<Vec<StagedOpportunity>>;
}

pub trait EnrichmentHook: Send + Sync {
    fn apply(&self, items: Vec<StagedOpportunity>) -> anyhow::Result<Vec<StagedOpportunity>>;
}

#[derive(Default)]
pub struct NoopDedupHook;

impl DedupHook for NoopDedupHook {
    fn apply(&self, items: Vec<StagedOpportunity>) -> anyhow::Result<Vec<StagedOpportunity>> {
        Ok(items)
    }
}

#[derive(Default)]
pub struct NoopEnrichmentHook;

impl EnrichmentHook for NoopEnrichmentHook {
    fn apply(&self, items: Vec<StagedOpportunity>) -> anyhow::Result<Vec<StagedOpportunity>> {
        Ok(items)
    }
}

/// Drops items whose `content_hash` has already been seen earlier in
/// the same batch (spec §4.6: content-hash deduplication is required,
/// FIFO ordering is not).
#[derive(Default)]
pub struct ContentHashDedupHook;

impl DedupHook for ContentHashDedupHook {
    fn apply(&self, items: Vec<StagedOpportunity>) -> anyhow::Result<Vec<StagedOpportunity>> {
        let mut seen = std::collections::HashSet::new();
        Ok(items.into_iter().filter(|item| seen.insert(item.content_hash.clone())).collect())
    }
}

/// Flags opportunities nearing their response deadline so downstream
/// consumers can prioritize without re-deriving the date arithmetic.
pub struct ApproachingDeadlineEnrichmentHook {
    pub now: chrono::DateTime<chrono::Utc>,
    pub warn_within_days: i64,
}

impl EnrichmentHook for ApproachingDeadlineEnrichmentHook {
    fn apply(&self, mut items: Vec<StagedOpportunity>) -> anyhow::Result<Vec<StagedOpportunity>> {
        for item in &mut items {
            if let Some(deadline) = item.opportunity.response_deadline {
                let days_remaining = (deadline - self.now).num_days();
                if days_remaining >= 0 && days_remaining <= self.warn_within_days {
                    item.tags.push("deadline_approaching".to_string());
                }
            }
        }
        Ok(items)
    }
}
