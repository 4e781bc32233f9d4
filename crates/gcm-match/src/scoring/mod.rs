//! Eight scoring components (C9, spec §4.9). Every component shares the
//! contract `score(opportunity, company_profile) -> ComponentOutput`, run
//! independently by the orchestrator (C10) and folded down to
//! `gcm_core::matching::ComponentScore` at the persistence boundary.

pub mod capacity_fit;
pub mod certification_bonus;
pub mod geographic_match;
pub mod keyword_match;
pub mod naics_alignment;
pub mod past_performance;
pub mod recency_factor;
pub mod semantic_similarity;

use gcm_core::matching::ComponentScore;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ComponentStatus {
    Ok,
    Error,
    NoData,
}

/// Richer in-process result than [`ComponentScore`]: carries per-component
/// advice and a status so the orchestrator can apply the ">2 components
/// failed" rule (spec §4.10) before collapsing to the persisted shape.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentOutput {
    pub overall_score: f64,
    pub status: ComponentStatus,
    pub evidence: serde_json::Value,
    pub recommendations: Vec<String>,
    pub processing_time_ms: u64,
}

impl ComponentOutput {
    pub fn ok(score: f64, evidence: serde_json::Value) -> Self {
        Self {
            overall_score: score.clamp(0.0, 1.0),
            status: ComponentStatus::Ok,
            evidence,
            recommendations: Vec::new(),
            processing_time_ms: 0,
        }
    }

    pub fn with_recommendations(mut self, recommendations: Vec<String>) -> Self {
        self.recommendations = recommendations;
        self
    }

    pub fn with_elapsed(mut self, elapsed: std::time::Duration) -> Self {
        self.processing_time_ms = elapsed.as_millis() as u64;
        self
    }

    pub fn no_data(evidence: serde_json::Value) -> Self {
        Self {
            overall_score: 0.0,
            status: ComponentStatus::NoData,
            evidence,
            recommendations: Vec::new(),
            processing_time_ms: 0,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            overall_score: 0.0,
            status: ComponentStatus::Error,
            evidence: serde_json::json!({ "error": message.into() }),
            recommendations: Vec::new(),
            processing_time_ms: 0,
        }
    }

    pub fn into_component_score(self) -> ComponentScore {
        let mut evidence = self.evidence;
        if let serde_json::Value::Object(ref mut map) = evidence {
            map.insert("status".into(), serde_json::json!(self.status));
            map.insert("recommendations".into(), serde_json::json!(self.recommendations));
            map.insert("processing_time_ms".into(), serde_json::json!(self.processing_time_ms));
        }
        ComponentScore { score: self.overall_score, evidence }
    }
}

/// Cosine similarity between two equal-length vectors. Grounded on the
/// standard dot-product-over-norms shape; returns `None` for empty or
/// mismatched-length inputs so callers can fall back to a no-data result.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.is_empty() || a.len() != b.len() {
        return None;
    }
    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }
    Some(dot / (norm_a.sqrt() * norm_b.sqrt()))
}
