//! Match Result aggregate (spec §3, §4.10).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Confidence {
    NoMatch,
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Base confidence band from total score alone (spec §4.10 step 6),
    /// before the coefficient-of-variation downshift is applied.
    pub fn from_score(total_score: f64) -> Self {
        if total_score >= 0.75 {
            Confidence::High
        } else if total_score >= 0.50 {
            Confidence::Medium
        } else if total_score >= 0.25 {
            Confidence::Low
        } else {
            Confidence::NoMatch
        }
    }

    pub fn downshift(self) -> Self {
        match self {
            Confidence::High => Confidence::Medium,
            Confidence::Medium => Confidence::Low,
            other => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentScore {
    pub score: f64,
    pub evidence: serde_json::Value,
}

/// Single explicit boundary function converting an in-process float score
/// to its storable form (spec §9 redesign: "float/decimal conversion
/// noise at the KV boundary"). Scores are computed as `f64` throughout
/// scoring and orchestration; only at the persistence boundary are they
/// rounded through a `Decimal` quantization, matching the data model's
/// "stored ≤1 decimal place of precision drift tolerated" invariant.
pub fn to_storable_score(raw: f64) -> f64 {
    use rust_decimal::prelude::ToPrimitive;
    use rust_decimal::Decimal;

    let Some(decimal) = Decimal::from_f64_retain(raw.clamp(0.0, 1.0)) else {
        return raw.clamp(0.0, 1.0);
    };
    decimal.round_dp(4).to_f64().unwrap_or(raw.clamp(0.0, 1.0))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub company_id: String,
    pub opportunity_id: String,
    pub total_score: f64,
    pub confidence: Confidence,
    pub component_scores: BTreeMap<String, ComponentScore>,
    pub match_reasons: Vec<String>,
    pub non_match_reasons: Vec<String>,
    pub recommendations: Vec<String>,
    pub action_items: Vec<String>,
    pub processing_time_ms: u64,
    pub cached: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_storable_score_rounds_to_four_decimal_places() {
        assert_eq!(to_storable_score(0.123456789), 0.1235);
        assert_eq!(to_storable_score(1.5), 1.0);
        assert_eq!(to_storable_score(-0.5), 0.0);
    }

    #[test]
    fn confidence_ordering_is_high_gt_medium_gt_low() {
        assert!(Confidence::High > Confidence::Medium);
        assert!(Confidence::Medium > Confidence::Low);
        assert!(Confidence::Low > Confidence::NoMatch);
    }

    #[test]
    fn downshift_moves_exactly_one_band() {
        assert_eq!(Confidence::High.downshift(), Confidence::Medium);
        assert_eq!(Confidence::Medium.downshift(), Confidence::Low);
        assert_eq!(Confidence::Low.downshift(), Confidence::Low);
        assert_eq!(Confidence::NoMatch.downshift(), Confidence::NoMatch);
    }

    #[test]
    fn bands_match_spec_thresholds() {
        assert_eq!(Confidence::from_score(0.75), Confidence::High);
        assert_eq!(Confidence::from_score(0.749), Confidence::Medium);
        assert_eq!(Confidence::from_score(0.50), Confidence::Medium);
        assert_eq!(Confidence::from_score(0.25), Confidence::Low);
        assert_eq!(Confidence::from_score(0.24), Confidence::NoMatch);
    }
}
