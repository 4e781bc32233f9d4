//! Weight/Config Store record + validation (spec §3, §4.11).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The eight scoring-component weights (spec §4.9, §4.11). Field order
/// matches `original_source`'s `DEFAULT_WEIGHTS` so the defaults below
/// line up with the values the government-contracting source actually
/// shipped, since the distilled spec left these unspecified.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentWeights {
    pub semantic_similarity: f64,
    pub keyword_matching: f64,
    pub naics_alignment: f64,
    pub past_performance: f64,
    pub certification_bonus: f64,
    pub geographic_match: f64,
    pub capacity_fit: f64,
    pub recency_factor: f64,
}

impl Default for ComponentWeights {
    fn default() -> Self {
        Self {
            semantic_similarity: 0.25,
            keyword_matching: 0.15,
            naics_alignment: 0.15,
            past_performance: 0.20,
            certification_bonus: 0.10,
            geographic_match: 0.05,
            capacity_fit: 0.05,
            recency_factor: 0.05,
        }
    }
}

impl ComponentWeights {
    pub fn sum(&self) -> f64 {
        self.semantic_similarity
            + self.keyword_matching
            + self.naics_alignment
            + self.past_performance
            + self.certification_bonus
            + self.geographic_match
            + self.capacity_fit
            + self.recency_factor
    }

    pub fn as_pairs(&self) -> [(&'static str, f64); 8] {
        [
            ("semantic_similarity", self.semantic_similarity),
            ("keyword_matching", self.keyword_matching),
            ("naics_alignment", self.naics_alignment),
            ("past_performance", self.past_performance),
            ("certification_bonus", self.certification_bonus),
            ("geographic_match", self.geographic_match),
            ("capacity_fit", self.capacity_fit),
            ("recency_factor", self.recency_factor),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceLevels {
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

impl Default for ConfidenceLevels {
    fn default() -> Self {
        Self {
            high: 0.75,
            medium: 0.50,
            low: 0.25,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmParams {
    pub cache_ttl_hours: u32,
    pub min_score_threshold: f64,
    pub max_concurrent_matches: u32,
    pub semantic_similarity_threshold: f64,
    /// Coefficient-of-variation threshold for the confidence downshift
    /// (spec §4.10 step 6, §9 open question #3). Codified at 0.5 by
    /// default but made configurable per the spec's recommendation.
    pub confidence_cv_downshift_threshold: f64,
}

impl Default for AlgorithmParams {
    fn default() -> Self {
        Self {
            cache_ttl_hours: 24,
            min_score_threshold: 0.25,
            max_concurrent_matches: 100,
            semantic_similarity_threshold: 0.5,
            confidence_cv_downshift_threshold: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightConfiguration {
    pub config_key: String,
    pub weights: ComponentWeights,
    pub confidence_levels: ConfidenceLevels,
    pub algorithm_params: AlgorithmParams,
    pub version: u32,
    pub updated_by: String,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WeightConfigError {
    #[error("weights must sum to 1.0 +/- 0.01, got {0}")]
    WeightsDoNotSumToOne(String),
    #[error("component weight {component} must be in [0,1], got {value}")]
    WeightOutOfRange { component: &'static str, value: String },
    #[error("confidence levels must satisfy 0 <= low <= medium <= high <= 1")]
    ConfidenceLevelsOutOfOrder,
    #[error("cache_ttl_hours must be in [0, 168], got {0}")]
    CacheTtlOutOfRange(u32),
    #[error("max_concurrent_matches must be in [1, 1000], got {0}")]
    MaxConcurrentOutOfRange(u32),
}

const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

/// Validates a full weight configuration per spec §4.11's invariants.
pub fn validate_weight_configuration(
    weights: &ComponentWeights,
    confidence_levels: &ConfidenceLevels,
    algorithm_params: &AlgorithmParams,
) -> Result<(), WeightConfigError> {
    for (component, value) in weights.as_pairs() {
        if !(0.0..=1.0).contains(&value) {
            return Err(WeightConfigError::WeightOutOfRange { component, value: value.to_string() });
        }
    }
    let sum = weights.sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(WeightConfigError::WeightsDoNotSumToOne(format!("{sum:.4}")));
    }

    let cl = confidence_levels;
    if !(cl.low >= 0.0 && cl.low <= cl.medium && cl.medium <= cl.high && cl.high <= 1.0) {
        return Err(WeightConfigError::ConfidenceLevelsOutOfOrder);
    }

    if algorithm_params.cache_ttl_hours > 168 {
        return Err(WeightConfigError::CacheTtlOutOfRange(algorithm_params.cache_ttl_hours));
    }
    if !(1..=1000).contains(&algorithm_params.max_concurrent_matches) {
        return Err(WeightConfigError::MaxConcurrentOutOfRange(algorithm_params.max_concurrent_matches));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_sum_to_one_and_validate() {
        let weights = ComponentWeights::default();
        assert!((weights.sum() - 1.0).abs() < 1e-9);
        assert!(validate_weight_configuration(&weights, &ConfidenceLevels::default(), &AlgorithmParams::default()).is_ok());
    }

    #[test]
    fn sum_of_point_nine_nine_is_accepted() {
        let mut weights = ComponentWeights::default();
        weights.recency_factor -= 0.01;
        assert!((weights.sum() - 0.99).abs() < 1e-9);
        assert!(validate_weight_configuration(&weights, &ConfidenceLevels::default(), &AlgorithmParams::default()).is_ok());
    }

    #[test]
    fn sum_of_point_nine_eight_is_rejected() {
        let mut weights = ComponentWeights::default();
        weights.recency_factor -= 0.02;
        assert!((weights.sum() - 0.98).abs() < 1e-9);
        assert!(validate_weight_configuration(&weights, &ConfidenceLevels::default(), &AlgorithmParams::default()).is_err());
    }

    #[test]
    fn confidence_levels_must_be_ordered() {
        let weights = ComponentWeights::default();
        let bad = ConfidenceLevels { high: 0.5, medium: 0.6, low: 0.25 };
        assert_eq!(
            validate_weight_configuration(&weights, &bad, &AlgorithmParams::default()),
            Err(WeightConfigError::ConfidenceLevelsOutOfOrder)
        );
    }

    #[test]
    fn max_concurrent_matches_bounds_enforced() {
        let weights = ComponentWeights::default();
        let mut params = AlgorithmParams::default();
        params.max_concurrent_matches = 0;
        assert!(validate_weight_configuration(&weights, &ConfidenceLevels::default(), &params).is_err());
        params.max_concurrent_matches = 1001;
        assert!(validate_weight_configuration(&weights, &ConfidenceLevels::default(), &params).is_err());
    }
}
