//! Match Orchestrator (C10, spec §4.10): for one (opportunity, company)
//! pair, gate on the Quick Filter, fan out to the eight scoring
//! components, combine into a weighted total, derive confidence, compose
//! explanations, and persist — with a deterministic cache-key fingerprint
//! (spec §9 redesign: `Sha256` over canonical JSON, not `DefaultHasher`).

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use gcm_core::company::CompanyProfile;
use gcm_core::config::ComponentWeights;
use gcm_core::matching::{to_storable_score, ComponentScore, Confidence, MatchResult};
use gcm_core::opportunity::Opportunity;
use gcm_storage::keys::{match_cache_key_material, stable_content_hash};
use gcm_storage::{sha256_hex, KvTable};
use serde::{Deserialize, Serialize};

use crate::quick_filter::quick_filter;
use crate::scoring::{
    capacity_fit, certification_bonus, geographic_match, keyword_match, naics_alignment, past_performance,
    recency_factor, semantic_similarity, ComponentOutput, ComponentStatus,
};

const COMPONENT_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_FAILED_COMPONENTS_BEFORE_PARTIAL: usize = 2;

/// Everything the eight scoring components need, pre-fetched by the
/// caller so this crate never performs I/O of its own (spec §9 redesign:
/// dependencies threaded through, not global singletons).
#[derive(Debug, Clone)]
pub struct ScoringInputs {
    pub opportunity_main_vector: Option<Vec<f32>>,
    pub opportunity_chunk_vectors: Vec<Vec<f32>>,
    pub company_profile_vector: Option<Vec<f32>>,
    pub opportunity_keyword_text: String,
    pub company_keyword_text: String,
    pub opportunity_award_usd: Option<f64>,
    pub past_performance_domain_similarities: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub result: MatchResult,
    pub cached_at: DateTime<Utc>,
    pub ttl_hours: u32,
}

impl CacheEntry {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now - self.cached_at < chrono::Duration::hours(self.ttl_hours as i64)
    }
}

pub struct MatchOrchestrator {
    cache: Arc<dyn KvTable<CacheEntry>>,
    matches: Arc<dyn KvTable<MatchResult>>,
}

fn match_result_key(company_id: &str, opportunity_id: &str) -> String {
    format!("{company_id}#{opportunity_id}")
}

async fn run_component<F>(name: &'static str, f: F) -> (&'static str, ComponentOutput)
where
    F: FnOnce() -> ComponentOutput + Send + 'static,
{
    let started = std::time::Instant::now();
    let handle = tokio::task::spawn_blocking(f);
    match tokio::time::timeout(COMPONENT_TIMEOUT, handle).await {
        Ok(Ok(mut output)) => {
            output.processing_time_ms = started.elapsed().as_millis() as u64;
            (name, output)
        }
        Ok(Err(join_err)) => (name, ComponentOutput::error(format!("component panicked: {join_err}"))),
        Err(_) => (name, ComponentOutput::error("component timed out after 30s")),
    }
}

/// Coefficient of variation (stddev / mean) across component scores,
/// used for the confidence one-band downshift (spec §4.10 step 6).
fn coefficient_of_variation(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    if mean == 0.0 {
        return 0.0;
    }
    let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / scores.len() as f64;
    variance.sqrt() / mean
}

impl MatchOrchestrator {
    pub fn new(cache: Arc<dyn KvTable<CacheEntry>>, matches: Arc<dyn KvTable<MatchResult>>) -> Self {
        Self { cache, matches }
    }

    fn cache_key(opportunity: &Opportunity, company: &CompanyProfile, weights: &ComponentWeights) -> String {
        let opp_hash = stable_content_hash(&serde_json::to_value(opportunity).unwrap_or_default());
        let company_hash = stable_content_hash(&serde_json::to_value(company).unwrap_or_default());
        let weights_hash = stable_content_hash(&serde_json::to_value(weights).unwrap_or_default());
        let material = match_cache_key_material(&opportunity.notice_id, &company.company_id, &opp_hash, &company_hash, &weights_hash);
        sha256_hex(material.as_bytes())
    }

    /// Runs the full pipeline: cache check → quick filter → parallel
    /// scoring fan-out → weighted combine → confidence → persist.
    pub async fn evaluate(
        &self,
        opportunity: &Opportunity,
        company: &CompanyProfile,
        weights: &ComponentWeights,
        cache_ttl_hours: u32,
        use_cache: bool,
        inputs: ScoringInputs,
        now: DateTime<Utc>,
    ) -> MatchResult {
        let cache_key = Self::cache_key(opportunity, company, weights);

        if use_cache {
            if let Some(entry) = self.cache.get(&cache_key).await {
                if entry.is_fresh(now) {
                    let mut cached = entry.result;
                    cached.cached = true;
                    return cached;
                }
            }
        }

        let started = std::time::Instant::now();
        let filter = quick_filter(opportunity, company, now);

        if !filter.is_potential_match {
            let result = MatchResult {
                company_id: company.company_id.clone(),
                opportunity_id: opportunity.notice_id.clone(),
                total_score: 0.0,
                confidence: Confidence::NoMatch,
                component_scores: Default::default(),
                match_reasons: vec![],
                non_match_reasons: vec!["failed initial compatibility screening".to_string()],
                recommendations: vec![],
                action_items: vec![],
                processing_time_ms: started.elapsed().as_millis() as u64,
                cached: false,
                created_at: now,
                updated_at: now,
            };
            self.persist(&cache_key, &result, cache_ttl_hours, now).await;
            return result;
        }

        let (main_vec, profile_vec, chunk_vecs, kw_opp, kw_co, award_usd, domain_sims) = (
            inputs.opportunity_main_vector,
            inputs.company_profile_vector,
            inputs.opportunity_chunk_vectors,
            inputs.opportunity_keyword_text,
            inputs.company_keyword_text,
            inputs.opportunity_award_usd,
            inputs.past_performance_domain_similarities,
        );

        let opp_naics = opportunity.naics_code.clone();
        let company_naics = company.naics_codes.clone();
        let opp_set_aside = opportunity.set_aside_code.clone();
        let company_certs = company.certifications.clone();
        let opp_state = opportunity.place_of_performance.state.clone();
        let remote_allowed = opportunity
            .description
            .as_deref()
            .map(|d| d.to_ascii_lowercase().contains("remote"))
            .unwrap_or(false);
        let company_states: Vec<String> = company.locations.iter().filter_map(|l| l.state.clone()).collect();
        let revenue_range = company.revenue_range;
        let employee_count = company.employee_count;
        let award_amount = opportunity.award.as_ref().and_then(|a| a.amount.clone());
        let past_performance_for_pp = company.past_performance.clone();
        let past_performance_for_recency = company.past_performance.clone();
        let opp_agency = opportunity.agency.clone();

        let results = tokio::join!(
            run_component("semantic_similarity", move || semantic_similarity::score(
                main_vec.as_deref(),
                profile_vec.as_deref(),
                &chunk_vecs,
            )),
            run_component("keyword_matching", move || keyword_match::score(&kw_opp, &kw_co)),
            run_component("naics_alignment", move || naics_alignment::score(opp_naics.as_deref(), &company_naics)),
            run_component("past_performance", move || past_performance::score(
                &past_performance_for_pp,
                opp_agency.as_deref(),
                award_usd,
                &domain_sims,
            )),
            run_component("certification_bonus", move || certification_bonus::score(
                opp_set_aside.as_deref(),
                &company_certs,
            )),
            run_component("geographic_match", move || geographic_match::score(
                opp_state.as_deref(),
                remote_allowed,
                &company_states,
            )),
            run_component("capacity_fit", move || capacity_fit::score(
                revenue_range,
                employee_count,
                award_amount.as_deref(),
            )),
            run_component("recency_factor", move || recency_factor::score(&past_performance_for_recency, now)),
        );

        let outputs: Vec<(&'static str, ComponentOutput)> =
            vec![results.0, results.1, results.2, results.3, results.4, results.5, results.6, results.7];

        let failed_count = outputs.iter().filter(|(_, o)| o.status == ComponentStatus::Error).count();

        let weight_pairs = [
            ("semantic_similarity", weights.semantic_similarity),
            ("keyword_matching", weights.keyword_matching),
            ("naics_alignment", weights.naics_alignment),
            ("past_performance", weights.past_performance),
            ("certification_bonus", weights.certification_bonus),
            ("geographic_match", weights.geographic_match),
            ("capacity_fit", weights.capacity_fit),
            ("recency_factor", weights.recency_factor),
        ];
        // Components that returned no signal (`no_data`/`error`) carry no
        // information either way, so the average renormalizes over the
        // weight of components that actually scored rather than diluting
        // the total against their full raw weight (spec §4.10: component
        // failures are logged and the orchestrator continues).
        let active_weight: f64 = outputs
            .iter()
            .filter(|(_, o)| o.status == ComponentStatus::Ok)
            .map(|(name, _)| weight_pairs.iter().find(|(n, _)| n == name).map(|(_, w)| *w).unwrap_or(0.0))
            .sum();
        let normalizer = if active_weight > 0.0 { 1.0 / active_weight } else { 0.0 };

        let mut component_scores = std::collections::BTreeMap::new();
        let mut weighted_total = 0.0;
        let mut raw_scores = Vec::with_capacity(outputs.len());
        let mut match_reasons = Vec::new();
        let mut recommendations = Vec::new();
        let mut action_items = Vec::new();

        for (name, output) in &outputs {
            let raw_weight = weight_pairs.iter().find(|(n, _)| n == name).map(|(_, w)| *w).unwrap_or(0.0);
            let is_scored = output.status == ComponentStatus::Ok;
            let weight = if is_scored { raw_weight * normalizer } else { 0.0 };
            weighted_total += weight * output.overall_score;

            if is_scored {
                raw_scores.push(output.overall_score);
                if output.overall_score >= 0.7 {
                    match_reasons.push(format!("{name} scored {:.2}", output.overall_score));
                }
                if output.overall_score < 0.4 {
                    action_items.push(format!("strengthen {name} before pursuing: {:.2}", output.overall_score));
                }
            }
            recommendations.extend(output.recommendations.clone());
            component_scores.insert(
                name.to_string(),
                ComponentScore { score: to_storable_score(output.overall_score), evidence: output.evidence.clone() },
            );
        }

        let total_score = to_storable_score(weighted_total);
        let mut confidence = Confidence::from_score(total_score);
        let cv = coefficient_of_variation(&raw_scores);
        if cv > 0.5 {
            confidence = confidence.downshift();
        }

        let mut non_match_reasons = Vec::new();
        if failed_count > MAX_FAILED_COMPONENTS_BEFORE_PARTIAL {
            confidence = confidence.min(Confidence::Low);
            non_match_reasons.push("partial_scoring".to_string());
        }

        if let Some(deadline) = opportunity.response_deadline {
            let days_left = (deadline - now).num_days();
            if days_left >= 0 && days_left <= 7 {
                action_items.push(format!("response deadline in {days_left} day(s): prioritize proposal prep"));
            }
        }

        recommendations.sort();
        recommendations.dedup();
        match_reasons.sort();
        action_items.sort();

        let result = MatchResult {
            company_id: company.company_id.clone(),
            opportunity_id: opportunity.notice_id.clone(),
            total_score,
            confidence,
            component_scores,
            match_reasons,
            non_match_reasons,
            recommendations,
            action_items,
            processing_time_ms: started.elapsed().as_millis() as u64,
            cached: false,
            created_at: now,
            updated_at: now,
        };

        self.persist(&cache_key, &result, cache_ttl_hours, now).await;
        result
    }

    async fn persist(&self, cache_key: &str, result: &MatchResult, ttl_hours: u32, now: DateTime<Utc>) {
        self.matches.upsert(match_result_key(&result.company_id, &result.opportunity_id), result.clone()).await;
        self.cache
            .upsert(cache_key.to_string(), CacheEntry { result: result.clone(), cached_at: now, ttl_hours })
            .await;
    }
}
