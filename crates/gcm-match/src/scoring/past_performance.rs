//! Past performance component (spec §4.9): per-entry agency match +
//! dollar-scale proximity + semantic domain similarity, aggregated with a
//! diminishing-returns sum so many weak-but-relevant entries still add up
//! without ever exceeding 1.0.

use gcm_core::company::PastPerformanceEntry;
use rust_decimal::prelude::ToPrimitive;

use super::ComponentOutput;

/// Log-scale span (decades) past which dollar-scale proximity floors to
/// zero, mirroring the capacity-fit component's deviation normalization.
const DOLLAR_LOG_SCALE_SPAN: f64 = 3.0;

fn agency_match(entry: &PastPerformanceEntry, opportunity_agency: Option<&str>) -> Option<f64> {
    let agency = opportunity_agency?;
    let agency_lower = agency.to_ascii_lowercase();
    let client_lower = entry.client.to_ascii_lowercase();
    Some(if client_lower.contains(&agency_lower) || agency_lower.contains(&client_lower) {
        1.0
    } else {
        0.0
    })
}

fn dollar_proximity(entry: &PastPerformanceEntry, opportunity_award_usd: Option<f64>) -> Option<f64> {
    let entry_value = entry.value.and_then(|v| v.to_f64())?;
    let opp_value = opportunity_award_usd?;
    if entry_value <= 0.0 || opp_value <= 0.0 {
        return None;
    }
    let deviation = (entry_value.log10() - opp_value.log10()).abs() / DOLLAR_LOG_SCALE_SPAN;
    Some((1.0 - deviation).clamp(0.0, 1.0))
}

/// `domain_similarities[i]` is the caller-supplied semantic similarity
/// between `past_performance[i]`'s description embedding and the
/// opportunity's main embedding (computed once by the orchestrator and
/// reused here rather than re-embedding per component).
pub fn score(
    past_performance: &[PastPerformanceEntry],
    opportunity_agency: Option<&str>,
    opportunity_award_usd: Option<f64>,
    domain_similarities: &[f64],
) -> ComponentOutput {
    if past_performance.is_empty() {
        return ComponentOutput::no_data(serde_json::json!({ "reason": "no past-performance entries" }));
    }

    let mut per_entry_scores = Vec::with_capacity(past_performance.len());
    for (i, entry) in past_performance.iter().enumerate() {
        let domain = domain_similarities.get(i).copied();
        let signals: Vec<f64> = [agency_match(entry, opportunity_agency), dollar_proximity(entry, opportunity_award_usd), domain]
            .into_iter()
            .flatten()
            .collect();
        let entry_score = if signals.is_empty() {
            0.0
        } else {
            signals.iter().sum::<f64>() / signals.len() as f64
        };
        per_entry_scores.push(entry_score);
    }

    let product_of_complements: f64 = per_entry_scores.iter().map(|s| 1.0 - s).product();
    let aggregate = (1.0 - product_of_complements).clamp(0.0, 1.0);

    let mut recommendations = Vec::new();
    if aggregate < 0.3 {
        recommendations.push("add past-performance entries with this agency or comparable contract scale".to_string());
    }

    ComponentOutput::ok(
        aggregate,
        serde_json::json!({
            "entries_considered": per_entry_scores.len(),
            "per_entry_scores": per_entry_scores,
        }),
    )
    .with_recommendations(recommendations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn entry(client: &str, value: Option<i64>) -> PastPerformanceEntry {
        PastPerformanceEntry {
            client: client.into(),
            description: "description".into(),
            value: value.map(Decimal::from),
            period_start: None,
            period_end: None,
        }
    }

    #[test]
    fn no_entries_is_no_data() {
        let result = score(&[], Some("GSA"), Some(1_000_000.0), &[]);
        assert_eq!(result.overall_score, 0.0);
    }

    #[test]
    fn single_strong_entry_scores_reasonably_high() {
        let result = score(&[entry("General Services Administration", Some(1_000_000))], Some("GSA"), Some(1_000_000.0), &[0.9]);
        assert!(result.overall_score > 0.6);
    }

    #[test]
    fn aggregate_never_exceeds_one_with_many_entries() {
        let entries: Vec<_> = (0..10).map(|i| entry(&format!("GSA-{i}"), Some(1_000_000))).collect();
        let sims = vec![0.95; 10];
        let result = score(&entries, Some("GSA"), Some(1_000_000.0), &sims);
        assert!(result.overall_score <= 1.0);
    }

    #[test]
    fn diminishing_returns_two_entries_beat_one() {
        let one = score(&[entry("A", Some(500_000))], None, None, &[0.5]);
        let two = score(&[entry("A", Some(500_000)), entry("B", Some(500_000))], None, None, &[0.5, 0.5]);
        assert!(two.overall_score > one.overall_score);
    }
}
