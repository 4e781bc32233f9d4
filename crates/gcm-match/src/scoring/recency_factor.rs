//! Recency factor component (spec §4.9): exponential decay on the most
//! recent past-performance entry's end date.

use chrono::{DateTime, Utc};
use gcm_core::company::PastPerformanceEntry;

use super::ComponentOutput;

fn entry_date(entry: &PastPerformanceEntry) -> Option<DateTime<Utc>> {
    entry.period_end.or(entry.period_start)
}

pub fn score(past_performance: &[PastPerformanceEntry], now: DateTime<Utc>) -> ComponentOutput {
    let most_recent = past_performance
        .iter()
        .filter_map(|entry| entry_date(entry).map(|d| (entry, d)))
        .max_by_key(|(_, date)| *date);

    let Some((entry, date)) = most_recent else {
        return ComponentOutput::no_data(serde_json::json!({ "reason": "no dated past-performance entries" }));
    };

    let delta_days = (now - date).num_days().max(0) as f64;
    let score = (-delta_days / 365.0).exp().clamp(0.0, 1.0);

    ComponentOutput::ok(
        score,
        serde_json::json!({
            "most_recent_client": entry.client,
            "delta_days": delta_days,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entry(client: &str, end_days_ago: i64) -> PastPerformanceEntry {
        let now = Utc::now();
        PastPerformanceEntry {
            client: client.into(),
            description: "d".into(),
            value: None,
            period_start: None,
            period_end: Some(now - Duration::days(end_days_ago)),
        }
    }

    #[test]
    fn no_entries_yields_no_data() {
        let result = score(&[], Utc::now());
        assert_eq!(result.overall_score, 0.0);
    }

    #[test]
    fn very_recent_entry_scores_near_one() {
        let result = score(&[entry("Acme", 1)], Utc::now());
        assert!(result.overall_score > 0.99);
    }

    #[test]
    fn one_year_old_entry_scores_near_e_inverse() {
        let result = score(&[entry("Acme", 365)], Utc::now());
        assert!((result.overall_score - (-1.0f64).exp()).abs() < 0.01);
    }

    #[test]
    fn uses_the_most_recent_of_multiple_entries() {
        let result = score(&[entry("Old", 1000), entry("New", 10)], Utc::now());
        assert_eq!(result.evidence["most_recent_client"], serde_json::json!("New"));
    }
}
