//! NAICS alignment component (spec §4.9): prefix-overlap scoring, taking
//! the maximum match across the company's full NAICS set.

use super::ComponentOutput;

fn common_prefix_len(a: &str, b: &str) -> usize {
    a.bytes().zip(b.bytes()).take_while(|(x, y)| x == y).count()
}

fn prefix_score(opportunity_code: &str, company_code: &str) -> f64 {
    match common_prefix_len(opportunity_code, company_code) {
        n if n >= 6 => 1.0,
        5 => 0.8,
        4 => 0.6,
        3 => 0.4,
        2 => 0.2,
        _ => 0.0,
    }
}

pub fn score(opportunity_naics: Option<&str>, company_naics_codes: &[String]) -> ComponentOutput {
    let Some(opp_code) = opportunity_naics.filter(|c| !c.is_empty()) else {
        return ComponentOutput::no_data(serde_json::json!({ "reason": "opportunity has no naics_code" }));
    };
    if company_naics_codes.is_empty() {
        return ComponentOutput::no_data(serde_json::json!({ "reason": "company has no naics_codes" }));
    }

    let best = company_naics_codes
        .iter()
        .map(|c| (c.as_str(), prefix_score(opp_code, c)))
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
        .unwrap();

    let mut recommendations = Vec::new();
    if best.1 < 0.6 {
        recommendations.push(format!("add or update a NAICS code closer to {opp_code}"));
    }

    ComponentOutput::ok(
        best.1,
        serde_json::json!({
            "opportunity_naics": opp_code,
            "best_company_naics": best.0,
        }),
    )
    .with_recommendations(recommendations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_six_digit_match_scores_one() {
        let result = score(Some("541512"), &["541512".to_string()]);
        assert_eq!(result.overall_score, 1.0);
    }

    #[test]
    fn five_digit_prefix_scores_point_eight() {
        let result = score(Some("541512"), &["541519".to_string()]);
        assert_eq!(result.overall_score, 0.8);
    }

    #[test]
    fn no_shared_prefix_scores_zero() {
        let result = score(Some("541512"), &["236220".to_string()]);
        assert_eq!(result.overall_score, 0.0);
    }

    #[test]
    fn takes_max_over_companys_naics_set() {
        let result = score(Some("541512"), &["236220".to_string(), "541519".to_string()]);
        assert_eq!(result.overall_score, 0.8);
    }

    #[test]
    fn missing_opportunity_naics_is_no_data() {
        let result = score(None, &["541512".to_string()]);
        assert_eq!(result.overall_score, 0.0);
    }
}
