//! Capacity fit component (spec §4.9): compares a company's declared
//! revenue band and headcount to the opportunity's size indicators (award
//! amount if present, otherwise a generic agency-norm default), via
//! `score = 1 - normalized deviation` on a log scale.

use gcm_core::company::{EmployeeCount, RevenueRange};
use std::str::FromStr;

use super::ComponentOutput;

/// Default contract size assumed when the opportunity carries no award
/// amount yet (spec: "agency norms otherwise"). Mid-size federal IT
/// service contracts cluster around this order of magnitude.
const AGENCY_NORM_DEFAULT_USD: f64 = 500_000.0;

/// Log-scale span over which deviation is normalized to [0, 1]. Revenue
/// bands here span roughly $500K to $150M, i.e. about 5.5 decades.
const LOG_SCALE_SPAN: f64 = 5.5;

fn revenue_band_midpoint(range: RevenueRange) -> f64 {
    match range {
        RevenueRange::Under1M => 500_000.0,
        RevenueRange::OneToFiveM => 3_000_000.0,
        RevenueRange::FiveToTwentyFiveM => 15_000_000.0,
        RevenueRange::TwentyFiveToHundredM => 60_000_000.0,
        RevenueRange::OverHundredM => 150_000_000.0,
    }
}

fn employee_band_capacity_usd(count: EmployeeCount) -> f64 {
    match count {
        EmployeeCount::Under10 => 500_000.0,
        EmployeeCount::TenTo49 => 3_000_000.0,
        EmployeeCount::FiftyTo249 => 15_000_000.0,
        EmployeeCount::TwoFiftyTo999 => 60_000_000.0,
        EmployeeCount::OneThousandPlus => 150_000_000.0,
    }
}

fn opportunity_size_indicator(award_amount: Option<&str>) -> f64 {
    award_amount
        .and_then(|raw| {
            let cleaned: String = raw.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
            f64::from_str(&cleaned).ok()
        })
        .filter(|v| *v > 0.0)
        .unwrap_or(AGENCY_NORM_DEFAULT_USD)
}

pub fn score(
    revenue_range: Option<RevenueRange>,
    employee_count: Option<EmployeeCount>,
    award_amount: Option<&str>,
) -> ComponentOutput {
    if revenue_range.is_none() && employee_count.is_none() {
        return ComponentOutput::no_data(serde_json::json!({ "reason": "no revenue_range or employee_count on profile" }));
    }

    let opportunity_size = opportunity_size_indicator(award_amount);
    let company_capacity = match (revenue_range, employee_count) {
        (Some(r), Some(e)) => (revenue_band_midpoint(r) + employee_band_capacity_usd(e)) / 2.0,
        (Some(r), None) => revenue_band_midpoint(r),
        (None, Some(e)) => employee_band_capacity_usd(e),
        (None, None) => unreachable!(),
    };

    let deviation = (company_capacity.log10() - opportunity_size.log10()).abs() / LOG_SCALE_SPAN;
    let score = (1.0 - deviation).clamp(0.0, 1.0);

    let mut recommendations = Vec::new();
    if score < 0.5 {
        recommendations.push("this opportunity's scale may be a poor fit for the company's current capacity".to_string());
    }

    ComponentOutput::ok(
        score,
        serde_json::json!({
            "company_capacity_usd": company_capacity,
            "opportunity_size_usd": opportunity_size,
            "used_agency_norm_default": award_amount.is_none(),
        }),
    )
    .with_recommendations(recommendations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_profile_data_is_no_data() {
        let result = score(None, None, None);
        assert_eq!(result.overall_score, 0.0);
    }

    #[test]
    fn closely_matched_scale_scores_high() {
        let result = score(Some(RevenueRange::FiveToTwentyFiveM), None, Some("$14,500,000"));
        assert!(result.overall_score > 0.8);
    }

    #[test]
    fn wildly_mismatched_scale_scores_low() {
        let result = score(Some(RevenueRange::Under1M), None, Some("$200,000,000"));
        assert!(result.overall_score < 0.5);
    }

    #[test]
    fn no_award_amount_falls_back_to_agency_norm() {
        let result = score(Some(RevenueRange::Under1M), None, None);
        assert_eq!(result.evidence["used_agency_norm_default"], serde_json::json!(true));
    }
}
