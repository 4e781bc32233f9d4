//! Geographic match component (spec §4.9): same-state, same-region, or
//! remote-allowed scoring between a company's locations and an
//! opportunity's place of performance.

use super::ComponentOutput;

/// Census-style region grouping, coarse enough to stand in for "adjacent
/// state or same region" without a full adjacency graph.
fn region_of(state: &str) -> Option<&'static str> {
    const NORTHEAST: &[&str] = &["CT", "ME", "MA", "NH", "RI", "VT", "NJ", "NY", "PA"];
    const MIDWEST: &[&str] = &["IL", "IN", "MI", "OH", "WI", "IA", "KS", "MN", "MO", "NE", "ND", "SD"];
    const SOUTH: &[&str] = &[
        "DE", "FL", "GA", "MD", "NC", "SC", "VA", "DC", "WV", "AL", "KY", "MS", "TN", "AR", "LA", "OK", "TX",
    ];
    const WEST: &[&str] = &["AZ", "CO", "ID", "MT", "NV", "NM", "UT", "WY", "AK", "CA", "HI", "OR", "WA"];

    let state = state.to_ascii_uppercase();
    if NORTHEAST.contains(&state.as_str()) {
        Some("northeast")
    } else if MIDWEST.contains(&state.as_str()) {
        Some("midwest")
    } else if SOUTH.contains(&state.as_str()) {
        Some("south")
    } else if WEST.contains(&state.as_str()) {
        Some("west")
    } else {
        None
    }
}

pub fn score(opportunity_state: Option<&str>, remote_allowed: bool, company_states: &[String]) -> ComponentOutput {
    if remote_allowed {
        return ComponentOutput::ok(1.0, serde_json::json!({ "reason": "opportunity allows remote performance" }));
    }

    let Some(opp_state) = opportunity_state.filter(|s| !s.is_empty()) else {
        return ComponentOutput::no_data(serde_json::json!({ "reason": "no place of performance state" }));
    };
    if company_states.is_empty() {
        return ComponentOutput::no_data(serde_json::json!({ "reason": "company has no registered locations" }));
    }

    let opp_state_upper = opp_state.to_ascii_uppercase();
    if company_states.iter().any(|s| s.eq_ignore_ascii_case(&opp_state_upper)) {
        return ComponentOutput::ok(1.0, serde_json::json!({ "match": "same_state", "state": opp_state_upper }));
    }

    let opp_region = region_of(&opp_state_upper);
    if let Some(opp_region) = opp_region {
        if company_states.iter().any(|s| region_of(s) == Some(opp_region)) {
            return ComponentOutput::ok(0.6, serde_json::json!({ "match": "same_region", "region": opp_region }));
        }
    }

    ComponentOutput::ok(0.2, serde_json::json!({ "match": "none", "opportunity_state": opp_state_upper }))
        .with_recommendations(vec!["consider a local subcontractor or partner near the place of performance".to_string()])
}
