//! Certification bonus component (spec §4.9): maps an opportunity's
//! set-aside code to the certifications it requires and scores how much
//! of that set the company holds.

use super::ComponentOutput;

/// Certifications required to be eligible for a given set-aside code.
/// Some codes require only one of several certifications (OR-sets); the
/// spec does not enumerate exact code->cert mappings, so this reflects
/// the common SAM.gov set-aside vocabulary.
pub(crate) fn required_certifications(set_aside_code: &str) -> &'static [&'static str] {
    let upper = set_aside_code.to_ascii_uppercase();
    match upper.as_str() {
        "8A" | "8(A)" => &["8(a)"],
        "WOSB" => &["WOSB"],
        "EDWOSB" => &["EDWOSB", "WOSB"],
        "SDVOSB" | "VOSB" => &["SDVOSB"],
        "HUBZONE" => &["HUBZone"],
        "SDB" => &["SDB"],
        _ if upper.contains("SMALL BUSINESS") => &["Small Business"],
        _ => &[],
    }
}

pub fn score(opportunity_set_aside_code: Option<&str>, company_certifications: &[String]) -> ComponentOutput {
    let Some(code) = opportunity_set_aside_code.filter(|c| !c.is_empty()) else {
        return ComponentOutput::ok(1.0, serde_json::json!({ "reason": "no set-aside restriction" }));
    };

    let required = required_certifications(code);
    if required.is_empty() {
        return ComponentOutput::no_data(serde_json::json!({ "reason": format!("unrecognized set-aside code {code}") }));
    }

    let matched: Vec<&str> = required
        .iter()
        .copied()
        .filter(|req| company_certifications.iter().any(|c| c.to_ascii_lowercase().contains(&req.to_ascii_lowercase())))
        .collect();

    let fraction = matched.len() as f64 / required.len() as f64;
    let fully_satisfied = matched.len() == required.len();
    let over_qualification_bonus = if fully_satisfied && company_certifications.len() > required.len() {
        0.05
    } else {
        0.0
    };
    let score = (fraction + over_qualification_bonus).min(1.0);

    let mut recommendations = Vec::new();
    if !fully_satisfied {
        let missing: Vec<&str> = required.iter().copied().filter(|r| !matched.contains(r)).collect();
        recommendations.push(format!("pursue certification(s): {}", missing.join(", ")));
    }

    ComponentOutput::ok(
        score,
        serde_json::json!({
            "set_aside_code": code,
            "required": required,
            "matched": matched,
        }),
    )
    .with_recommendations(recommendations)
}
