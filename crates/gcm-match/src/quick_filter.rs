//! Quick Filter (C8, spec §4.8): cheap boolean compatibility screen run
//! before the expensive scoring fan-out. Target <10ms per pair — every
//! check here is pure in-memory comparison, no I/O.

use gcm_core::company::CompanyProfile;
use gcm_core::opportunity::{derive_status, Opportunity, OpportunityStatus};
use serde::Serialize;

use crate::scoring::certification_bonus::required_certifications;

#[derive(Debug, Clone, Serialize)]
pub struct QuickFilterResult {
    pub is_potential_match: bool,
    pub filter_details: QuickFilterDetails,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuickFilterDetails {
    pub not_archived: bool,
    pub naics_prefix_overlap: bool,
    pub set_aside_eligible: bool,
    pub location_compatible: bool,
}

fn naics_two_digit_prefix(code: &str) -> Option<&str> {
    if code.len() >= 2 {
        Some(&code[..2])
    } else {
        None
    }
}

fn naics_prefix_overlap(opportunity_naics: Option<&str>, company_naics: &[String]) -> bool {
    let Some(opp_code) = opportunity_naics else { return true };
    let Some(opp_prefix) = naics_two_digit_prefix(opp_code) else { return true };
    if company_naics.is_empty() {
        return true;
    }
    company_naics
        .iter()
        .filter_map(|c| naics_two_digit_prefix(c))
        .any(|prefix| prefix == opp_prefix)
}

/// Uses the same set-aside -> required-certification mapping as the C9
/// certification-bonus component (spec §4.9) rather than requiring an
/// exact string match between the opportunity's set-aside code and a
/// company certification: an opportunity's `SetASide` field is free text
/// ("Small Business Set-Aside") and a company's certifications are a
/// short label ("Small Business"), so this checks substring containment
/// against the required set. A set-aside code this mapping doesn't
/// recognize is treated as open rather than automatically excluding the
/// company.
fn set_aside_eligible(set_aside_code: Option<&str>, certifications: &[String]) -> bool {
    let Some(code) = set_aside_code else { return true };
    if code.trim().is_empty() {
        return true;
    }
    let required = required_certifications(code);
    if required.is_empty() {
        return true;
    }
    required
        .iter()
        .any(|req| certifications.iter().any(|c| c.to_ascii_lowercase().contains(&req.to_ascii_lowercase())))
}

fn location_compatible(opportunity: &Opportunity, company: &CompanyProfile) -> bool {
    let Some(opp_state) = &opportunity.place_of_performance.state else { return true };
    if company.locations.is_empty() {
        return true;
    }
    company.locations.iter().any(|loc| loc.state.as_deref() == Some(opp_state.as_str()))
}

/// Runs the four fixed checks from spec §4.8 and combines them with
/// logical AND.
pub fn quick_filter(opportunity: &Opportunity, company: &CompanyProfile, now: chrono::DateTime<chrono::Utc>) -> QuickFilterResult {
    let (_, status) = derive_status(opportunity.archive_date, opportunity.response_deadline, opportunity.active, now);
    let not_archived = status != OpportunityStatus::Archived;

    let naics_overlap = naics_prefix_overlap(opportunity.naics_code.as_deref(), &company.naics_codes);
    let set_aside_ok = set_aside_eligible(opportunity.set_aside_code.as_deref(), &company.certifications);
    let location_ok = location_compatible(opportunity, company);

    let details = QuickFilterDetails {
        not_archived,
        naics_prefix_overlap: naics_overlap,
        set_aside_eligible: set_aside_ok,
        location_compatible: location_ok,
    };

    QuickFilterResult {
        is_potential_match: not_archived && naics_overlap && set_aside_ok && location_ok,
        filter_details: details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gcm_core::company::{CompanyLocation, CompanyEmbeddingMetadata, ContactInfo};
    use gcm_core::opportunity::{Contact, EmbeddingMetadata, PlaceOfPerformance, ProcessingStatus};

    fn opportunity(naics: Option<&str>, set_aside: Option<&str>, state: Option<&str>, archive_past: bool) -> Opportunity {
        let now = Utc::now();
        Opportunity {
            notice_id: "OPP-1".into(),
            title: "Title".into(),
            solicitation_number: None,
            department: None,
            agency: None,
            office: None,
            posted_date: now,
            response_deadline: None,
            archive_date: if archive_past { Some(now - chrono::Duration::days(1)) } else { None },
            notice_type: None,
            naics_code: naics.map(str::to_string),
            set_aside_code: set_aside.map(str::to_string),
            set_aside_label: None,
            place_of_performance: PlaceOfPerformance { state: state.map(str::to_string), ..Default::default() },
            award: None,
            primary_contact: Contact::default(),
            secondary_contact: Contact::default(),
            description: None,
            active: true,
            attachments: Vec::new(),
            embedding_metadata: EmbeddingMetadata::default(),
            processing_status: ProcessingStatus::Pending,
            error_message: None,
            retry_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn company(naics: &[&str], certs: &[&str], states: &[&str]) -> CompanyProfile {
        let now = Utc::now();
        CompanyProfile {
            company_id: "co-1".into(),
            tenant_id: "tenant-1".into(),
            legal_name: "Acme".into(),
            primary_contact: ContactInfo::default(),
            website_url: None,
            naics_codes: naics.iter().map(|s| s.to_string()).collect(),
            certifications: certs.iter().map(|s| s.to_string()).collect(),
            revenue_range: None,
            employee_count: None,
            locations: states.iter().map(|s| CompanyLocation { state: Some(s.to_string()), ..Default::default() }).collect(),
            capability_statement: None,
            past_performance: Vec::new(),
            documents: Vec::new(),
            embedding_metadata: CompanyEmbeddingMetadata::default(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn archived_opportunity_fails_filter() {
        let opp = opportunity(Some("541512"), None, None, true);
        let co = company(&["541512"], &[], &[]);
        let result = quick_filter(&opp, &co, Utc::now());
        assert!(!result.is_potential_match);
        assert!(!result.filter_details.not_archived);
    }

    #[test]
    fn naics_prefix_must_overlap() {
        let opp = opportunity(Some("541512"), None, None, false);
        let co = company(&["236220"], &[], &[]);
        let result = quick_filter(&opp, &co, Utc::now());
        assert!(!result.is_potential_match);
    }

    #[test]
    fn set_aside_required_and_missing_fails() {
        let opp = opportunity(Some("541512"), Some("8(a)"), None, false);
        let co = company(&["541512"], &[], &[]);
        let result = quick_filter(&opp, &co, Utc::now());
        assert!(!result.is_potential_match);
    }

    #[test]
    fn free_text_set_aside_matches_short_certification_label() {
        // Opportunity `SetASide` is free text; company certifications are
        // short labels. Eligibility must be checked via the set-aside ->
        // required-certification mapping, not exact string equality.
        let opp = opportunity(Some("541511"), Some("Small Business Set-Aside"), Some("VA"), false);
        let co = company(&["541511"], &["Small Business"], &["VA"]);
        let result = quick_filter(&opp, &co, Utc::now());
        assert!(result.is_potential_match);
        assert!(result.filter_details.set_aside_eligible);
    }

    #[test]
    fn fully_compatible_pair_passes() {
        let opp = opportunity(Some("541512"), Some("8(a)"), Some("TX"), false);
        let co = company(&["541512"], &["8(a)"], &["TX"]);
        let result = quick_filter(&opp, &co, Utc::now());
        assert!(result.is_potential_match);
    }

    #[test]
    fn no_location_constraint_passes_regardless_of_company_locations() {
        let opp = opportunity(Some("541512"), None, None, false);
        let co = company(&["541512"], &[], &["TX"]);
        let result = quick_filter(&opp, &co, Utc::now());
        assert!(result.filter_details.location_compatible);
    }
}
