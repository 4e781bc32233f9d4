//! Text-segment composition (spec §4.5 step 4, Glossary). Six segments
//! are derived from one `Opportunity`: `main`, `title`, `description`,
//! `agency`, `location`, `classification`.

use gcm_core::opportunity::Opportunity;

fn naics_or_blank(naics: &Option<String>) -> &str {
    naics.as_deref().unwrap_or("")
}

fn set_aside_label_or_blank(opp: &Opportunity) -> &str {
    opp.set_aside_label.as_deref().or(opp.set_aside_code.as_deref()).unwrap_or("")
}

fn city_state(opp: &Opportunity) -> String {
    match (&opp.place_of_performance.city, &opp.place_of_performance.state) {
        (Some(city), Some(state)) => format!("{city}, {state}"),
        (Some(city), None) => city.clone(),
        (None, Some(state)) => state.clone(),
        (None, None) => String::new(),
    }
}

/// `title ∥ description ∥ department ∥ office ∥ NAICS ∥ set-aside ∥ city, state`,
/// newline-joined, blank fields omitted.
pub fn main_segment(opp: &Opportunity) -> String {
    let parts = [
        Some(opp.title.as_str()),
        opp.description.as_deref(),
        opp.department.as_deref(),
        opp.office.as_deref(),
        opp.naics_code.as_deref(),
        Some(set_aside_label_or_blank(opp)),
        Some(city_state(opp).as_str()),
    ];
    parts
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn title_segment(opp: &Opportunity) -> String {
    opp.title.trim().to_string()
}

pub fn description_segment(opp: &Opportunity) -> String {
    opp.description.as_deref().unwrap_or("").trim().to_string()
}

/// `"<department> - <office>"`.
pub fn agency_segment(opp: &Opportunity) -> String {
    match (&opp.department, &opp.office) {
        (Some(dept), Some(office)) => format!("{dept} - {office}"),
        (Some(dept), None) => dept.clone(),
        (None, Some(office)) => office.clone(),
        (None, None) => String::new(),
    }
}

pub fn location_segment(opp: &Opportunity) -> String {
    city_state(opp)
}

/// `"NAICS: <code> - <set-aside>"`.
pub fn classification_segment(opp: &Opportunity) -> String {
    let naics = naics_or_blank(&opp.naics_code);
    let set_aside = set_aside_label_or_blank(opp);
    if naics.is_empty() && set_aside.is_empty() {
        String::new()
    } else {
        format!("NAICS: {naics} - {set_aside}")
    }
}

pub fn all_segments(opp: &Opportunity) -> Vec<(&'static str, String)> {
    vec![
        ("main", main_segment(opp)),
        ("title", title_segment(opp)),
        ("description", description_segment(opp)),
        ("agency", agency_segment(opp)),
        ("location", location_segment(opp)),
        ("classification", classification_segment(opp)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gcm_core::opportunity::{Contact, EmbeddingMetadata, PlaceOfPerformance, ProcessingStatus};

    fn sample() -> Opportunity {
        Opportunity {
            notice_id: "OPP-1".into(),
            title: "Network Modernization".into(),
            solicitation_number: None,
            department: Some("DoD".into()),
            agency: Some("DoD".into()),
            office: Some("Army Contracting".into()),
            posted_date: Utc::now(),
            response_deadline: None,
            archive_date: None,
            notice_type: None,
            naics_code: Some("541512".into()),
            set_aside_code: Some("SBA".into()),
            set_aside_label: Some("Small Business".into()),
            place_of_performance: PlaceOfPerformance { city: Some("Austin".into()), state: Some("TX".into()), ..Default::default() },
            award: None,
            primary_contact: Contact::default(),
            secondary_contact: Contact::default(),
            description: Some("Upgrade network infrastructure across three sites.".into()),
            active: true,
            attachments: Vec::new(),
            embedding_metadata: EmbeddingMetadata::default(),
            processing_status: ProcessingStatus::Pending,
            error_message: None,
            retry_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn main_segment_joins_with_newlines_and_skips_blanks() {
        let opp = sample();
        let segment = main_segment(&opp);
        assert!(segment.contains("Network Modernization"));
        assert!(segment.contains("Austin, TX"));
        assert!(segment.lines().count() >= 6);
    }

    #[test]
    fn agency_segment_joins_department_and_office() {
        let opp = sample();
        assert_eq!(agency_segment(&opp), "DoD - Army Contracting");
    }

    #[test]
    fn classification_segment_includes_naics_and_set_aside() {
        let opp = sample();
        assert_eq!(classification_segment(&opp), "NAICS: 541512 - Small Business");
    }

    #[test]
    fn location_segment_is_city_comma_state() {
        let opp = sample();
        assert_eq!(location_segment(&opp), "Austin, TX");
    }

    #[test]
    fn all_segments_returns_six_named_segments() {
        let opp = sample();
        assert_eq!(all_segments(&opp).len(), 6);
    }
}
