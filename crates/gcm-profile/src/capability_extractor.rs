//! Capability-statement extractor (spec §4.7): company overview (name,
//! DUNS, CAGE, founded year), mission statement, core capabilities,
//! past-performance entries, certifications, contact info — regex pass
//! plus LLM enrichment for whatever the regexes leave blank.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::llm_fill::FieldExtractionLlm;
use crate::resume_extractor::PersonalInfo;

#[derive(Debug, Clone, Default, Serialize)]
pub struct CompanyOverview {
    pub name: Option<String>,
    pub duns: Option<String>,
    pub cage: Option<String>,
    pub founded_year: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CapabilityStatementExtraction {
    pub overview: CompanyOverview,
    pub mission_statement: Option<String>,
    pub core_capabilities: Vec<String>,
    pub past_performance: Vec<String>,
    pub certifications: Vec<String>,
    pub contact: PersonalInfo,
    pub confidence: f64,
}

fn duns_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)DUNS\s*#?\s*:?\s*(\d{9})").unwrap())
}

fn cage_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)CAGE\s*(?:code)?\s*#?\s*:?\s*([A-Z0-9]{5})").unwrap())
}

fn founded_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)founded\s+(?:in\s+)?((?:19|20)\d{2})").unwrap())
}

fn company_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?m)^([A-Z][\w&.,' -]{2,60}(?:Inc\.?|LLC|Corp\.?|Corporation|Company|Co\.|Group))\b").unwrap())
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[\w.+-]+@[\w-]+\.[\w.-]+").unwrap())
}

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\+?1[\s.-]?)?\(?\d{3}\)?[\s.-]?\d{3}[\s.-]?\d{4}").unwrap())
}

fn section(text: &str, header: &Regex, stop_at_blank_line: bool) -> Option<String> {
    let mut lines = text.lines();
    let mut body = String::new();
    let mut in_section = false;
    for line in &mut lines {
        let trimmed = line.trim();
        if header.is_match(trimmed) {
            in_section = true;
            continue;
        }
        if in_section {
            if trimmed.is_empty() {
                if stop_at_blank_line {
                    break;
                }
                continue;
            }
            // Another ALL-CAPS-ish header line ends the section.
            if trimmed.chars().filter(|c| c.is_alphabetic()).all(|c| c.is_uppercase()) && trimmed.len() > 3 {
                break;
            }
            body.push_str(trimmed);
            body.push('\n');
        }
    }
    if body.trim().is_empty() {
        None
    } else {
        Some(body.trim().to_string())
    }
}

fn mission_header() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)^mission(\s+statement)?\s*:?$").unwrap())
}

fn capabilities_header() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)^core capabilities\s*:?$").unwrap())
}

fn past_performance_header() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)^past performance\s*:?$").unwrap())
}

fn certifications_header() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)^certifications?\s*:?$").unwrap())
}

fn split_list(body: &str) -> Vec<String> {
    body.split(|c: char| c == '\n' || c == ';')
        .flat_map(|line| line.split(", "))
        .map(|s| s.trim_start_matches(['-', '*', '\u{2022}']).trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn base_confidence(extraction: &CapabilityStatementExtraction) -> f64 {
    let checks = [
        extraction.overview.name.is_some(),
        extraction.mission_statement.is_some(),
        !extraction.core_capabilities.is_empty(),
        !extraction.past_performance.is_empty(),
    ];
    checks.iter().filter(|ok| **ok).count() as f64 / checks.len() as f64
}

pub async fn extract_capability_statement(text: &str, llm: &dyn FieldExtractionLlm) -> CapabilityStatementExtraction {
    let mut extraction = CapabilityStatementExtraction {
        overview: CompanyOverview {
            name: company_name_pattern().find(text).map(|m| m.as_str().trim().to_string()),
            duns: duns_pattern().captures(text).and_then(|c| c.get(1)).map(|m| m.as_str().to_string()),
            cage: cage_pattern().captures(text).and_then(|c| c.get(1)).map(|m| m.as_str().to_string()),
            founded_year: founded_pattern().captures(text).and_then(|c| c.get(1)).map(|m| m.as_str().to_string()),
        },
        mission_statement: section(text, mission_header(), true),
        core_capabilities: section(text, capabilities_header(), false).map(|s| split_list(&s)).unwrap_or_default(),
        past_performance: section(text, past_performance_header(), false).map(|s| split_list(&s)).unwrap_or_default(),
        certifications: section(text, certifications_header(), false).map(|s| split_list(&s)).unwrap_or_default(),
        contact: PersonalInfo {
            full_name: None,
            email: email_pattern().find(text).map(|m| m.as_str().to_string()),
            phone: phone_pattern().find(text).map(|m| m.as_str().to_string()),
            linkedin: None,
            address: None,
        },
        confidence: 0.0,
    };

    let mut missing = Vec::new();
    if extraction.overview.name.is_none() {
        missing.push("overview.name".to_string());
    }
    if extraction.mission_statement.is_none() {
        missing.push("mission_statement".to_string());
    }
    if !missing.is_empty() {
        if let Ok(filled) = llm.fill_missing_fields(text, &missing).await {
            if extraction.overview.name.is_none() {
                extraction.overview.name = filled.get("overview.name").cloned();
            }
            if extraction.mission_statement.is_none() {
                extraction.mission_statement = filled.get("mission_statement").cloned();
            }
        }
    }

    extraction.confidence = base_confidence(&extraction);
    extraction
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_fill::NullFieldExtractionLlm;

    fn sample_capability_statement() -> &'static str {
        "Acme Corp\nDUNS: 123456789\nCAGE Code: 1AB23\nFounded in 2005\n\n\
         MISSION\nTo deliver secure, resilient software to federal agencies.\n\n\
         CORE CAPABILITIES\nCloud migration\nCybersecurity\nDevSecOps pipelines\n\n\
         PAST PERFORMANCE\nDoD network modernization, 2021-2023\nDHS cloud migration, 2019-2021\n\n\
         CERTIFICATIONS\n8(a), ISO 27001\n\n\
         Contact: info@acmecorp.com, (555) 222-3333\n"
    }

    #[tokio::test]
    async fn extracts_overview_identifiers() {
        let extraction = extract_capability_statement(sample_capability_statement(), &NullFieldExtractionLlm).await;
        assert_eq!(extraction.overview.duns.as_deref(), Some("123456789"));
        assert_eq!(extraction.overview.cage.as_deref(), Some("1AB23"));
        assert_eq!(extraction.overview.founded_year.as_deref(), Some("2005"));
    }

    #[tokio::test]
    async fn extracts_mission_and_capabilities() {
        let extraction = extract_capability_statement(sample_capability_statement(), &NullFieldExtractionLlm).await;
        assert!(extraction.mission_statement.unwrap().contains("secure, resilient software"));
        assert!(extraction.core_capabilities.contains(&"Cloud migration".to_string()));
        assert_eq!(extraction.past_performance.len(), 2);
        assert!(extraction.certifications.contains(&"8(a)".to_string()));
    }

    #[tokio::test]
    async fn confidence_reflects_completeness() {
        let full = extract_capability_statement(sample_capability_statement(), &NullFieldExtractionLlm).await;
        let sparse = extract_capability_statement("We do things.", &NullFieldExtractionLlm).await;
        assert!(full.confidence > sparse.confidence);
    }
}
