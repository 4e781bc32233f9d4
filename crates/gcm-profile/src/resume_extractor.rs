//! Resume extractor (spec §4.7): regex-based extraction of contact
//! fields, section detection, years-of-experience arithmetic over parsed
//! date ranges, and an LLM pass that fills whatever the regexes missed.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::llm_fill::FieldExtractionLlm;

#[derive(Debug, Clone, Default, Serialize)]
pub struct PersonalInfo {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExperienceEntry {
    pub title: Option<String>,
    pub company: Option<String>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub is_current: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EducationEntry {
    pub degree: Option<String>,
    pub institution: Option<String>,
    pub graduation_year: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ResumeExtraction {
    pub personal_info: PersonalInfo,
    pub summary: Option<String>,
    pub skills: Vec<String>,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub certifications: Vec<String>,
    pub years_of_experience: f64,
    pub confidence: f64,
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[\w.+-]+@[\w-]+\.[\w.-]+").unwrap())
}

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\+?1[\s.-]?)?\(?\d{3}\)?[\s.-]?\d{3}[\s.-]?\d{4}").unwrap())
}

fn linkedin_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)linkedin\.com/in/[\w-]+").unwrap())
}

fn name_line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z][a-z]+(?:\s[A-Z][a-z.]+){1,2}$").unwrap())
}

fn address_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d+\s[\w\s]+,\s*[A-Z]{2}\s*\d{5}").unwrap())
}

/// Matches `Title, Company, 2020 - Present` / `Title at Company, 2018-2021`.
fn experience_line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^(?P<title>[^,/]+?)\s*(?:,|/|\bat\b)\s*(?P<company>[^,/]+?)\s*[,/]?\s*(?P<start>(?:19|20)\d{2})\s*[-\x{2013}]\s*(?P<end>(?:19|20)\d{2}|present)")
            .unwrap()
    })
}

/// Matches `Bachelor of Science in Computer Science, University of Virginia, 2016`.
fn education_line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(?P<degree>(?:bachelor|master|associate|ph\.?d|doctorate)[^,]*),\s*(?P<institution>[^,]+),\s*(?P<year>(?:19|20)\d{2})")
            .unwrap()
    })
}

fn section_headers() -> &'static [(&'static str, Regex)] {
    static PATTERNS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vec![
            ("summary", Regex::new(r"(?i)^(summary|objective|profile)\s*:?$").unwrap()),
            ("skills", Regex::new(r"(?i)^(skills|technical skills|core competencies)\s*:?$").unwrap()),
            ("education", Regex::new(r"(?i)^education\s*:?$").unwrap()),
            ("experience", Regex::new(r"(?i)^(experience|work experience|professional experience)\s*:?$").unwrap()),
            ("certifications", Regex::new(r"(?i)^(certifications?|licenses)\s*:?$").unwrap()),
        ]
    })
}

fn split_sections(text: &str) -> BTreeMap<&'static str, String> {
    let mut sections: BTreeMap<&'static str, String> = BTreeMap::new();
    let mut current: Option<&'static str> = None;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some((name, _)) = section_headers().iter().find(|(_, re)| re.is_match(trimmed)) {
            current = Some(name);
            continue;
        }
        if let Some(name) = current {
            let entry = sections.entry(name).or_default();
            entry.push_str(trimmed);
            entry.push('\n');
        }
    }
    sections
}

fn extract_name(text: &str) -> Option<String> {
    text.lines().take(5).map(str::trim).find(|line| name_line_pattern().is_match(line)).map(str::to_string)
}

fn parse_experience(section: &str) -> Vec<ExperienceEntry> {
    section
        .lines()
        .filter_map(|line| experience_line_pattern().captures(line))
        .map(|caps| {
            let end_raw = caps.name("end").unwrap().as_str();
            let is_current = end_raw.eq_ignore_ascii_case("present");
            ExperienceEntry {
                title: Some(caps.name("title").unwrap().as_str().trim().to_string()),
                company: Some(caps.name("company").unwrap().as_str().trim().to_string()),
                start_year: caps.name("start").unwrap().as_str().parse().ok(),
                end_year: if is_current { None } else { end_raw.parse().ok() },
                is_current,
            }
        })
        .collect()
}

fn parse_education(section: &str) -> Vec<EducationEntry> {
    section
        .lines()
        .filter_map(|line| education_line_pattern().captures(line))
        .map(|caps| EducationEntry {
            degree: Some(caps.name("degree").unwrap().as_str().trim().to_string()),
            institution: Some(caps.name("institution").unwrap().as_str().trim().to_string()),
            graduation_year: Some(caps.name("year").unwrap().as_str().to_string()),
        })
        .collect()
}

fn parse_skills_or_certifications(section: &str) -> Vec<String> {
    section
        .split(|c: char| c == ',' || c == '\n' || c == ';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn current_year() -> i32 {
    chrono::Utc::now().format("%Y").to_string().parse().unwrap_or(2026)
}

fn years_of_experience(entries: &[ExperienceEntry]) -> f64 {
    let this_year = current_year();
    entries
        .iter()
        .filter_map(|entry| {
            let start = entry.start_year?;
            let end = if entry.is_current { this_year } else { entry.end_year.unwrap_or(start) };
            Some((end - start).max(0) as f64)
        })
        .sum()
}

fn base_confidence(extraction: &ResumeExtraction) -> f64 {
    let checks = [
        extraction.personal_info.full_name.is_some(),
        extraction.personal_info.email.is_some() || extraction.personal_info.phone.is_some(),
        !extraction.experience.is_empty(),
        !extraction.education.is_empty(),
    ];
    checks.iter().filter(|ok| **ok).count() as f64 / checks.len() as f64
}

/// Runs the deterministic regex/section pass, then fills whatever is
/// still missing via `llm` (spec §4.7: "an LLM pass fills gaps").
pub async fn extract_resume(text: &str, llm: &dyn FieldExtractionLlm) -> ResumeExtraction {
    let sections = split_sections(text);

    let mut extraction = ResumeExtraction {
        personal_info: PersonalInfo {
            full_name: extract_name(text),
            email: email_pattern().find(text).map(|m| m.as_str().to_string()),
            phone: phone_pattern().find(text).map(|m| m.as_str().to_string()),
            linkedin: linkedin_pattern().find(text).map(|m| m.as_str().to_string()),
            address: address_pattern().find(text).map(|m| m.as_str().to_string()),
        },
        summary: sections.get("summary").map(|s| s.trim().to_string()),
        skills: sections.get("skills").map(|s| parse_skills_or_certifications(s)).unwrap_or_default(),
        experience: sections.get("experience").map(|s| parse_experience(s)).unwrap_or_else(|| parse_experience(text)),
        education: sections.get("education").map(|s| parse_education(s)).unwrap_or_else(|| parse_education(text)),
        certifications: sections.get("certifications").map(|s| parse_skills_or_certifications(s)).unwrap_or_default(),
        years_of_experience: 0.0,
        confidence: 0.0,
    };
    extraction.years_of_experience = years_of_experience(&extraction.experience);

    let mut missing = Vec::new();
    if extraction.personal_info.full_name.is_none() {
        missing.push("personal_info.full_name".to_string());
    }
    if extraction.personal_info.email.is_none() {
        missing.push("personal_info.email".to_string());
    }
    if extraction.summary.is_none() {
        missing.push("summary".to_string());
    }

    if !missing.is_empty() {
        if let Ok(filled) = llm.fill_missing_fields(text, &missing).await {
            if extraction.personal_info.full_name.is_none() {
                extraction.personal_info.full_name = filled.get("personal_info.full_name").cloned();
            }
            if extraction.personal_info.email.is_none() {
                extraction.personal_info.email = filled.get("personal_info.email").cloned();
            }
            if extraction.summary.is_none() {
                extraction.summary = filled.get("summary").cloned();
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

    fn sample_resume() -> &'static str {
        "John Doe\njohn.doe@example.com | (555) 123-4567\n\n\
         Summary\nSenior software engineer with a decade of full-stack experience.\n\n\
         Experience\nSenior Software Engineer, Tech Corp, 2020-Present\nSoftware Engineer, Prior Co, 2016-2020\n\n\
         Education\nBachelor of Science in Computer Science, University of Virginia, 2016\n\n\
         Skills\nRust, AWS, Kubernetes\n"
    }

    #[tokio::test]
    async fn extracts_name_contact_and_experience() {
        let extraction = extract_resume(sample_resume(), &NullFieldExtractionLlm).await;
        assert_eq!(extraction.personal_info.full_name.as_deref(), Some("John Doe"));
        assert_eq!(extraction.personal_info.email.as_deref(), Some("john.doe@example.com"));
        assert_eq!(extraction.experience[0].company.as_deref(), Some("Tech Corp"));
        assert_eq!(extraction.education[0].graduation_year.as_deref(), Some("2016"));
    }

    #[tokio::test]
    async fn sums_years_of_experience_across_entries() {
        let extraction = extract_resume(sample_resume(), &NullFieldExtractionLlm).await;
        assert!(extraction.years_of_experience >= 9.0);
    }

    #[tokio::test]
    async fn confidence_reflects_how_many_fields_were_found() {
        let extraction = extract_resume(sample_resume(), &NullFieldExtractionLlm).await;
        assert!(extraction.confidence >= 0.75);

        let sparse = extract_resume("Some unrelated document with no structure.", &NullFieldExtractionLlm).await;
        assert!(sparse.confidence < extraction.confidence);
    }
}
