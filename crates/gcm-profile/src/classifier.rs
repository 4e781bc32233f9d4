//! Document classifier (spec §4.7): blends a filename-substring signal,
//! corpus keyword density, structural indicators, and an LLM
//! probability vector (weights 0.2/0.4/0.2/0.2) into a per-category
//! score, then reports the winning category with a confidence band.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use gcm_embed::TextClassifierLlm;
use regex::Regex;
use serde::Serialize;

const FILENAME_WEIGHT: f64 = 0.2;
const KEYWORD_WEIGHT: f64 = 0.4;
const STRUCTURAL_WEIGHT: f64 = 0.2;
const LLM_WEIGHT: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ClassificationConfidence {
    Other,
    Low,
    Medium,
    High,
}

impl ClassificationConfidence {
    fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            Self::High
        } else if score >= 0.6 {
            Self::Medium
        } else if score >= 0.4 {
            Self::Low
        } else {
            Self::Other
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassificationResult {
    pub primary_category: String,
    pub confidence: ClassificationConfidence,
    pub scores: BTreeMap<String, f64>,
}

fn category_keywords() -> &'static [(&'static str, &'static [&'static str])] {
    &[
        ("team-resumes", &["resume", "curriculum vitae", "experience", "education", "skills", "objective"]),
        (
            "capability-statements",
            &["capability statement", "core capabilities", "company overview", "past performance", "naics", "duns", "cage"],
        ),
        ("certifications", &["certificate", "certification", "certified", "license"]),
        ("financials", &["balance sheet", "income statement", "revenue", "fiscal year", "audited"]),
    ]
}

fn filename_score(filename: &str, keywords: &[&str]) -> f64 {
    let lower = filename.to_ascii_lowercase();
    if keywords.iter().any(|k| lower.contains(k)) {
        1.0
    } else {
        0.0
    }
}

fn keyword_density_score(text: &str, keywords: &[&str]) -> f64 {
    let lower = text.to_ascii_lowercase();
    let words = lower.split_whitespace().count().max(1);
    let hits: usize = keywords.iter().map(|k| lower.matches(k).count()).sum();
    (hits as f64 / words as f64 * 50.0).min(1.0)
}

fn date_range_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(19|20)\d{2}\s*[-\x{2013}]\s*((19|20)\d{2}|present)").unwrap())
}

/// Structural indicators (spec §4.7: "date ranges, degree mentions,
/// 'Executive Summary' markers"), scored per category since the markers
/// that matter differ by document type.
fn structural_score(category: &str, text: &str) -> f64 {
    let lower = text.to_ascii_lowercase();
    match category {
        "team-resumes" => {
            let mut hits = 0u32;
            if date_range_pattern().is_match(&lower) {
                hits += 1;
            }
            if lower.contains("bachelor") || lower.contains("master") || lower.contains("ph.d") || lower.contains("associate degree") {
                hits += 1;
            }
            hits as f64 / 2.0
        }
        "capability-statements" => {
            let mut hits = 0u32;
            if lower.contains("executive summary") {
                hits += 1;
            }
            if lower.contains("mission statement") || lower.contains("company overview") {
                hits += 1;
            }
            hits as f64 / 2.0
        }
        _ => 0.0,
    }
}

/// Classifies `text` (and its originating `filename`) into one of the
/// known document categories, falling back to `other` below the low
/// confidence band (spec §4.7).
pub async fn classify(filename: &str, text: &str, llm: &dyn TextClassifierLlm) -> ClassificationResult {
    let categories = category_keywords();
    let labels: Vec<String> = categories.iter().map(|(name, _)| name.to_string()).collect();
    let llm_probs = llm.classify(text, &labels).await.unwrap_or_else(|_| vec![1.0 / labels.len() as f64; labels.len()]);

    let mut scores = BTreeMap::new();
    for (index, (name, keywords)) in categories.iter().enumerate() {
        let blended = FILENAME_WEIGHT * filename_score(filename, keywords)
            + KEYWORD_WEIGHT * keyword_density_score(text, keywords)
            + STRUCTURAL_WEIGHT * structural_score(name, text)
            + LLM_WEIGHT * llm_probs.get(index).copied().unwrap_or(0.0);
        scores.insert(name.to_string(), blended.clamp(0.0, 1.0));
    }

    let (primary_category, top_score) = scores
        .iter()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
        .map(|(name, score)| (name.clone(), *score))
        .unwrap_or_else(|| ("other".to_string(), 0.0));

    let confidence = ClassificationConfidence::from_score(top_score);
    let primary_category = if confidence == ClassificationConfidence::Other { "other".to_string() } else { primary_category };

    ClassificationResult { primary_category, confidence, scores }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcm_embed::UniformTextClassifier;

    #[tokio::test]
    async fn resume_filename_and_content_classify_as_high_confidence_resume() {
        let text = "John Smith\nObjective: seeking a senior engineering role.\n\
            Experience\nSenior Engineer, Acme Corp, 2018-present\nEducation\nBachelor of Science, Computer Science\nSkills\nRust, AWS";
        let result = classify("john_smith_resume.pdf", text, &UniformTextClassifier).await;
        assert_eq!(result.primary_category, "team-resumes");
        assert!(result.confidence >= ClassificationConfidence::Medium);
    }

    #[tokio::test]
    async fn capability_statement_content_classifies_correctly() {
        let text = "Executive Summary\nCompany Overview: Acme Corp is a certified 8(a) firm.\n\
            Core Capabilities: software engineering, cloud migration.\nPast Performance: DoD contract.\nNAICS 541512, DUNS 123456789, CAGE 1AB23";
        let result = classify("capability_statement.docx", text, &UniformTextClassifier).await;
        assert_eq!(result.primary_category, "capability-statements");
    }

    #[tokio::test]
    async fn unrelated_text_falls_back_to_other() {
        let text = "This is a grocery list: milk, eggs, bread.";
        let result = classify("notes.txt", text, &UniformTextClassifier).await;
        assert_eq!(result.confidence, ClassificationConfidence::Other);
        assert_eq!(result.primary_category, "other");
    }
}
