//! Keyword / pseudo-TF-IDF component (spec §4.9). The source computes a
//! term-frequency weight without a real corpus (`log(1 + 1/(tf+0.01))`,
//! not true IDF); this is preserved verbatim and surfaced as
//! [`pseudo_idf`] per spec §9 open question #1 rather than silently
//! "fixed" into a corpus-based IDF.

use std::collections::{BTreeMap, BTreeSet};

use regex::Regex;
use std::sync::OnceLock;

use super::ComponentOutput;

/// Acronyms common in government-contracting text, expanded before
/// tokenizing so "GSA" and "General Services Administration" overlap.
fn acronym_map() -> &'static BTreeMap<&'static str, &'static str> {
    static MAP: OnceLock<BTreeMap<&'static str, &'static str>> = OnceLock::new();
    MAP.get_or_init(|| {
        BTreeMap::from([
            ("gsa", "general services administration"),
            ("dod", "department of defense"),
            ("sow", "statement of work"),
            ("rfp", "request for proposal"),
            ("rfq", "request for quote"),
            ("idiq", "indefinite delivery indefinite quantity"),
            ("naics", "north american industry classification system"),
            ("sbir", "small business innovation research"),
            ("far", "federal acquisition regulation"),
            ("cpars", "contractor performance assessment reporting system"),
            ("poc", "point of contact"),
            ("cor", "contracting officer representative"),
        ])
    })
}

fn stopwords() -> &'static BTreeSet<&'static str> {
    static SET: OnceLock<BTreeSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| {
        BTreeSet::from([
            "the", "and", "for", "with", "that", "this", "from", "are", "was", "were",
            "will", "shall", "may", "can", "has", "have", "had", "not", "all", "any",
            "its", "their", "they", "them", "such", "other", "than", "these", "those",
            "per", "which", "who", "whom", "into", "onto", "upon", "under", "over",
            "government", "contract", "contractor", "agency", "federal", "services",
            "shall", "must", "within", "pursuant",
        ])
    })
}

/// A small set of high-value terms boosted ×1.5 (spec §4.9), flagging
/// solicitation-significant concepts over generic boilerplate.
fn high_value_keywords() -> &'static BTreeSet<&'static str> {
    static SET: OnceLock<BTreeSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| {
        BTreeSet::from([
            "cybersecurity", "cloud", "software", "engineering", "data", "analytics",
            "infrastructure", "network", "security", "modernization", "migration",
            "artificial", "intelligence", "machine", "learning", "development",
            "integration", "maintenance", "logistics", "training", "research",
        ])
    })
}

fn british_to_american(word: &str) -> String {
    let replacements: &[(&str, &str)] = &[
        ("isation", "ization"),
        ("isabl", "izabl"),
        ("ising", "izing"),
        ("colour", "color"),
        ("behaviour", "behavior"),
        ("centre", "center"),
        ("programme", "program"),
        ("defence", "defense"),
        ("licence", "license"),
        ("organis", "organiz"),
    ];
    let mut out = word.to_string();
    for (british, american) in replacements {
        if out.contains(british) {
            out = out.replace(british, american);
        }
    }
    out
}

/// Strips a trailing "s" for trivial plurals, avoiding double-s words.
fn singularize(word: &str) -> String {
    if word.len() > 3 && word.ends_with('s') && !word.ends_with("ss") {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}

fn word_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b[a-zA-Z]+\b").unwrap())
}

/// Lowercases, expands acronyms, tokenizes on `\b[a-zA-Z]+\b`, drops
/// stopwords and tokens ≤2 chars, normalizes spelling/plurals.
fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_ascii_lowercase();
    let expanded: String = lower
        .split_whitespace()
        .map(|w| {
            let trimmed: String = w.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
            acronym_map().get(trimmed.as_str()).map(|s| s.to_string()).unwrap_or(w.to_string())
        })
        .collect::<Vec<_>>()
        .join(" ");

    word_pattern()
        .find_iter(&expanded)
        .map(|m| m.as_str().to_string())
        .filter(|w| w.len() > 2 && !stopwords().contains(w.as_str()))
        .map(|w| singularize(&british_to_american(&w)))
        .collect()
}

/// `log(1 + 1/(tf + 0.01))`, preserved verbatim from the source — not a
/// true corpus IDF, see module docs.
pub fn pseudo_idf(term_frequency: f64) -> f64 {
    (1.0 + 1.0 / (term_frequency + 0.01)).ln()
}

fn term_frequencies(tokens: &[String]) -> BTreeMap<String, f64> {
    let mut counts: BTreeMap<String, f64> = BTreeMap::new();
    for token in tokens {
        *counts.entry(token.clone()).or_insert(0.0) += 1.0;
    }
    let total = tokens.len().max(1) as f64;
    for value in counts.values_mut() {
        *value /= total;
    }
    counts
}

fn tfidf_vector(tokens: &[String]) -> BTreeMap<String, f64> {
    let tf = term_frequencies(tokens);
    tf.into_iter()
        .map(|(term, freq)| {
            let boost = if high_value_keywords().contains(term.as_str()) { 1.5 } else { 1.0 };
            (term, freq * pseudo_idf(freq) * boost)
        })
        .collect()
}

fn cosine_over_maps(a: &BTreeMap<String, f64>, b: &BTreeMap<String, f64>) -> f64 {
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    let keys: BTreeSet<&String> = a.keys().chain(b.keys()).collect();
    for key in keys {
        let av = a.get(key).copied().unwrap_or(0.0);
        let bv = b.get(key).copied().unwrap_or(0.0);
        dot += av * bv;
        norm_a += av * av;
        norm_b += bv * bv;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a.sqrt() * norm_b.sqrt())
    }
}

fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count() as f64;
    let union = a.union(b).count().max(1) as f64;
    intersection / union
}

fn bigrams(tokens: &[String]) -> BTreeSet<String> {
    tokens.windows(2).map(|pair| format!("{} {}", pair[0], pair[1])).collect()
}

fn extract_acronyms(text: &str) -> BTreeSet<String> {
    text.split_whitespace()
        .filter(|w| {
            let letters: String = w.chars().filter(|c| c.is_ascii_alphabetic()).collect();
            letters.len() >= 2 && letters.chars().all(|c| c.is_ascii_uppercase())
        })
        .map(|w| w.to_ascii_lowercase())
        .collect()
}

/// Weighted blend: cosine(tfidf) 0.35, exact-token overlap 0.25,
/// high-value-term match 0.20, acronym match 0.10, meaningful-phrase
/// match 0.10 (spec §4.9).
pub fn score(opportunity_text: &str, company_text: &str) -> ComponentOutput {
    if opportunity_text.trim().is_empty() || company_text.trim().is_empty() {
        return ComponentOutput::no_data(serde_json::json!({ "reason": "empty opportunity or company text" }));
    }

    let opp_tokens = tokenize(opportunity_text);
    let co_tokens = tokenize(company_text);
    if opp_tokens.is_empty() || co_tokens.is_empty() {
        return ComponentOutput::no_data(serde_json::json!({ "reason": "no scorable tokens after stopword removal" }));
    }

    let opp_tfidf = tfidf_vector(&opp_tokens);
    let co_tfidf = tfidf_vector(&co_tokens);
    let cosine = cosine_over_maps(&opp_tfidf, &co_tfidf);

    let opp_set: BTreeSet<String> = opp_tokens.iter().cloned().collect();
    let co_set: BTreeSet<String> = co_tokens.iter().cloned().collect();
    let exact_overlap = jaccard(&opp_set, &co_set);

    let opp_high_value: BTreeSet<&String> = opp_set.iter().filter(|t| high_value_keywords().contains(t.as_str())).collect();
    let high_value_match = if opp_high_value.is_empty() {
        0.0
    } else {
        opp_high_value.iter().filter(|t| co_set.contains(t.as_str())).count() as f64 / opp_high_value.len() as f64
    };

    let opp_acronyms = extract_acronyms(opportunity_text);
    let co_acronyms = extract_acronyms(company_text);
    let acronym_match = if opp_acronyms.is_empty() {
        0.0
    } else {
        opp_acronyms.intersection(&co_acronyms).count() as f64 / opp_acronyms.len() as f64
    };

    let opp_bigrams = bigrams(&opp_tokens);
    let co_bigrams = bigrams(&co_tokens);
    let phrase_match = if opp_bigrams.is_empty() {
        0.0
    } else {
        opp_bigrams.intersection(&co_bigrams).count() as f64 / opp_bigrams.len() as f64
    };

    let blended = 0.35 * cosine + 0.25 * exact_overlap + 0.20 * high_value_match + 0.10 * acronym_match + 0.10 * phrase_match;

    let mut recommendations = Vec::new();
    if high_value_match < 0.3 && !opp_high_value.is_empty() {
        recommendations.push("capability statement is missing several high-value terms from the solicitation".to_string());
    }

    ComponentOutput::ok(
        blended.clamp(0.0, 1.0),
        serde_json::json!({
            "cosine_tfidf": cosine,
            "exact_token_overlap": exact_overlap,
            "high_value_term_match": high_value_match,
            "acronym_match": acronym_match,
            "meaningful_phrase_match": phrase_match,
        }),
    )
    .with_recommendations(recommendations)
}
