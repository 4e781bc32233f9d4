//! Section and paragraph identification for the multi-level embedding
//! strategy (spec §4.4): header heuristics and paragraph filtering, no
//! external dependency.

use regex::Regex;
use std::sync::LazyLock;

const MIN_SECTION_BODY_WORDS: usize = 10;
const MIN_PARAGRAPH_WORDS: usize = 20;
const MAX_HEADER_LEN: usize = 100;
const TOP_PARAGRAPHS: usize = 10;

static HEADER_ALL_CAPS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z][^a-z]*$").unwrap());
static HEADER_ROMAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[IVX]+\.").unwrap());
static HEADER_NUMBERED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.").unwrap());

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: String,
    pub body: String,
}

fn is_header_line(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.len() >= MAX_HEADER_LEN {
        return false;
    }
    HEADER_ALL_CAPS.is_match(trimmed) || HEADER_ROMAN.is_match(trimmed) || HEADER_NUMBERED.is_match(trimmed)
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Walks lines, opening a new section whenever a header line is seen and
/// accumulating subsequent lines as its body, until the next header or
/// end of input. Sections whose body has fewer than 10 words are dropped.
pub fn identify_sections(text: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current_title: Option<String> = None;
    let mut current_body = String::new();

    for line in text.lines() {
        if is_header_line(line) {
            if let Some(title) = current_title.take() {
                if word_count(&current_body) >= MIN_SECTION_BODY_WORDS {
                    sections.push(Section { title, body: current_body.trim().to_string() });
                }
            }
            current_title = Some(line.trim().to_string());
            current_body = String::new();
        } else if current_title.is_some() {
            current_body.push_str(line);
            current_body.push('\n');
        }
    }

    if let Some(title) = current_title {
        if word_count(&current_body) >= MIN_SECTION_BODY_WORDS {
            sections.push(Section { title, body: current_body.trim().to_string() });
        }
    }

    sections
}

/// Splits on blank lines, keeps paragraphs with at least 20 words, and
/// returns the top 10 by word count (the costliest ones to embed
/// exhaustively, and presumably the most information-dense).
pub fn top_paragraphs(text: &str) -> Vec<String> {
    let mut candidates: Vec<String> = text
        .split("\n\n")
        .map(|p| p.trim().to_string())
        .filter(|p| word_count(p) >= MIN_PARAGRAPH_WORDS)
        .collect();

    candidates.sort_by_key(|p| std::cmp::Reverse(word_count(p)));
    candidates.truncate(TOP_PARAGRAPHS);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_caps_header_is_detected() {
        assert!(is_header_line("SCOPE OF WORK"));
        assert!(!is_header_line("Scope of work in lower case"));
    }

    #[test]
    fn numbered_and_roman_headers_are_detected() {
        assert!(is_header_line("1. Introduction"));
        assert!(is_header_line("IV. Requirements"));
    }

    #[test]
    fn long_all_caps_lines_are_not_headers() {
        let long_line = "A".repeat(150);
        assert!(!is_header_line(&long_line));
    }

    #[test]
    fn sections_with_short_bodies_are_dropped() {
        let text = "SUMMARY\ntoo short\n1. DETAILS\n".to_string()
            + &"word ".repeat(15)
            + "\n";
        let sections = identify_sections(&text);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "1. DETAILS");
    }

    #[test]
    fn top_paragraphs_returns_at_most_ten_sorted_by_length() {
        let mut paragraphs = Vec::new();
        for i in 0..15 {
            paragraphs.push("word ".repeat(20 + i));
        }
        let text = paragraphs.join("\n\n");
        let top = top_paragraphs(&text);
        assert_eq!(top.len(), 10);
        assert!(word_count(&top[0]) >= word_count(&top[1]));
    }

    #[test]
    fn short_paragraphs_are_excluded() {
        let text = "short one\n\nanother short one";
        assert!(top_paragraphs(text).is_empty());
    }
}
