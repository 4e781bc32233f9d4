//! Text cleanup applied after every format-specific extraction path
//! (spec §4.1 cleaning clause).

use regex::Regex;
use std::sync::LazyLock;

static FOOTER_NOISE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?m)^Page \d+ of \d+\s*$").unwrap(),
        Regex::new(r"(?m)^Confidential\b.*$").unwrap(),
        Regex::new(r"(?m)^Copyright\b.*$").unwrap(),
        Regex::new(r"(?m)All rights reserved\.?").unwrap(),
    ]
});

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());
static BLANK_LINE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

pub fn clean_text(raw: &str) -> String {
    let normalized = raw.replace("\r\n", "\n").replace('\r', "\n");

    let without_controls: String = normalized
        .chars()
        .filter(|c| *c == '\n' || !c.is_control())
        .collect();

    let mut stripped = without_controls;
    for pattern in FOOTER_NOISE.iter() {
        stripped = pattern.replace_all(&stripped, "").into_owned();
    }

    let collapsed = WHITESPACE_RUN.replace_all(&stripped, " ");
    let collapsed = BLANK_LINE_RUN.replace_all(&collapsed, "\n\n");

    collapsed
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_footer_noise_lines() {
        let text = "Intro text\nPage 1 of 12\nCopyright 2026 Acme Corp\nBody continues";
        let cleaned = clean_text(text);
        assert!(!cleaned.contains("Page 1 of 12"));
        assert!(!cleaned.contains("Copyright 2026"));
        assert!(cleaned.contains("Body continues"));
    }

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(clean_text("a   b\t\tc"), "a b c");
    }

    #[test]
    fn preserves_newlines_while_dropping_control_chars() {
        let cleaned = clean_text("line one\nline\x07 two");
        assert_eq!(cleaned, "line one\nline two");
    }
}
