//! HTML extraction (spec §4.1): strip scripts/styles/nav/footer/header,
//! extract title, meta description, headings, and visible text.

use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

use crate::clean::clean_text;
use crate::model::{ExtractedDocument, ExtractionMetadata, StructureElement};

const STRIP_TAGS: &[&str] = &["script", "style", "nav", "footer", "header"];

static STRIP_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    STRIP_TAGS
        .iter()
        .map(|tag| Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}>")).unwrap())
        .collect()
});

fn strip_noise_tags(html: &str) -> String {
    let mut out = html.to_string();
    for pattern in STRIP_PATTERNS.iter() {
        out = pattern.replace_all(&out, "").into_owned();
    }
    out
}

pub fn extract_html(bytes: &[u8]) -> ExtractedDocument {
    let raw = String::from_utf8_lossy(bytes).into_owned();
    let stripped = strip_noise_tags(&raw);
    let document = Html::parse_document(&stripped);

    let title = first_text(&document, "title");
    let meta_description = document
        .select(&Selector::parse(r#"meta[name="description"]"#).unwrap())
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(str::to_string);

    let mut structure = Vec::new();
    if let Some(title) = &title {
        structure.push(StructureElement::heading(title.clone(), Some("title".into())));
    }
    if let Some(desc) = &meta_description {
        structure.push(StructureElement::paragraph(desc.clone()));
    }

    for level in 1..=6 {
        let selector = Selector::parse(&format!("h{level}")).unwrap();
        for el in document.select(&selector) {
            let text = collect_text(&el);
            if !text.trim().is_empty() {
                structure.push(StructureElement::heading(text, Some(format!("h{level}"))));
            }
        }
    }

    let paragraph_selector = Selector::parse("p").unwrap();
    for el in document.select(&paragraph_selector) {
        let text = collect_text(&el);
        if !text.trim().is_empty() {
            structure.push(StructureElement::paragraph(text));
        }
    }

    let body_selector = Selector::parse("body").unwrap();
    let body_text = document
        .select(&body_selector)
        .next()
        .map(|body| collect_text(&body))
        .unwrap_or_default();

    let mut full_text = String::new();
    if let Some(title) = &title {
        full_text.push_str(title);
        full_text.push('\n');
    }
    full_text.push_str(&body_text);

    ExtractedDocument {
        full_text: clean_text(&full_text),
        structure,
        tables: Vec::new(),
        metadata: ExtractionMetadata { title, subject: meta_description, ..Default::default() },
    }
}

fn first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document.select(&selector).next().map(|el| collect_text(&el))
}

fn collect_text(el: &scraper::ElementRef) -> String {
    el.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_title_and_headings() {
        let html = b"<html><head><title>My Notice</title></head><body><h1>Summary</h1><p>Body text here.</p><script>evil()</script></body></html>";
        let doc = extract_html(html);
        assert_eq!(doc.metadata.title.as_deref(), Some("My Notice"));
        assert!(doc.structure.iter().any(|s| s.text == "Summary"));
        assert!(doc.full_text.contains("Body text here"));
        assert!(!doc.full_text.contains("evil()"));
    }

    #[test]
    fn strips_nav_and_footer_text() {
        let html = b"<html><body><nav>Home About</nav><p>Real content.</p><footer>copyright footer</footer></body></html>";
        let doc = extract_html(html);
        assert!(!doc.full_text.contains("Home About"));
        assert!(!doc.full_text.contains("copyright footer"));
        assert!(doc.full_text.contains("Real content"));
    }
}
