//! Plain-text and unknown-format fallback path (spec §4.1 dispatch).

use crate::clean::clean_text;
use crate::decode::decode_permissive;
use crate::model::{ExtractedDocument, ExtractionMetadata, StructureElement};

pub fn extract_txt(bytes: &[u8]) -> ExtractedDocument {
    let decoded = decode_permissive(bytes);
    let cleaned = clean_text(&decoded);
    let structure = cleaned
        .split("\n\n")
        .filter(|p| !p.trim().is_empty())
        .map(StructureElement::paragraph)
        .collect();

    ExtractedDocument {
        full_text: cleaned,
        structure,
        tables: Vec::new(),
        metadata: ExtractionMetadata::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn txt_extraction_splits_paragraphs() {
        let doc = extract_txt(b"Para one.\n\nPara two.");
        assert_eq!(doc.structure.len(), 2);
        assert!(doc.full_text.contains("Para one"));
    }
}
