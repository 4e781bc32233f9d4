//! CSV extraction (spec §4.1): header + first 100 rows rendered as
//! pipe-separated, followed by a truncation notice. Shares the
//! permissive decode cascade with the plain-text path; empty rows are
//! dropped per the tabular-format filtering mandate.

const PREVIEW_ROW_LIMIT: usize = 100;

use crate::clean::clean_text;
use crate::decode::decode_permissive;
use crate::model::{ExtractedDocument, ExtractedTable, ExtractionMetadata, StructureElement};

pub fn extract_csv(bytes: &[u8]) -> ExtractedDocument {
    let decoded = decode_permissive(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(decoded.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map(|h| h.iter().map(str::to_string).collect())
        .unwrap_or_default();

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records().flatten() {
        let row: Vec<String> = record.iter().map(str::to_string).collect();
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        rows.push(row);
    }

    let total_rows = rows.len();
    let preview: Vec<&Vec<String>> = rows.iter().take(PREVIEW_ROW_LIMIT).collect();

    let mut lines = Vec::new();
    if !headers.is_empty() {
        lines.push(headers.join(" | "));
    }
    for row in &preview {
        lines.push(row.join(" | "));
    }
    if total_rows > PREVIEW_ROW_LIMIT {
        lines.push(format!("… and {} more rows", total_rows - PREVIEW_ROW_LIMIT));
    }

    let full_text = clean_text(&lines.join("\n"));
    let structure = vec![StructureElement::table(full_text.clone())];

    let mut table_rows = Vec::with_capacity(rows.len() + 1);
    if !headers.is_empty() {
        table_rows.push(headers);
    }
    table_rows.extend(rows);

    ExtractedDocument {
        full_text,
        structure,
        tables: vec![ExtractedTable { sheet_or_caption: None, rows: table_rows }],
        metadata: ExtractionMetadata::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_header_and_rows_pipe_separated() {
        let csv = b"name,amount\nAcme,100\nGlobex,250\n";
        let doc = extract_csv(csv);
        assert!(doc.full_text.contains("name | amount"));
        assert!(doc.full_text.contains("Acme | 100"));
    }

    #[test]
    fn truncates_after_100_rows_with_notice() {
        let mut csv = String::from("id\n");
        for i in 0..150 {
            csv.push_str(&format!("{i}\n"));
        }
        let doc = extract_csv(csv.as_bytes());
        assert!(doc.full_text.contains("… and 50 more rows"));
    }

    #[test]
    fn drops_fully_empty_rows() {
        let csv = b"a,b\n1,2\n,\n3,4\n";
        let doc = extract_csv(csv);
        assert_eq!(doc.tables[0].rows.len(), 3);
    }
}
