//! XLSX/XLS extraction (spec §4.1): per worksheet, emit a `=== name ===`
//! banner then rows of non-empty cells joined by ` | `.

use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};

use crate::clean::clean_text;
use crate::model::{ExtractedDocument, ExtractedTable, ExtractionMetadata, StructureElement};

pub fn extract_xlsx(bytes: &[u8]) -> anyhow::Result<ExtractedDocument> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook: Xlsx<_> = open_workbook_from_rs(cursor)?;

    let mut structure = Vec::new();
    let mut tables = Vec::new();
    let mut lines = Vec::new();

    let sheet_names = workbook.sheet_names().to_vec();
    for sheet_name in &sheet_names {
        let range = match workbook.worksheet_range(sheet_name) {
            Ok(range) => range,
            Err(_) => continue,
        };

        lines.push(format!("=== {sheet_name} ==="));
        structure.push(StructureElement::heading(sheet_name.clone(), Some("sheet".into())));

        let mut rows = Vec::new();
        for row in range.rows() {
            let cells: Vec<String> = row
                .iter()
                .map(cell_to_string)
                .filter(|c| !c.is_empty())
                .collect();
            if cells.is_empty() {
                continue;
            }
            lines.push(cells.join(" | "));
            rows.push(cells);
        }

        if !rows.is_empty() {
            structure.push(StructureElement::table(
                rows.iter().map(|r| r.join(" | ")).collect::<Vec<_>>().join("\n"),
            ));
            tables.push(ExtractedTable { sheet_or_caption: Some(sheet_name.clone()), rows });
        }
    }

    Ok(ExtractedDocument {
        full_text: clean_text(&lines.join("\n")),
        structure,
        tables,
        metadata: ExtractionMetadata {
            page_or_sheet_count: Some(sheet_names.len()),
            ..Default::default()
        },
    })
}

fn cell_to_string(data: &Data) -> String {
    match data {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("#ERROR:{e:?}"),
    }
}
