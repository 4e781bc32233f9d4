//! DOCX extraction (spec §4.1): iterate block-level elements (`w:p`,
//! `w:tbl`) in document order, emitting paragraph text with style names
//! and tables as `[TABLE] … [/TABLE]` with cells joined by ` | `.
//! Headers/footers are tagged `[Header: …]` / `[Footer: …]`. Core
//! properties (title/author/subject/dates) come from `docProps/core.xml`.

use std::io::{Cursor, Read};

use chrono::{DateTime, Utc};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use zip::ZipArchive;

use crate::clean::clean_text;
use crate::model::{ExtractedDocument, ExtractedTable, ExtractionMetadata, StructureElement};

const W_NS_LOCAL_PARAGRAPH: &str = "p";
const W_NS_LOCAL_TABLE: &str = "tbl";
const W_NS_LOCAL_TABLE_ROW: &str = "tr";
const W_NS_LOCAL_TABLE_CELL: &str = "tc";
const W_NS_LOCAL_TEXT: &str = "t";
const W_NS_LOCAL_STYLE_ID: &str = "pStyle";

pub fn extract_docx(bytes: &[u8]) -> anyhow::Result<ExtractedDocument> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut archive = ZipArchive::new(cursor)?;

    let document_xml = read_zip_entry(&mut archive, "word/document.xml")?;
    let core_xml = read_zip_entry(&mut archive, "docProps/core.xml").unwrap_or_default();
    let header_xmls = collect_named_entries(&mut archive, "word/header");
    let footer_xmls = collect_named_entries(&mut archive, "word/footer");

    let mut structure = Vec::new();
    let mut tables = Vec::new();
    let mut lines = Vec::new();

    for header in &header_xmls {
        let text = flatten_paragraph_text(header);
        if !text.trim().is_empty() {
            structure.push(StructureElement::paragraph(format!("[Header: {text}]")));
            lines.push(format!("[Header: {text}]"));
        }
    }

    parse_body_blocks(&document_xml, &mut structure, &mut tables, &mut lines);

    for footer in &footer_xmls {
        let text = flatten_paragraph_text(footer);
        if !text.trim().is_empty() {
            structure.push(StructureElement::paragraph(format!("[Footer: {text}]")));
            lines.push(format!("[Footer: {text}]"));
        }
    }

    let metadata = parse_core_properties(&core_xml);

    Ok(ExtractedDocument {
        full_text: clean_text(&lines.join("\n")),
        structure,
        tables,
        metadata,
    })
}

fn read_zip_entry<R: Read + std::io::Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> anyhow::Result<String> {
    let mut file = archive.by_name(name)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Ok(contents)
}

fn collect_named_entries<R: Read + std::io::Seek>(archive: &mut ZipArchive<R>, prefix: &str) -> Vec<String> {
    let names: Vec<String> = (0..archive.len())
        .filter_map(|i| archive.by_index(i).ok().map(|f| f.name().to_string()))
        .filter(|name| name.starts_with(prefix) && name.ends_with(".xml"))
        .collect();

    names
        .into_iter()
        .filter_map(|name| read_zip_entry(archive, &name).ok())
        .collect()
}

/// Walks `w:p` and `w:tbl` elements in document order, tracking the
/// current paragraph style (`w:pStyle/@w:val`) so headings can be told
/// apart from body paragraphs without a full OOXML schema.
fn parse_body_blocks(
    xml: &str,
    structure: &mut Vec<StructureElement>,
    tables: &mut Vec<ExtractedTable>,
    lines: &mut Vec<String>,
) {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut in_table_depth = 0u32;
    let mut table_rows: Vec<Vec<String>> = Vec::new();
    let mut current_row: Vec<String> = Vec::new();
    let mut current_cell_text = String::new();
    let mut current_paragraph_text = String::new();
    let mut current_style: Option<String> = None;
    let mut in_text_run = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let local = local_name(e.name().as_ref());
                match local.as_str() {
                    W_NS_LOCAL_TABLE => in_table_depth += 1,
                    W_NS_LOCAL_TABLE_ROW if in_table_depth > 0 => current_row = Vec::new(),
                    W_NS_LOCAL_TABLE_CELL if in_table_depth > 0 => current_cell_text.clear(),
                    W_NS_LOCAL_TEXT => in_text_run = true,
                    W_NS_LOCAL_STYLE_ID => {
                        for attr in e.attributes().flatten() {
                            if local_name(attr.key.as_ref()) == "val" {
                                current_style = Some(String::from_utf8_lossy(&attr.value).into_owned());
                            }
                        }
                    }
                    W_NS_LOCAL_PARAGRAPH if in_table_depth == 0 => {
                        current_paragraph_text.clear();
                        current_style = None;
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(e)) if in_text_run => {
                let text = e.unescape().unwrap_or_default().into_owned();
                if in_table_depth > 0 {
                    current_cell_text.push_str(&text);
                } else {
                    current_paragraph_text.push_str(&text);
                }
            }
            Ok(Event::End(e)) => {
                let local = local_name(e.name().as_ref());
                match local.as_str() {
                    W_NS_LOCAL_TEXT => in_text_run = false,
                    W_NS_LOCAL_TABLE_CELL if in_table_depth > 0 => {
                        current_row.push(current_cell_text.trim().to_string());
                    }
                    W_NS_LOCAL_TABLE_ROW if in_table_depth > 0 => {
                        table_rows.push(std::mem::take(&mut current_row));
                    }
                    W_NS_LOCAL_TABLE if in_table_depth > 0 => {
                        in_table_depth -= 1;
                        if in_table_depth == 0 && !table_rows.is_empty() {
                            let rendered: Vec<String> =
                                table_rows.iter().map(|r| r.join(" | ")).collect();
                            lines.push("[TABLE]".to_string());
                            lines.extend(rendered.clone());
                            lines.push("[/TABLE]".to_string());
                            structure.push(StructureElement::table(rendered.join("\n")));
                            tables.push(ExtractedTable {
                                sheet_or_caption: None,
                                rows: std::mem::take(&mut table_rows),
                            });
                        }
                    }
                    W_NS_LOCAL_PARAGRAPH if in_table_depth == 0 => {
                        let text = current_paragraph_text.trim().to_string();
                        if !text.is_empty() {
                            lines.push(text.clone());
                            if is_heading_style(current_style.as_deref()) {
                                structure.push(StructureElement::heading(text, current_style.clone()));
                            } else {
                                structure.push(StructureElement::paragraph(text));
                            }
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }
}

fn is_heading_style(style: Option<&str>) -> bool {
    style.map(|s| s.to_ascii_lowercase().starts_with("heading")).unwrap_or(false)
}

fn flatten_paragraph_text(xml: &str) -> String {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut in_text_run = false;
    let mut out = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if local_name(e.name().as_ref()) == W_NS_LOCAL_TEXT => {
                in_text_run = true;
            }
            Ok(Event::Text(e)) if in_text_run => {
                out.push_str(&e.unescape().unwrap_or_default());
                out.push(' ');
            }
            Ok(Event::End(e)) if local_name(e.name().as_ref()) == W_NS_LOCAL_TEXT => {
                in_text_run = false;
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }
    out.trim().to_string()
}

fn parse_core_properties(xml: &str) -> ExtractionMetadata {
    if xml.is_empty() {
        return ExtractionMetadata::default();
    }

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut title = None;
    let mut author = None;
    let mut subject = None;
    let mut created_at = None;
    let mut modified_at = None;
    let mut current: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => current = Some(local_name(e.name().as_ref())),
            Ok(Event::Text(e)) => {
                let text = e.unescape().unwrap_or_default().into_owned();
                match current.as_deref() {
                    Some("title") => title = Some(text),
                    Some("creator") => author = Some(text),
                    Some("subject") => subject = Some(text),
                    Some("created") => created_at = parse_iso_datetime(&text),
                    Some("modified") => modified_at = parse_iso_datetime(&text),
                    _ => {}
                }
            }
            Ok(Event::End(_)) => current = None,
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    ExtractionMetadata { title, author, subject, created_at, modified_at, ..Default::default() }
}

fn parse_iso_datetime(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.with_timezone(&Utc))
}

fn local_name(qualified: &[u8]) -> String {
    let text = String::from_utf8_lossy(qualified);
    text.rsplit(':').next().unwrap_or(&text).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_runs_inside_a_paragraph() {
        let xml = r#"<w:r><w:t>Hello</w:t></w:r><w:r><w:t xml:space="preserve"> world</w:t></w:r>"#;
        assert_eq!(flatten_paragraph_text(xml), "Hello world");
    }

    #[test]
    fn heading_style_detection_is_case_insensitive() {
        assert!(is_heading_style(Some("Heading1")));
        assert!(is_heading_style(Some("heading2")));
        assert!(!is_heading_style(Some("Normal")));
        assert!(!is_heading_style(None));
    }
}
