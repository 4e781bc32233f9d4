//! CSV Ingestor (C6, spec §4.6): download the daily opportunity CSV,
//! decode with a tolerant encoding cascade, parse tolerantly (falling
//! back to line-by-line on a mid-stream parse error), and transform each
//! row into an `Opportunity` ready for C5.

use std::collections::HashMap;

use chrono::Utc;
use gcm_core::opportunity::{Contact, EmbeddingMetadata, Opportunity, PlaceOfPerformance, ProcessingStatus};
use gcm_storage::HttpFetcher;
use uuid::Uuid;

use crate::hooks::StagedOpportunity;
use crate::normalize::{parse_date, trim_opt};

#[derive(Debug, Default, Clone)]
pub struct CsvIngestReport {
    pub rows_seen: usize,
    pub rows_transformed: usize,
    pub parse_errors: usize,
    pub used_fallback_parser: bool,
}

/// Decode cascade per spec §4.6: utf-8, then latin-1/cp1252/iso-8859-1
/// (one windows-1252 decode covers all three per WHATWG), then utf-8
/// with replacement as the final fallback.
pub fn decode_csv_bytes(bytes: &[u8]) -> String {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }
    let (text, _, had_errors) = encoding_rs::WINDOWS_1252.decode(bytes);
    if !had_errors {
        return text.into_owned();
    }
    String::from_utf8_lossy(bytes).into_owned()
}

pub async fn download_csv(fetcher: &HttpFetcher, source_id: &str, url: &str) -> anyhow::Result<Vec<u8>> {
    let response = fetcher.fetch_bytes(Uuid::new_v4(), source_id, url).await?;
    Ok(response.body)
}

/// Parses `text` as CSV using the tolerant `csv` reader; if it errors
/// mid-stream, restarts from scratch with a line-by-line split that
/// tolerates malformed rows and counts them, per spec §4.6.
pub fn parse_csv_rows(text: &str) -> (Vec<HashMap<String, String>>, CsvIngestReport) {
    let mut report = CsvIngestReport::default();

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(text.as_bytes());
    let headers = match reader.headers() {
        Ok(h) => h.clone(),
        Err(_) => return parse_csv_rows_fallback(text),
    };

    let mut rows = Vec::new();
    for record_result in reader.records() {
        match record_result {
            Ok(record) => {
                report.rows_seen += 1;
                let row: HashMap<String, String> = headers
                    .iter()
                    .zip(record.iter())
                    .map(|(h, v)| (h.to_string(), v.to_string()))
                    .collect();
                rows.push(row);
                report.rows_transformed += 1;
            }
            Err(_) => {
                report.parse_errors += 1;
                // A strict-reader error mid-stream means the remainder
                // of the stream can't be trusted either; fall back.
                let (fallback_rows, fallback_report) = parse_csv_rows_fallback(text);
                return (fallback_rows, CsvIngestReport { used_fallback_parser: true, ..fallback_report });
            }
        }
    }

    (rows, report)
}

fn parse_csv_rows_fallback(text: &str) -> (Vec<HashMap<String, String>>, CsvIngestReport) {
    let mut report = CsvIngestReport { used_fallback_parser: true, ..Default::default() };
    let mut lines = text.lines();

    let Some(header_line) = lines.next() else {
        return (Vec::new(), report);
    };
    let headers: Vec<String> = header_line.split(',').map(|h| h.trim().to_string()).collect();

    let mut rows = Vec::new();
    for line in lines {
        report.rows_seen += 1;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != headers.len() {
            report.parse_errors += 1;
            continue;
        }
        let row: HashMap<String, String> =
            headers.iter().cloned().zip(fields.iter().map(|f| f.trim().to_string())).collect();
        rows.push(row);
        report.rows_transformed += 1;
    }

    (rows, report)
}

fn get<'a>(row: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    row.get(key).map(|s| s.as_str())
}

/// Transforms one CSV row (keyed by SAM.gov-style column names) into an
/// `Opportunity`. Missing optional columns simply yield `None` fields;
/// required-field validation happens later, in C5.
pub fn row_to_opportunity(row: &HashMap<String, String>) -> Opportunity {
    let notice_id = get(row, "NoticeId").or_else(|| get(row, "notice_id")).unwrap_or("").trim().to_string();
    let title = get(row, "Title").or_else(|| get(row, "title")).unwrap_or("").trim().to_string();
    let posted_date = get(row, "PostedDate")
        .or_else(|| get(row, "posted_date"))
        .and_then(parse_date)
        .unwrap_or_else(Utc::now);

    Opportunity {
        notice_id,
        title,
        solicitation_number: get(row, "SolicitationNumber").and_then(trim_opt),
        department: get(row, "Department/Ind.Agency").and_then(trim_opt),
        agency: get(row, "Department/Ind.Agency").and_then(trim_opt),
        office: get(row, "SubTier").and_then(trim_opt).or_else(|| get(row, "Office").and_then(trim_opt)),
        posted_date,
        response_deadline: get(row, "ResponseDeadLine").and_then(parse_date),
        archive_date: get(row, "ArchiveDate").and_then(parse_date),
        notice_type: get(row, "Type").and_then(trim_opt),
        naics_code: get(row, "NaicsCode").and_then(trim_opt),
        set_aside_code: get(row, "SetASideCode").and_then(trim_opt),
        set_aside_label: get(row, "SetASide").and_then(trim_opt),
        place_of_performance: PlaceOfPerformance {
            address: get(row, "PopStreetAddress").and_then(trim_opt),
            city: get(row, "PopCity").and_then(trim_opt),
            state: get(row, "PopState").and_then(trim_opt),
            zip: get(row, "PopZip").and_then(trim_opt),
            country: get(row, "PopCountry").and_then(trim_opt),
        },
        award: None,
        primary_contact: Contact {
            name: get(row, "PrimaryContactFullname").and_then(trim_opt),
            email: get(row, "PrimaryContactEmail").and_then(trim_opt),
            phone: get(row, "PrimaryContactPhone").and_then(trim_opt),
        },
        secondary_contact: Contact::default(),
        description: get(row, "Description").and_then(trim_opt),
        active: get(row, "Active").map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "yes" | "true" | "y" | "1")).unwrap_or(true),
        attachments: Vec::new(),
        embedding_metadata: EmbeddingMetadata::default(),
        processing_status: ProcessingStatus::Pending,
        error_message: None,
        retry_count: 0,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn rows_to_staged(rows: &[HashMap<String, String>]) -> Vec<StagedOpportunity> {
    rows.iter().map(|row| StagedOpportunity::new(row_to_opportunity(row))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CSV: &str = "NoticeId,Title,PostedDate,Department/Ind.Agency,NaicsCode,Active\nOPP-1,Network Build,2026-07-01,DoD,541512,Yes\nOPP-2,IT Support,2026-07-02,GSA,541513,No\n";

    #[test]
    fn decode_falls_back_gracefully_for_non_utf8_bytes() {
        let bytes: Vec<u8> = vec![0x93, b'h', b'i', 0x94];
        let text = decode_csv_bytes(&bytes);
        assert!(text.contains("hi"));
    }

    #[test]
    fn strict_parser_handles_well_formed_csv() {
        let (rows, report) = parse_csv_rows(SAMPLE_CSV);
        assert_eq!(rows.len(), 2);
        assert_eq!(report.rows_transformed, 2);
        assert!(!report.used_fallback_parser);
    }

    #[test]
    fn row_transform_populates_required_fields() {
        let (rows, _) = parse_csv_rows(SAMPLE_CSV);
        let opp = row_to_opportunity(&rows[0]);
        assert_eq!(opp.notice_id, "OPP-1");
        assert_eq!(opp.naics_code.as_deref(), Some("541512"));
        assert!(opp.active);
    }

    #[test]
    fn fallback_parser_tolerates_malformed_rows() {
        let malformed = "NoticeId,Title,PostedDate\nOPP-1,Good Row,2026-07-01\nOPP-2,Missing Field\nOPP-3,Extra,2026-07-03,Oops\n";
        let (rows, report) = parse_csv_rows_fallback(malformed);
        assert_eq!(rows.len(), 1);
        assert_eq!(report.parse_errors, 2);
    }

    #[test]
    fn rows_to_staged_assigns_content_hashes() {
        let (rows, _) = parse_csv_rows(SAMPLE_CSV);
        let staged = rows_to_staged(&rows);
        assert_eq!(staged.len(), 2);
        assert_ne!(staged[0].content_hash, staged[1].content_hash);
    }
}
