//! Run-once orchestration tying C6 to C5, grounded on the teacher's
//! `SyncPipeline::run_once` staging shape: fetch → parse → stage →
//! dedup/enrich → persist → report.

use chrono::Utc;
use serde::Serialize;

use crate::csv_ingest::{decode_csv_bytes, parse_csv_rows, rows_to_staged, CsvIngestReport};
use crate::hooks::{ApproachingDeadlineEnrichmentHook, ContentHashDedupHook, DedupHook, EnrichmentHook};
use crate::processor::{process_opportunity, ProcessOutcome, ProcessorContext};

#[derive(Debug, Clone, Serialize)]
pub struct IngestRunSummary {
    pub rows_seen: usize,
    pub rows_transformed: usize,
    pub deduplicated: usize,
    pub completed: usize,
    pub already_existing: usize,
    pub validation_failed: usize,
    pub failed: usize,
    pub used_fallback_parser: bool,
}

/// Runs the CSV-to-processed-opportunity pipeline over already-fetched
/// CSV bytes (the HTTP fetch itself is a thin wrapper over
/// [`crate::csv_ingest::download_csv`], kept separate so this stage can
/// be exercised without a network dependency).
pub async fn run_ingest_once(ctx: &ProcessorContext, csv_bytes: &[u8]) -> anyhow::Result<IngestRunSummary> {
    let text = decode_csv_bytes(csv_bytes);
    let (rows, parse_report): (_, CsvIngestReport) = parse_csv_rows(&text);

    let staged = rows_to_staged(&rows);
    let before_dedup = staged.len();

    let dedup_hook = ContentHashDedupHook;
    let staged = dedup_hook.apply(staged)?;
    let deduplicated = before_dedup - staged.len();

    let enrichment_hook = ApproachingDeadlineEnrichmentHook { now: Utc::now(), warn_within_days: 14 };
    let staged = enrichment_hook.apply(staged)?;

    let mut summary = IngestRunSummary {
        rows_seen: parse_report.rows_seen,
        rows_transformed: parse_report.rows_transformed,
        deduplicated,
        completed: 0,
        already_existing: 0,
        validation_failed: 0,
        failed: 0,
        used_fallback_parser: parse_report.used_fallback_parser,
    };

    for item in staged {
        match process_opportunity(ctx, item.opportunity).await {
            ProcessOutcome::Completed { .. } => summary.completed += 1,
            ProcessOutcome::AlreadyExists { .. } => summary.already_existing += 1,
            ProcessOutcome::ValidationFailed { .. } => summary.validation_failed += 1,
            ProcessOutcome::Failed { .. } => summary.failed += 1,
        }
    }

    Ok(summary)
}
