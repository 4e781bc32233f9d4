//! Opportunity Processor (C5) and CSV Ingestor (C6): spec §4.5-4.6.
//! Grounded on the teacher's `SyncPipeline::run_once` staging shape
//! (registry → fetch → parse → stage → dedup/enrich → persist → report),
//! generalized so the "source" is the daily opportunity CSV.

pub mod config;
pub mod csv_ingest;
pub mod hooks;
pub mod normalize;
pub mod pipeline;
pub mod processor;
pub mod queue;
pub mod segments;

pub use config::IngestConfig;
pub use hooks::{ApproachingDeadlineEnrichmentHook, ContentHashDedupHook, DedupHook, EnrichmentHook, NoopDedupHook, NoopEnrichmentHook, StagedOpportunity};
pub use pipeline::{run_ingest_once, IngestRunSummary};
pub use processor::{process_opportunity, ProcessOutcome, ProcessorContext};
pub use queue::{emit_in_batches, LocalQueueSink, QueueSink, MAX_BATCH_SIZE};

pub const CRATE_NAME: &str = "gcm-ingest";
