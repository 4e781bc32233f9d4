//! Opportunity Processor (C5, spec §4.5): nine-step idempotent pipeline
//! from a staged opportunity plus attachment references to persisted
//! embeddings, KV record, and vector-index entries.

use std::sync::Arc;

use chrono::Utc;
use gcm_core::embedding::{ContentType, EmbeddingFilters, EmbeddingRecord, EntityType, VectorIndexEntry};
use gcm_core::opportunity::{derive_status, Attachment, EmbeddingMetadata, Opportunity, ProcessingStatus};
use gcm_embed::embedder::{embed, EmbeddingModel, EmbeddingRole};
use gcm_extract::chunk as chunk_text;
use gcm_extract::ocr::OcrService;
use gcm_storage::keys::{opportunity_attachment_chunk_key, opportunity_embedding_key, vector_index_key};
use gcm_storage::{HttpFetcher, KvTable, ObjectStore};

use crate::segments::all_segments;

const MIN_SEGMENT_CHARS: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    AlreadyExists { notice_id: String },
    Completed { notice_id: String, embeddings_written: usize },
    ValidationFailed { notice_id: String, reason: String },
    Failed { notice_id: String, reason: String },
}

pub struct ProcessorContext {
    pub object_store: Arc<dyn ObjectStore>,
    pub opportunities: Arc<dyn KvTable<Opportunity>>,
    pub vector_index: Arc<dyn KvTable<VectorIndexEntry>>,
    pub embedding_model: Arc<dyn EmbeddingModel>,
    pub http_fetcher: Option<Arc<HttpFetcher>>,
    pub ocr: Option<Arc<dyn OcrService>>,
}

fn validate_required_fields(opp: &Opportunity) -> Option<String> {
    if opp.notice_id.trim().is_empty() {
        return Some("missing required field: notice_id".to_string());
    }
    if opp.title.trim().is_empty() {
        return Some("missing required field: title".to_string());
    }
    // posted_date is non-optional on Opportunity; a zero/default value
    // signals the caller never populated it.
    if opp.posted_date.timestamp() == 0 {
        return Some("missing required field: posted_date".to_string());
    }
    None
}

/// Runs the nine-step pipeline in spec.md §4.5 order. Each step is
/// idempotent by construction: segment embedding keys are deterministic
/// and skip-on-exists, and the final KV upsert simply replaces any prior
/// record for the same `notice_id`.
pub async fn process_opportunity(ctx: &ProcessorContext, mut opportunity: Opportunity) -> ProcessOutcome {
    let notice_id = opportunity.notice_id.clone();

    // Step 1: lookup existing record.
    if let Some(existing) = ctx.opportunities.get(&notice_id).await {
        if existing.processing_status != ProcessingStatus::Error {
            return ProcessOutcome::AlreadyExists { notice_id };
        }
    }

    // Step 2: validate.
    if let Some(reason) = validate_required_fields(&opportunity) {
        persist_error(ctx, &opportunity, &reason).await;
        return ProcessOutcome::ValidationFailed { notice_id, reason };
    }

    // Step 3: normalize derived status (dates/currency are normalized
    // by the caller building `Opportunity` — see crate::normalize).
    let (active, status) = derive_status(opportunity.archive_date, opportunity.response_deadline, opportunity.active, Utc::now());
    opportunity.active = active;
    let _ = status;

    match run_pipeline(ctx, opportunity.clone()).await {
        Ok(embeddings_written) => ProcessOutcome::Completed { notice_id, embeddings_written },
        Err(err) => {
            persist_error(ctx, &opportunity, &err.to_string()).await;
            ProcessOutcome::Failed { notice_id: opportunity.notice_id, reason: err.to_string() }
        }
    }
}

async fn run_pipeline(ctx: &ProcessorContext, mut opportunity: Opportunity) -> anyhow::Result<usize> {
    let mut embeddings_written = 0usize;
    let mut section_keys = Vec::new();

    // Step 4 + 5: segment composition and per-segment embedding.
    for (segment_name, text) in all_segments(&opportunity) {
        if text.len() < MIN_SEGMENT_CHARS {
            continue;
        }

        let key = opportunity_embedding_key(opportunity.posted_date, &opportunity.notice_id, segment_name);
        if ctx.object_store.exists(&key).await? {
            continue;
        }

        let outcome = embed(ctx.embedding_model.as_ref(), &text, EmbeddingRole::SearchDocument).await?;
        let record = EmbeddingRecord {
            owner_id: opportunity.notice_id.clone(),
            content_type: content_type_for_segment(segment_name),
            vector: outcome.vector,
            source_text_preview: text.chars().take(280).collect(),
            token_count: outcome.token_count,
            model_id: "gcm-embed/search_document".to_string(),
            generated_at: Utc::now(),
            metadata: EmbeddingFilters {
                naics: opportunity.naics_code.clone(),
                agency: opportunity.agency.clone(),
                state: opportunity.place_of_performance.state.clone(),
                posted_date: Some(opportunity.posted_date),
                archive_date: opportunity.archive_date,
            },
        };

        ctx.object_store.put(&key, serde_json::to_vec(&record)?.as_slice()).await?;
        ctx.vector_index
            .upsert(
                vector_index_key("opportunity_embedding", &key),
                VectorIndexEntry {
                    entity_type: EntityType::Opportunity,
                    entity_id: opportunity.notice_id.clone(),
                    object_store_uri: key.clone(),
                    filters: record.metadata.clone(),
                },
            )
            .await;

        if segment_name == "main" {
            opportunity.embedding_metadata.summary_key = Some(key.clone());
        } else {
            section_keys.push(key.clone());
        }
        embeddings_written += 1;
    }
    opportunity.embedding_metadata.section_keys = section_keys;

    // Step 6: attachments.
    let mut chunk_keys = Vec::new();
    for attachment in opportunity.attachments.clone() {
        embeddings_written += process_attachment(ctx, &opportunity, &attachment, &mut chunk_keys).await?;
    }
    opportunity.embedding_metadata.chunk_keys = chunk_keys;

    // Step 7: upsert KV record.
    opportunity.processing_status = ProcessingStatus::Completed;
    opportunity.error_message = None;
    opportunity.updated_at = Utc::now();
    ctx.opportunities.upsert(opportunity.notice_id.clone(), opportunity).await;

    Ok(embeddings_written)
}

async fn process_attachment(
    ctx: &ProcessorContext,
    opportunity: &Opportunity,
    attachment: &Attachment,
    chunk_keys: &mut Vec<String>,
) -> anyhow::Result<usize> {
    let Some(fetcher) = &ctx.http_fetcher else {
        tracing::warn!(attachment_id = %attachment.attachment_id, "no http fetcher configured, skipping attachment");
        return Ok(0);
    };

    let fetched = fetcher
        .fetch_bytes(uuid::Uuid::new_v4(), &opportunity.notice_id, &attachment.url)
        .await?;

    let extraction = gcm_extract::extract(&fetched.body, &attachment.filename, ctx.ocr.clone()).await;
    let Some(document) = extraction.document else {
        return Ok(0);
    };

    let chunks = chunk_text(&document.full_text, gcm_embed::CHUNK_WORDS, gcm_embed::OVERLAP_WORDS);
    let mut written = 0usize;

    for (i, chunk) in chunks.iter().enumerate() {
        let key = opportunity_attachment_chunk_key(opportunity.posted_date, &opportunity.notice_id, &attachment.attachment_id, i);
        if ctx.object_store.exists(&key).await? {
            chunk_keys.push(key);
            continue;
        }

        let outcome = embed(ctx.embedding_model.as_ref(), &chunk.text, EmbeddingRole::SearchDocument).await?;
        let record = EmbeddingRecord {
            owner_id: opportunity.notice_id.clone(),
            content_type: ContentType::Chunk,
            vector: outcome.vector,
            source_text_preview: chunk.text.chars().take(280).collect(),
            token_count: outcome.token_count,
            model_id: "gcm-embed/search_document".to_string(),
            generated_at: Utc::now(),
            metadata: EmbeddingFilters::default(),
        };

        ctx.object_store.put(&key, serde_json::to_vec(&record)?.as_slice()).await?;
        ctx.vector_index
            .upsert(
                vector_index_key("attachment_chunk", &key),
                VectorIndexEntry {
                    entity_type: EntityType::Opportunity,
                    entity_id: opportunity.notice_id.clone(),
                    object_store_uri: key.clone(),
                    filters: EmbeddingFilters::default(),
                },
            )
            .await;

        chunk_keys.push(key);
        written += 1;
    }

    Ok(written)
}

fn content_type_for_segment(segment: &str) -> ContentType {
    match segment {
        "title" => ContentType::Title,
        "description" => ContentType::Description,
        "agency" => ContentType::Agency,
        "location" => ContentType::Location,
        "classification" => ContentType::Classification,
        _ => ContentType::Main,
    }
}

async fn persist_error(ctx: &ProcessorContext, opportunity: &Opportunity, reason: &str) {
    let mut error_record = opportunity.clone();
    error_record.processing_status = ProcessingStatus::Error;
    error_record.error_message = Some(reason.to_string());
    error_record.retry_count += 1;
    error_record.updated_at = Utc::now();
    ctx.opportunities.upsert(error_record.notice_id.clone(), error_record).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcm_core::opportunity::{Contact, PlaceOfPerformance};
    use gcm_embed::FixedVectorEmbeddingModel;
    use gcm_storage::{InMemoryKvTable, LocalObjectStore};
    use tempfile::tempdir;

    fn sample_opportunity(notice_id: &str) -> Opportunity {
        Opportunity {
            notice_id: notice_id.into(),
            title: "Network Modernization".into(),
            solicitation_number: None,
            department: Some("DoD".into()),
            agency: Some("DoD".into()),
            office: Some("Army".into()),
            posted_date: Utc::now(),
            response_deadline: None,
            archive_date: None,
            notice_type: None,
            naics_code: Some("541512".into()),
            set_aside_code: None,
            set_aside_label: None,
            place_of_performance: PlaceOfPerformance { city: Some("Austin".into()), state: Some("TX".into()), ..Default::default() },
            award: None,
            primary_contact: Contact::default(),
            secondary_contact: Contact::default(),
            description: Some("Upgrade the base network infrastructure across three sites.".into()),
            active: true,
            attachments: Vec::new(),
            embedding_metadata: EmbeddingMetadata::default(),
            processing_status: ProcessingStatus::Pending,
            error_message: None,
            retry_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn context(dir: &std::path::Path) -> ProcessorContext {
        ProcessorContext {
            object_store: Arc::new(LocalObjectStore::new(dir)),
            opportunities: Arc::new(InMemoryKvTable::new()),
            vector_index: Arc::new(InMemoryKvTable::new()),
            embedding_model: Arc::new(FixedVectorEmbeddingModel::default()),
            http_fetcher: None,
            ocr: None,
        }
    }

    #[tokio::test]
    async fn completes_and_writes_segment_embeddings() {
        let dir = tempdir().unwrap();
        let ctx = context(dir.path());
        let outcome = process_opportunity(&ctx, sample_opportunity("OPP-1")).await;
        match outcome {
            ProcessOutcome::Completed { embeddings_written, .. } => assert!(embeddings_written > 0),
            other => panic!("expected Completed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn reprocessing_same_notice_id_returns_already_exists() {
        let dir = tempdir().unwrap();
        let ctx = context(dir.path());
        process_opportunity(&ctx, sample_opportunity("OPP-2")).await;
        let second = process_opportunity(&ctx, sample_opportunity("OPP-2")).await;
        assert!(matches!(second, ProcessOutcome::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn missing_title_fails_validation_and_persists_error_record() {
        let dir = tempdir().unwrap();
        let ctx = context(dir.path());
        let mut opp = sample_opportunity("OPP-3");
        opp.title = "".to_string();

        let outcome = process_opportunity(&ctx, opp).await;
        assert!(matches!(outcome, ProcessOutcome::ValidationFailed { .. }));

        let persisted = ctx.opportunities.get("OPP-3").await.unwrap();
        assert_eq!(persisted.processing_status, ProcessingStatus::Error);
    }

    #[tokio::test]
    async fn rerunning_after_completion_skips_existing_embedding_keys() {
        let dir = tempdir().unwrap();
        let ctx = context(dir.path());
        let opp = sample_opportunity("OPP-4");
        let key = opportunity_embedding_key(opp.posted_date, "OPP-4", "main");

        process_opportunity(&ctx, opp).await;
        assert!(ctx.object_store.exists(&key).await.unwrap());
    }
}
