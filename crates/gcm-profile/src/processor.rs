//! Profile document processing pipeline (spec §4.7): one worker per
//! document — extract (C1) → classify → structured extraction (branch
//! by category) → multi-level embeddings (C4) → persist. Also owns
//! document deletion, which must trigger profile re-embedding regardless
//! of caller (spec §9 open question #4).

use std::sync::Arc;

use chrono::Utc;
use gcm_core::company::{CompanyDocument, CompanyProfile, DocumentStatus};
use gcm_core::embedding::{EmbeddingFilters, EntityType, VectorIndexEntry};
use gcm_embed::embedder::EmbeddingModel;
use gcm_embed::multilevel::embed_multi_level;
use gcm_embed::summarizer::SummarizerLlm;
use gcm_extract::ocr::OcrService;
use gcm_storage::keys::{tenant_embedding_key, tenant_processed_document_key, vector_index_key};
use gcm_storage::{KvTable, ObjectStore};
use thiserror::Error;

use crate::capability_extractor::extract_capability_statement;
use crate::classifier::{classify, ClassificationResult};
use crate::llm_fill::FieldExtractionLlm;
use crate::resume_extractor::extract_resume;
use gcm_embed::summarizer::TextClassifierLlm;

#[derive(Debug, Error)]
pub enum ProfileProcessingError {
    #[error("company {0} not found")]
    CompanyNotFound(String),
    #[error("document {0} not found on company profile")]
    DocumentNotFound(String),
    #[error("object store error: {0}")]
    Storage(#[from] gcm_storage::ObjectStoreError),
    #[error("embedding failed: {0}")]
    Embed(#[from] gcm_embed::multilevel::MultiLevelError),
}

pub struct ProfileDocumentContext {
    pub object_store: Arc<dyn ObjectStore>,
    pub companies: Arc<dyn KvTable<CompanyProfile>>,
    pub vector_index: Arc<dyn KvTable<VectorIndexEntry>>,
    pub embedding_model: Arc<dyn EmbeddingModel>,
    pub summarizer: Arc<dyn SummarizerLlm>,
    pub classifier_llm: Arc<dyn TextClassifierLlm>,
    pub field_llm: Arc<dyn FieldExtractionLlm>,
    pub ocr: Option<Arc<dyn OcrService>>,
}

#[derive(Debug, Clone)]
pub struct ProcessedDocumentOutcome {
    pub document_id: String,
    pub classification: ClassificationResult,
    pub embeddings_written: usize,
}

fn find_document_index(profile: &CompanyProfile, document_id: &str) -> Option<usize> {
    profile.documents.iter().position(|doc| doc.document_id == document_id)
}

/// Runs the full per-document pipeline (spec §4.7 second paragraph) and
/// persists the updated company profile.
pub async fn process_document(
    ctx: &ProfileDocumentContext,
    company_id: &str,
    document_id: &str,
) -> Result<ProcessedDocumentOutcome, ProfileProcessingError> {
    let mut profile = ctx
        .companies
        .get(company_id)
        .await
        .ok_or_else(|| ProfileProcessingError::CompanyNotFound(company_id.to_string()))?;

    let doc_index =
        find_document_index(&profile, document_id).ok_or_else(|| ProfileProcessingError::DocumentNotFound(document_id.to_string()))?;
    let document = profile.documents[doc_index].clone();

    let raw_bytes = ctx.object_store.get(&document.s3_key).await?;
    let extraction = gcm_extract::extract(&raw_bytes, &document.filename, ctx.ocr.clone()).await;
    let Some(extracted) = extraction.document else {
        mark_failed(ctx, &mut profile, doc_index).await;
        return Err(ProfileProcessingError::Storage(gcm_storage::ObjectStoreError::NotFound(document.s3_key.clone())));
    };

    let processed_key = tenant_processed_document_key(company_id, document_id, &document.filename);
    ctx.object_store.put(&processed_key, extracted.full_text.as_bytes()).await?;

    let classification = classify(&document.filename, &extracted.full_text, ctx.classifier_llm.as_ref()).await;

    match classification.primary_category.as_str() {
        "team-resumes" => {
            let _ = extract_resume(&extracted.full_text, ctx.field_llm.as_ref()).await;
        }
        "capability-statements" => {
            let _ = extract_capability_statement(&extracted.full_text, ctx.field_llm.as_ref()).await;
        }
        _ => {}
    }

    let output = embed_multi_level(
        ctx.embedding_model.as_ref(),
        ctx.summarizer.as_ref(),
        document_id,
        &extracted.full_text,
        EmbeddingFilters::default(),
    )
    .await?;

    let mut chunk_keys = Vec::new();
    for record in &output.records {
        let level = level_name(level_for_content_type(record.content_type));
        let key = tenant_embedding_key(company_id, level, document_id, chunk_keys.len());
        ctx.object_store.put(&key, serde_json::to_vec(record).unwrap_or_default().as_slice()).await?;
        ctx.vector_index
            .upsert(
                vector_index_key("company_document_embedding", &key),
                VectorIndexEntry {
                    entity_type: EntityType::CompanyDocument,
                    entity_id: document_id.to_string(),
                    object_store_uri: key.clone(),
                    filters: record.metadata.clone(),
                },
            )
            .await;
        chunk_keys.push(key);
    }

    profile.documents[doc_index].status = DocumentStatus::Processed;
    profile.documents[doc_index].tags = vec![classification.primary_category.clone()];
    profile.embedding_metadata.document_chunk_keys.extend(chunk_keys.clone());
    profile.updated_at = Utc::now();
    ctx.companies.upsert(company_id.to_string(), profile).await;

    Ok(ProcessedDocumentOutcome { document_id: document_id.to_string(), classification, embeddings_written: chunk_keys.len() })
}

async fn mark_failed(ctx: &ProfileDocumentContext, profile: &mut CompanyProfile, doc_index: usize) {
    profile.documents[doc_index].status = DocumentStatus::Failed;
    profile.updated_at = Utc::now();
    ctx.companies.upsert(profile.company_id.clone(), profile.clone()).await;
}

fn level_name(level: gcm_core::embedding::EmbeddingLevel) -> &'static str {
    use gcm_core::embedding::EmbeddingLevel::*;
    match level {
        FullDocument => "full_document",
        Sections => "sections",
        Chunks => "chunks",
        Paragraphs => "paragraphs",
    }
}

fn level_for_content_type(content_type: gcm_core::embedding::ContentType) -> gcm_core::embedding::EmbeddingLevel {
    use gcm_core::embedding::ContentType::*;
    use gcm_core::embedding::EmbeddingLevel;
    match content_type {
        Main | Summary => EmbeddingLevel::FullDocument,
        Section => EmbeddingLevel::Sections,
        Chunk => EmbeddingLevel::Chunks,
        Paragraph => EmbeddingLevel::Paragraphs,
        Title | Description | Agency | Location | Classification => EmbeddingLevel::FullDocument,
    }
}

/// Deletes a company document: removes it from the profile, best-effort
/// deletes its blobs, drops its vector-index entries, and re-embeds the
/// profile. Called from both the HTTP delete handler and any queued
/// deletion-processing path so the re-embedding trigger is never
/// conditional on the caller (spec §9 open question #4).
pub async fn delete_document(
    ctx: &ProfileDocumentContext,
    company_id: &str,
    document_id: &str,
) -> Result<(), ProfileProcessingError> {
    let mut profile = ctx
        .companies
        .get(company_id)
        .await
        .ok_or_else(|| ProfileProcessingError::CompanyNotFound(company_id.to_string()))?;

    let doc_index =
        find_document_index(&profile, document_id).ok_or_else(|| ProfileProcessingError::DocumentNotFound(document_id.to_string()))?;
    let document = profile.documents.remove(doc_index);

    let _ = ctx.object_store.delete(&document.s3_key).await;
    let processed_key = tenant_processed_document_key(company_id, document_id, &document.filename);
    let _ = ctx.object_store.delete(&processed_key).await;

    profile.embedding_metadata.document_chunk_keys.retain(|key| !key.contains(document_id));
    profile.updated_at = Utc::now();
    ctx.companies.upsert(company_id.to_string(), profile.clone()).await;

    reembed_profile(ctx, company_id).await
}

/// Recomputes the profile-level embedding from the remaining capability
/// statement (or legal name as a fallback) so deletions never leave a
/// stale profile-level vector behind.
pub async fn reembed_profile(ctx: &ProfileDocumentContext, company_id: &str) -> Result<(), ProfileProcessingError> {
    let mut profile = ctx
        .companies
        .get(company_id)
        .await
        .ok_or_else(|| ProfileProcessingError::CompanyNotFound(company_id.to_string()))?;

    let source_text = profile.capability_statement.clone().unwrap_or_else(|| profile.legal_name.clone());
    if source_text.trim().is_empty() {
        return Ok(());
    }

    let output = embed_multi_level(
        ctx.embedding_model.as_ref(),
        ctx.summarizer.as_ref(),
        company_id,
        &source_text,
        EmbeddingFilters::default(),
    )
    .await?;

    if let Some(full_document_record) = output.records.first() {
        let key = tenant_embedding_key(company_id, "profile_summary", company_id, 0);
        ctx.object_store.put(&key, serde_json::to_vec(full_document_record).unwrap_or_default().as_slice()).await?;
        ctx.vector_index
            .upsert(
                vector_index_key("company_profile_embedding", company_id),
                VectorIndexEntry {
                    entity_type: EntityType::CompanyProfile,
                    entity_id: company_id.to_string(),
                    object_store_uri: key.clone(),
                    filters: full_document_record.metadata.clone(),
                },
            )
            .await;
        profile.embedding_metadata.summary_key = Some(key);
    }

    profile.updated_at = Utc::now();
    ctx.companies.upsert(company_id.to_string(), profile).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcm_core::company::{CompanyEmbeddingMetadata, ContactInfo};
    use gcm_embed::{FixedVectorEmbeddingModel, TemplateSummarizer, UniformTextClassifier};
    use gcm_storage::{InMemoryKvTable, LocalObjectStore};
    use tempfile::tempdir;

    use crate::llm_fill::NullFieldExtractionLlm;

    fn sample_profile(company_id: &str, document: CompanyDocument) -> CompanyProfile {
        CompanyProfile {
            company_id: company_id.to_string(),
            tenant_id: company_id.to_string(),
            legal_name: "Acme Co".to_string(),
            primary_contact: ContactInfo::default(),
            website_url: None,
            naics_codes: vec!["541511".to_string()],
            certifications: vec![],
            revenue_range: None,
            employee_count: None,
            locations: vec![],
            capability_statement: Some("Acme Co builds secure software for federal agencies.".to_string()),
            past_performance: vec![],
            documents: vec![document],
            embedding_metadata: CompanyEmbeddingMetadata::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn context(dir: &std::path::Path) -> (ProfileDocumentContext, Arc<dyn KvTable<CompanyProfile>>) {
        let companies: Arc<dyn KvTable<CompanyProfile>> = Arc::new(InMemoryKvTable::new());
        let ctx = ProfileDocumentContext {
            object_store: Arc::new(LocalObjectStore::new(dir)),
            companies: companies.clone(),
            vector_index: Arc::new(InMemoryKvTable::new()),
            embedding_model: Arc::new(FixedVectorEmbeddingModel::default()),
            summarizer: Arc::new(TemplateSummarizer),
            classifier_llm: Arc::new(UniformTextClassifier),
            field_llm: Arc::new(NullFieldExtractionLlm),
            ocr: None,
        };
        (ctx, companies)
    }

    #[tokio::test]
    async fn processes_document_and_marks_it_processed() {
        let dir = tempdir().unwrap();
        let (ctx, companies) = context(dir.path());

        let document = CompanyDocument {
            document_id: "doc-1".into(),
            filename: "resume.txt".into(),
            category: "team-resumes".into(),
            s3_key: "tenants/acme/raw/doc-1/resume.txt".into(),
            status: DocumentStatus::Uploaded,
            size: 100,
            mime: "text/plain".into(),
            tags: vec![],
            version: 1,
        };
        ctx.object_store
            .put(&document.s3_key, b"John Doe\nSenior Engineer, Tech Corp, 2020-Present\nSkills\nRust")
            .await
            .unwrap();
        companies.upsert("acme".into(), sample_profile("acme", document)).await;

        let outcome = process_document(&ctx, "acme", "doc-1").await.unwrap();
        assert!(outcome.embeddings_written > 0);

        let updated = companies.get("acme").await.unwrap();
        assert_eq!(updated.documents[0].status, DocumentStatus::Processed);
    }

    #[tokio::test]
    async fn deleting_document_removes_it_and_reembeds_profile() {
        let dir = tempdir().unwrap();
        let (ctx, companies) = context(dir.path());

        let document = CompanyDocument {
            document_id: "doc-2".into(),
            filename: "resume.txt".into(),
            category: "team-resumes".into(),
            s3_key: "tenants/acme/raw/doc-2/resume.txt".into(),
            status: DocumentStatus::Processed,
            size: 10,
            mime: "text/plain".into(),
            tags: vec![],
            version: 1,
        };
        ctx.object_store.put(&document.s3_key, b"content").await.unwrap();
        companies.upsert("acme".into(), sample_profile("acme", document)).await;

        delete_document(&ctx, "acme", "doc-2").await.unwrap();

        let updated = companies.get("acme").await.unwrap();
        assert!(updated.documents.is_empty());
        assert!(updated.embedding_metadata.summary_key.is_some());
    }
}
