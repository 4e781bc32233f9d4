//! Multi-level embedding strategy (spec §4.4): for one cleaned document,
//! produce embeddings at four levels — full document, sections, chunks,
//! paragraphs — and report an aggregate summary.

use std::collections::BTreeMap;

use chrono::Utc;
use gcm_core::embedding::{ContentType, EmbeddingFilters, EmbeddingLevel, EmbeddingRecord, MultiLevelEmbeddingSummary};
use gcm_extract::chunk as chunk_text;

use crate::embedder::{embed, EmbedError, EmbeddingModel, EmbeddingRole, TOKEN_CEILING_WORDS};
use crate::sections::{identify_sections, top_paragraphs};
use crate::summarizer::{SummarizerLlm, LlmError, SUMMARIZE_PROMPT};

pub const CHUNK_WORDS: usize = 1000;
pub const OVERLAP_WORDS: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum MultiLevelError {
    #[error("embedding failed: {0}")]
    Embed(#[from] EmbedError),
    #[error("summarization failed: {0}")]
    Summarize(#[from] LlmError),
}

pub struct MultiLevelOutput {
    pub records: Vec<EmbeddingRecord>,
    pub summary: MultiLevelEmbeddingSummary,
}

fn model_id(role: EmbeddingRole) -> &'static str {
    match role {
        EmbeddingRole::SearchDocument => "gcm-embed/search_document",
        EmbeddingRole::SearchQuery => "gcm-embed/search_query",
    }
}

async fn make_record(
    model: &dyn EmbeddingModel,
    owner_id: &str,
    content_type: ContentType,
    text: &str,
    filters: &EmbeddingFilters,
) -> Result<EmbeddingRecord, MultiLevelError> {
    let outcome = embed(model, text, EmbeddingRole::SearchDocument).await?;
    Ok(EmbeddingRecord {
        owner_id: owner_id.to_string(),
        content_type,
        vector: outcome.vector,
        source_text_preview: text.chars().take(280).collect(),
        token_count: outcome.token_count,
        model_id: model_id(EmbeddingRole::SearchDocument).to_string(),
        generated_at: Utc::now(),
        metadata: filters.clone(),
    })
}

/// Produces the full_document/sections/chunks/paragraphs embedding set
/// for `cleaned_text`. `owner_id` is the deterministic-key-builder
/// owning entity (an opportunity notice id or a company document id).
pub async fn embed_multi_level(
    model: &dyn EmbeddingModel,
    summarizer: &dyn SummarizerLlm,
    owner_id: &str,
    cleaned_text: &str,
    filters: EmbeddingFilters,
) -> Result<MultiLevelOutput, MultiLevelError> {
    let mut records = Vec::new();
    let mut levels_created = Vec::new();
    let mut distribution: BTreeMap<EmbeddingLevel, usize> = BTreeMap::new();

    let word_count = cleaned_text.split_whitespace().count();
    let full_document_text = if word_count > TOKEN_CEILING_WORDS {
        summarizer.summarize(SUMMARIZE_PROMPT, cleaned_text).await?
    } else {
        cleaned_text.to_string()
    };
    let full_content_type = if word_count > TOKEN_CEILING_WORDS { ContentType::Summary } else { ContentType::Main };
    records.push(make_record(model, owner_id, full_content_type, &full_document_text, &filters).await?);
    levels_created.push(EmbeddingLevel::FullDocument);
    distribution.insert(EmbeddingLevel::FullDocument, 1);

    let sections = identify_sections(cleaned_text);
    if !sections.is_empty() {
        for section in &sections {
            records.push(make_record(model, owner_id, ContentType::Section, &section.body, &filters).await?);
        }
        levels_created.push(EmbeddingLevel::Sections);
        distribution.insert(EmbeddingLevel::Sections, sections.len());
    }

    let chunks = chunk_text(cleaned_text, CHUNK_WORDS, OVERLAP_WORDS);
    if !chunks.is_empty() {
        for chunk in &chunks {
            records.push(make_record(model, owner_id, ContentType::Chunk, &chunk.text, &filters).await?);
        }
        levels_created.push(EmbeddingLevel::Chunks);
        distribution.insert(EmbeddingLevel::Chunks, chunks.len());
    }

    let paragraphs = top_paragraphs(cleaned_text);
    if !paragraphs.is_empty() {
        for paragraph in &paragraphs {
            records.push(make_record(model, owner_id, ContentType::Paragraph, paragraph, &filters).await?);
        }
        levels_created.push(EmbeddingLevel::Paragraphs);
        distribution.insert(EmbeddingLevel::Paragraphs, paragraphs.len());
    }

    let summary = MultiLevelEmbeddingSummary {
        total_embeddings: records.len(),
        levels_created,
        embedding_distribution: distribution,
    };

    Ok(MultiLevelOutput { records, summary })
}
