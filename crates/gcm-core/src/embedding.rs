//! Embedding Record and Vector Index Entry (spec §3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const EMBEDDING_DIMENSIONS: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ContentType {
    Main,
    Title,
    Description,
    Agency,
    Location,
    Classification,
    Summary,
    Section,
    Chunk,
    Paragraph,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Main => "main",
            ContentType::Title => "title",
            ContentType::Description => "description",
            ContentType::Agency => "agency",
            ContentType::Location => "location",
            ContentType::Classification => "classification",
            ContentType::Summary => "summary",
            ContentType::Section => "section",
            ContentType::Chunk => "chunk",
            ContentType::Paragraph => "paragraph",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EmbeddingFilters {
    pub naics: Option<String>,
    pub agency: Option<String>,
    pub state: Option<String>,
    pub posted_date: Option<DateTime<Utc>>,
    pub archive_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    pub owner_id: String,
    pub content_type: ContentType,
    pub vector: Vec<f32>,
    pub source_text_preview: String,
    pub token_count: usize,
    pub model_id: String,
    pub generated_at: DateTime<Utc>,
    pub metadata: EmbeddingFilters,
}

impl EmbeddingRecord {
    pub fn is_unit_normalized(&self, tolerance: f32) -> bool {
        let norm_sq: f32 = self.vector.iter().map(|x| x * x).sum();
        (norm_sq.sqrt() - 1.0).abs() <= tolerance
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityType {
    Opportunity,
    CompanyDocument,
    CompanyProfile,
}

/// Secondary KV store entry enabling metadata-filtered similarity
/// retrieval without scanning blobs (spec §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorIndexEntry {
    pub entity_type: EntityType,
    pub entity_id: String,
    pub object_store_uri: String,
    pub filters: EmbeddingFilters,
}

/// Level marker used by the multi-level embedding strategy summary
/// (spec §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EmbeddingLevel {
    FullDocument,
    Sections,
    Chunks,
    Paragraphs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiLevelEmbeddingSummary {
    pub total_embeddings: usize,
    pub levels_created: Vec<EmbeddingLevel>,
    pub embedding_distribution: BTreeMap<EmbeddingLevel, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_vector_passes_normalization_check() {
        let mut v = vec![0.0f32; EMBEDDING_DIMENSIONS];
        v[0] = 1.0;
        let record = EmbeddingRecord {
            owner_id: "opp-1".into(),
            content_type: ContentType::Main,
            vector: v,
            source_text_preview: "preview".into(),
            token_count: 1,
            model_id: "test-model".into(),
            generated_at: Utc::now(),
            metadata: EmbeddingFilters::default(),
        };
        assert!(record.is_unit_normalized(1e-4));
    }
}
