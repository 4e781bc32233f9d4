//! Shared "fill the gaps" LLM seam (spec §4.7: resume and capability
//! statement extraction both "fall back to an LLM pass for fields the
//! regex-driven extractor couldn't find"). Kept as its own trait rather
//! than overloading [`gcm_embed::SummarizerLlm`], since this one returns
//! structured field values instead of prose.

use std::collections::BTreeMap;

use async_trait::async_trait;
use gcm_embed::LlmError;

#[async_trait]
pub trait FieldExtractionLlm: Send + Sync {
    /// Given the source `text` and the dotted field names the
    /// deterministic extractor left empty, returns whatever subset it
    /// could infer, keyed by the same field names.
    async fn fill_missing_fields(&self, text: &str, missing_fields: &[String]) -> Result<BTreeMap<String, String>, LlmError>;
}

/// Deterministic test double: never enriches anything. Mirrors
/// `gcm-embed`'s convention of a null-op test double per external seam.
pub struct NullFieldExtractionLlm;

#[async_trait]
impl FieldExtractionLlm for NullFieldExtractionLlm {
    async fn fill_missing_fields(&self, _text: &str, _missing_fields: &[String]) -> Result<BTreeMap<String, String>, LlmError> {
        Ok(BTreeMap::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn null_filler_returns_nothing() {
        let filled = NullFieldExtractionLlm.fill_missing_fields("text", &["personal_info.full_name".to_string()]).await.unwrap();
        assert!(filled.is_empty());
    }
}
