//! `SummarizerLlm` is the external black-box seam for LLM summarization
//! (spec §4.4) — used when a document exceeds the embedder's token
//! ceiling and needs a 2-3 paragraph summary before the full_document
//! level can be embedded. [`TextClassifierLlm`] is the sibling seam
//! reused by the profile classifier (spec §4.7), kept here so C4/C7
//! share one consistent "LLM" abstraction per SPEC_FULL §6.

use async_trait::async_trait;
use thiserror::Error;

pub const SUMMARIZE_PROMPT: &str =
    "Summarize this document in 2-3 paragraphs, capturing the key information, main topics, and important details.";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("llm backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait SummarizerLlm: Send + Sync {
    async fn summarize(&self, prompt: &str, text: &str) -> Result<String, LlmError>;
}

#[async_trait]
pub trait TextClassifierLlm: Send + Sync {
    /// Returns a probability vector over `labels`, one entry per label,
    /// summing to ~1.0.
    async fn classify(&self, text: &str, labels: &[String]) -> Result<Vec<f64>, LlmError>;
}

/// Deterministic test double: "summarizes" by taking the first two
/// sentences, never calling out to a real backend.
pub struct TemplateSummarizer;

#[async_trait]
impl SummarizerLlm for TemplateSummarizer {
    async fn summarize(&self, _prompt: &str, text: &str) -> Result<String, LlmError> {
        let sentences: Vec<&str> = text.split_terminator('.').take(3).collect();
        Ok(sentences.join(".").trim().to_string() + ".")
    }
}

/// Deterministic test double: assigns uniform probability across labels.
pub struct UniformTextClassifier;

#[async_trait]
impl TextClassifierLlm for UniformTextClassifier {
    async fn classify(&self, _text: &str, labels: &[String]) -> Result<Vec<f64>, LlmError> {
        if labels.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![1.0 / labels.len() as f64; labels.len()])
    }
}
