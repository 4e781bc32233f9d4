//! Embedder (spec §4.3): `embed(text, role) -> vector[1024]`. The model
//! itself lives outside this crate's scope — `EmbeddingModel` is the
//! seam, backed in production by whatever managed embedding service is
//! configured and by [`FixedVectorEmbeddingModel`] in tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use gcm_core::embedding::EMBEDDING_DIMENSIONS;
use thiserror::Error;

/// Proxy for the model's real token ceiling: word count above this
/// threshold is truncated before the call, since counting actual model
/// tokens would require pulling in the model's tokenizer.
pub const TOKEN_CEILING_WORDS: usize = 8000;

const MAX_RETRIES: u32 = 3;
const BASE_BACKOFF_MS: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingRole {
    SearchDocument,
    SearchQuery,
}

#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("embedding backend error: {0}")]
    Backend(String),
    #[error("embedding backend unavailable after {0} attempts: {1}")]
    Exhausted(u32, String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmbedOutcome {
    pub vector: Vec<f32>,
    pub truncated: bool,
    pub token_count: usize,
}

#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    async fn embed_raw(&self, text: &str, role: EmbeddingRole) -> Result<Vec<f32>, EmbedError>;
}

/// Truncates `text` to [`TOKEN_CEILING_WORDS`] words (proxy for the
/// model's real token ceiling) and retries transient backend failures up
/// to 3 times with exponential backoff, per spec §4.3.
pub async fn embed(
    model: &dyn EmbeddingModel,
    text: &str,
    role: EmbeddingRole,
) -> Result<EmbedOutcome, EmbedError> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let truncated = words.len() > TOKEN_CEILING_WORDS;
    let effective_text = if truncated {
        words[..TOKEN_CEILING_WORDS].join(" ")
    } else {
        text.to_string()
    };
    let token_count = effective_text.split_whitespace().count();

    if truncated {
        tracing::warn!(
            original_words = words.len(),
            ceiling = TOKEN_CEILING_WORDS,
            "embedder: truncating text before embedding call"
        );
    }

    let mut attempt = 0u32;
    loop {
        match model.embed_raw(&effective_text, role).await {
            Ok(vector) => return Ok(EmbedOutcome { vector, truncated, token_count }),
            Err(err) => {
                attempt += 1;
                if attempt >= MAX_RETRIES {
                    return Err(EmbedError::Exhausted(attempt, err.to_string()));
                }
                let backoff = BASE_BACKOFF_MS * 2u64.pow(attempt - 1);
                tracing::warn!(attempt, %err, "embedder: transient failure, retrying");
                tokio::time::sleep(Duration::from_millis(backoff)).await;
            }
        }
    }
}

/// Deterministic test double: hashes the text into a fixed-dimension
/// unit vector so assertions can compare similarity behavior without a
/// real model backend.
pub struct FixedVectorEmbeddingModel {
    pub fail_n_times: AtomicUsize,
}

impl Default for FixedVectorEmbeddingModel {
    fn default() -> Self {
        Self { fail_n_times: AtomicUsize::new(0) }
    }
}

impl FixedVectorEmbeddingModel {
    pub fn failing(n: usize) -> Self {
        Self { fail_n_times: AtomicUsize::new(n) }
    }
}

#[async_trait]
impl EmbeddingModel for FixedVectorEmbeddingModel {
    async fn embed_raw(&self, text: &str, _role: EmbeddingRole) -> Result<Vec<f32>, EmbedError> {
        let remaining = self.fail_n_times.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_n_times.store(remaining - 1, Ordering::SeqCst);
            return Err(EmbedError::Backend("simulated transient failure".into()));
        }

        let mut vector = vec![0.0f32; EMBEDDING_DIMENSIONS];
        for (i, byte) in text.bytes().enumerate() {
            vector[i % EMBEDDING_DIMENSIONS] += byte as f32;
        }
        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        } else {
            vector[0] = 1.0;
        }
        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn truncates_text_above_token_ceiling() {
        let model = FixedVectorEmbeddingModel::default();
        let long_text = "word ".repeat(TOKEN_CEILING_WORDS + 500);
        let outcome = embed(&model, &long_text, EmbeddingRole::SearchDocument).await.unwrap();
        assert!(outcome.truncated);
        assert_eq!(outcome.token_count, TOKEN_CEILING_WORDS);
    }

    #[tokio::test]
    async fn does_not_truncate_short_text() {
        let model = FixedVectorEmbeddingModel::default();
        let outcome = embed(&model, "a short document", EmbeddingRole::SearchQuery).await.unwrap();
        assert!(!outcome.truncated);
    }

    #[tokio::test]
    async fn retries_transient_failures_then_succeeds() {
        let model = FixedVectorEmbeddingModel::failing(2);
        let outcome = embed(&model, "hello world", EmbeddingRole::SearchDocument).await.unwrap();
        assert_eq!(outcome.vector.len(), EMBEDDING_DIMENSIONS);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let model = FixedVectorEmbeddingModel::failing(10);
        let result = embed(&model, "hello world", EmbeddingRole::SearchDocument).await;
        assert!(matches!(result, Err(EmbedError::Exhausted(3, _))));
    }

    #[tokio::test]
    async fn returned_vector_is_unit_normalized() {
        let model = FixedVectorEmbeddingModel::default();
        let outcome = embed(&model, "consistent text for normalization", EmbeddingRole::SearchDocument)
            .await
            .unwrap();
        let norm: f32 = outcome.vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }
}
