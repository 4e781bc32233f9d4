//! Embedder (C3) and multi-level embedding strategy (C4): spec §4.3-4.4.

pub mod embedder;
pub mod multilevel;
pub mod sections;
pub mod summarizer;

pub use embedder::{embed, EmbedError, EmbedOutcome, EmbeddingModel, EmbeddingRole, FixedVectorEmbeddingModel};
pub use multilevel::{embed_multi_level, MultiLevelError, MultiLevelOutput, CHUNK_WORDS, OVERLAP_WORDS};
pub use sections::{identify_sections, top_paragraphs, Section};
pub use summarizer::{LlmError, SummarizerLlm, TemplateSummarizer, TextClassifierLlm, UniformTextClassifier};

pub const CRATE_NAME: &str = "gcm-embed";
