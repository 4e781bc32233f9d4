//! Document text extraction (spec §4.1-§4.2): format sniffing, per-format
//! text extraction with a never-raise contract, text cleaning, permissive
//! decoding, and sentence-aware chunking.

pub mod chunker;
pub mod clean;
pub mod csv_extract;
pub mod decode;
pub mod docx;
pub mod extract;
pub mod format;
pub mod html;
pub mod model;
pub mod ocr;
pub mod pdf;
pub mod text;
pub mod xlsx;

pub use chunker::{chunk, chunk_with_strategy, Chunk, ChunkStrategy};
pub use extract::extract;
pub use format::{dispatch_format, DocumentFormat, ImageKind};
pub use model::{
    ExtractedDocument, ExtractedTable, ExtractionMetadata, ExtractionOutcome, StructureElement,
    StructureKind,
};
pub use ocr::{OcrError, OcrService, TempBlobGuard};

pub const CRATE_NAME: &str = "gcm-extract";
