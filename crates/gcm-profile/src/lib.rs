//! Profile Ingestor (C7, spec §4.7): upload-intent issuance, document
//! classification, structured extractors (resume, capability statement),
//! the website scraper, and the per-document processing pipeline tying
//! them to the multi-level embedding strategy (C4).

pub mod capability_extractor;
pub mod classifier;
pub mod llm_fill;
pub mod processor;
pub mod resume_extractor;
pub mod upload_intent;
pub mod website_scraper;

pub use capability_extractor::{extract_capability_statement, CapabilityStatementExtraction, CompanyOverview};
pub use classifier::{classify, ClassificationConfidence, ClassificationResult};
pub use llm_fill::{FieldExtractionLlm, NullFieldExtractionLlm};
pub use processor::{delete_document, process_document, reembed_profile, ProfileDocumentContext, ProfileProcessingError};
pub use resume_extractor::{extract_resume, ResumeExtraction};
pub use upload_intent::{confirm_upload, issue_upload_token, pending_document, SignedUploadToken, UploadIntent, UploadIntentError};
pub use website_scraper::{new_rate_limiter, scrape_company_site, CompanyOverviewFromWeb, DomainRateLimiter, RobotsCache, ScrapedPage};

pub const CRATE_NAME: &str = "gcm-profile";
