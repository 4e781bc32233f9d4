//! PDF extraction (spec §4.1): vector text extraction page-by-page with
//! page separators, falling back to OCR when the primary path errors or
//! returns empty output.

use std::sync::Arc;

use crate::clean::clean_text;
use crate::model::{ExtractedDocument, ExtractionMetadata, StructureElement};
use crate::ocr::{OcrError, OcrService, TempBlobGuard, SYNC_MAX_BYTES};

pub fn extract_pdf_vector_text(bytes: &[u8]) -> anyhow::Result<String> {
    let text = pdf_extract::extract_text_from_mem(bytes)?;
    Ok(text)
}

/// Runs the vector-text path first; on error or blank output, falls
/// back to OCR — synchronously for blobs at or under
/// [`SYNC_MAX_BYTES`], by polling an async job handle above it. A
/// [`TempBlobGuard`] releases whatever scratch storage the OCR call
/// created, whichever branch is taken.
pub async fn extract_pdf(bytes: &[u8], ocr: Option<Arc<dyn OcrService>>) -> ExtractedDocument {
    match extract_pdf_vector_text(bytes) {
        Ok(text) if !text.trim().is_empty() => {
            return build_document(&text);
        }
        _ => {}
    }

    let Some(ocr) = ocr else {
        return build_document("");
    };

    let mut released = false;
    let mut guard = TempBlobGuard::new(|| released = true);

    let recognized = if bytes.len() <= SYNC_MAX_BYTES {
        ocr.recognize(bytes).await
    } else {
        match ocr.submit_async_job(bytes).await {
            Ok(job_id) => poll_until_complete(ocr.as_ref(), job_id).await,
            Err(err) => Err(err),
        }
    };

    guard.release_now();
    let _ = released;

    match recognized {
        Ok(text) => build_document(&text),
        Err(_) => build_document(""),
    }
}

async fn poll_until_complete(ocr: &dyn OcrService, job_id: uuid::Uuid) -> Result<String, OcrError> {
    const MAX_POLLS: u32 = 30;
    for _ in 0..MAX_POLLS {
        match ocr.poll_async_job(job_id).await {
            Ok(text) => return Ok(text),
            Err(OcrError::JobPending(_)) => {
                tokio::time::sleep(std::time::Duration::from_millis(500)).await;
                continue;
            }
            Err(err) => return Err(err),
        }
    }
    Err(OcrError::Backend(format!("job {job_id} did not complete within poll budget")))
}

fn build_document(raw_text: &str) -> ExtractedDocument {
    let pages: Vec<&str> = raw_text.split('\x0c').filter(|p| !p.trim().is_empty()).collect();
    let full_text = if pages.len() > 1 {
        pages.join("\n\n--- page break ---\n\n")
    } else {
        raw_text.to_string()
    };

    let structure = pages
        .iter()
        .flat_map(|page| page.split("\n\n"))
        .filter(|p| !p.trim().is_empty())
        .map(StructureElement::paragraph)
        .collect();

    ExtractedDocument {
        full_text: clean_text(&full_text),
        structure,
        tables: Vec::new(),
        metadata: ExtractionMetadata { page_or_sheet_count: Some(pages.len().max(1)), ..Default::default() },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct AlwaysFailsOcr;

    #[async_trait]
    impl OcrService for AlwaysFailsOcr {
        async fn recognize(&self, _bytes: &[u8]) -> Result<String, OcrError> {
            Err(OcrError::Backend("no backend configured in test".into()))
        }
        async fn submit_async_job(&self, _bytes: &[u8]) -> Result<uuid::Uuid, OcrError> {
            Err(OcrError::Backend("no backend configured in test".into()))
        }
        async fn poll_async_job(&self, job_id: uuid::Uuid) -> Result<String, OcrError> {
            Err(OcrError::JobFailed(job_id, "no backend".into()))
        }
    }

    #[tokio::test]
    async fn falls_back_to_empty_document_when_primary_and_ocr_both_fail() {
        let doc = extract_pdf(b"not a real pdf", Some(Arc::new(AlwaysFailsOcr))).await;
        assert!(doc.full_text.is_empty());
    }

    #[tokio::test]
    async fn falls_back_to_empty_document_with_no_ocr_configured() {
        let doc = extract_pdf(b"not a real pdf", None).await;
        assert!(doc.full_text.is_empty());
    }

    #[test]
    fn multi_page_text_gets_page_break_markers() {
        let doc = build_document("page one text\x0cpage two text");
        assert!(doc.full_text.contains("page break"));
    }
}
