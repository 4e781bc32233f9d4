//! OCR is an external capability (scope: no in-process vision model):
//! `OcrService` stands in for whatever managed OCR backend is wired in
//! at the deployment boundary. The text extractor awaits it inline for
//! small blobs and polls an async job handle for large ones.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Images and PDF fallback below this size are awaited inline; above it,
/// the extractor polls an async job instead of blocking the pipeline.
pub const SYNC_MAX_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("ocr backend error: {0}")]
    Backend(String),
    #[error("ocr job {0} not yet complete")]
    JobPending(Uuid),
    #[error("ocr job {0} failed: {1}")]
    JobFailed(Uuid, String),
}

#[async_trait]
pub trait OcrService: Send + Sync {
    async fn recognize(&self, bytes: &[u8]) -> Result<String, OcrError>;

    async fn submit_async_job(&self, bytes: &[u8]) -> Result<Uuid, OcrError>;

    async fn poll_async_job(&self, job_id: Uuid) -> Result<String, OcrError>;
}

/// RAII guard over a temporary blob handed to an OCR backend (e.g. a
/// presigned upload or a scratch object-store key). Releases it on
/// drop, success or failure, so a crashed extraction never leaks it —
/// the cancellation contract spec §5 requires of every long-running step.
pub struct TempBlobGuard<F: FnMut()> {
    released: bool,
    release: F,
}

impl<F: FnMut()> TempBlobGuard<F> {
    pub fn new(release: F) -> Self {
        Self { released: false, release }
    }

    pub fn release_now(&mut self) {
        if !self.released {
            (self.release)();
            self.released = true;
        }
    }
}

impl<F: FnMut()> Drop for TempBlobGuard<F> {
    fn drop(&mut self) {
        self.release_now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn guard_releases_exactly_once_on_drop() {
        let released = RefCell::new(0u32);
        {
            let _guard = TempBlobGuard::new(|| {
                *released.borrow_mut() += 1;
            });
        }
        assert_eq!(*released.borrow(), 1);
    }

    #[test]
    fn manual_release_then_drop_does_not_double_release() {
        let released = RefCell::new(0u32);
        {
            let mut guard = TempBlobGuard::new(|| {
                *released.borrow_mut() += 1;
            });
            guard.release_now();
        }
        assert_eq!(*released.borrow(), 1);
    }
}
