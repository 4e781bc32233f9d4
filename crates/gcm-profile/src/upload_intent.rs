//! Upload-intent validation and signed upload-token issuance (spec
//! §4.7 first paragraph): a whitelisted extension, a 100 MiB ceiling,
//! and a token scoped to `tenants/<company_id>/raw/<doc_id>/<filename>`
//! good for one hour.

use chrono::{DateTime, Duration, Utc};
use gcm_core::company::{CompanyDocument, DocumentStatus};
use gcm_storage::keys::tenant_raw_document_key;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub const MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;
const UPLOAD_TOKEN_TTL_HOURS: i64 = 1;

fn allowed_extensions() -> &'static [&'static str] {
    &["pdf", "docx", "doc", "xlsx", "xls", "txt"]
}

#[derive(Debug, Clone)]
pub struct UploadIntent {
    pub filename: String,
    pub size: u64,
    pub mime: String,
    pub category: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadIntentError {
    #[error("unsupported file extension")]
    UnsupportedExtension,
    #[error("file exceeds the 100 MiB upload limit")]
    FileTooLarge,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedUploadToken {
    pub document_id: Uuid,
    pub upload_key: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub encryption_algorithm: &'static str,
}

fn extension_of(filename: &str) -> Option<String> {
    let ext = filename.rsplit('.').next()?;
    if ext == filename {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Validates an upload intent and, on success, mints a signed upload
/// token (spec §4.7).
pub fn issue_upload_token(
    company_id: &str,
    intent: &UploadIntent,
    now: DateTime<Utc>,
) -> Result<SignedUploadToken, UploadIntentError> {
    let extension = extension_of(&intent.filename).ok_or(UploadIntentError::UnsupportedExtension)?;
    if !allowed_extensions().contains(&extension.as_str()) {
        return Err(UploadIntentError::UnsupportedExtension);
    }
    if intent.size > MAX_UPLOAD_BYTES {
        return Err(UploadIntentError::FileTooLarge);
    }

    let document_id = Uuid::new_v4();
    let upload_key = tenant_raw_document_key(company_id, &document_id.to_string(), &intent.filename);
    let expires_at = now + Duration::hours(UPLOAD_TOKEN_TTL_HOURS);
    let token = gcm_storage::sha256_hex(format!("{upload_key}|{expires_at}").as_bytes());

    Ok(SignedUploadToken { document_id, upload_key, token, expires_at, encryption_algorithm: "AES256" })
}

/// The `uploading`-status document record the caller persists alongside
/// the issued token.
pub fn pending_document(token: &SignedUploadToken, intent: &UploadIntent) -> CompanyDocument {
    CompanyDocument {
        document_id: token.document_id.to_string(),
        filename: intent.filename.clone(),
        category: intent.category.clone(),
        s3_key: token.upload_key.clone(),
        status: DocumentStatus::Uploading,
        size: intent.size,
        mime: intent.mime.clone(),
        tags: Vec::new(),
        version: 1,
    }
}

/// Confirms a completed upload, transitioning `uploading → uploaded`
/// (spec §4.7). A document already past that stage is returned
/// unchanged.
pub fn confirm_upload(mut document: CompanyDocument) -> CompanyDocument {
    if document.status == DocumentStatus::Uploading {
        document.status = DocumentStatus::Uploaded;
    }
    document
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-07-27T12:00:00Z").unwrap().with_timezone(&Utc)
    }

    fn intent(filename: &str, size: u64) -> UploadIntent {
        UploadIntent { filename: filename.to_string(), size, mime: "application/octet-stream".to_string(), category: "team-resumes".to_string() }
    }

    #[test]
    fn accepts_whitelisted_extension() {
        let token = issue_upload_token("acme-co", &intent("resume.pdf", 1024), now()).unwrap();
        assert!(token.upload_key.starts_with("tenants/acme-co/raw/"));
        assert!(token.upload_key.ends_with("resume.pdf"));
        assert_eq!(token.expires_at, now() + Duration::hours(1));
    }

    #[test]
    fn rejects_unsupported_extension() {
        let result = issue_upload_token("acme-co", &intent("payload.exe", 1024), now());
        assert_eq!(result.unwrap_err(), UploadIntentError::UnsupportedExtension);
    }

    #[test]
    fn rejects_extensionless_filename() {
        let result = issue_upload_token("acme-co", &intent("noext", 1024), now());
        assert_eq!(result.unwrap_err(), UploadIntentError::UnsupportedExtension);
    }

    #[test]
    fn rejects_oversized_file() {
        let result = issue_upload_token("acme-co", &intent("resume.pdf", MAX_UPLOAD_BYTES + 1), now());
        assert_eq!(result.unwrap_err(), UploadIntentError::FileTooLarge);
    }

    #[test]
    fn confirm_upload_transitions_status_once() {
        let token = issue_upload_token("acme-co", &intent("resume.pdf", 1024), now()).unwrap();
        let document = pending_document(&token, &intent("resume.pdf", 1024));
        assert_eq!(document.status, DocumentStatus::Uploading);

        let confirmed = confirm_upload(document);
        assert_eq!(confirmed.status, DocumentStatus::Uploaded);

        let idempotent = confirm_upload(confirmed.clone());
        assert_eq!(idempotent.status, DocumentStatus::Uploaded);
    }
}
