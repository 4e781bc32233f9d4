//! Document endpoints (spec §6): upload-url issuance, confirm, download
//! URL, paginated listing, and delete (which always re-embeds the
//! profile, spec §9 open question #4).

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{Duration, Utc};
use gcm_core::company::CompanyDocument;
use gcm_profile::upload_intent::{issue_upload_token, pending_document, UploadIntent};
use gcm_storage::KvTable;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::AuthenticatedUser;
use crate::response::{ok_json, ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UploadUrlRequest {
    pub filename: Option<String>,
    pub file_type: Option<String>,
    pub document_type: Option<String>,
    pub file_size: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct UploadUrlResponse {
    #[serde(rename = "uploadUrl")]
    pub upload_url: String,
    pub key: String,
    pub document_id: String,
}

async fn load_profile(state: &AppState, company_id: &str) -> Result<gcm_core::company::CompanyProfile, ApiError> {
    state.companies.get(company_id).await.ok_or(ApiError::CompanyNotFound)
}

pub async fn upload_url(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Json(body): Json<UploadUrlRequest>,
) -> ApiResult<UploadUrlResponse> {
    let filename = body.filename.ok_or(ApiError::MissingFilename)?;
    if filename.trim().is_empty() {
        return Err(ApiError::MissingFilename);
    }
    let file_size = body.file_size.ok_or(ApiError::MissingField("file_size"))?;

    let intent = UploadIntent {
        filename,
        size: file_size,
        mime: body.file_type.unwrap_or_else(|| "application/octet-stream".to_string()),
        category: body.document_type.unwrap_or_else(|| "other".to_string()),
    };

    let token = issue_upload_token(&user.company_id, &intent, Utc::now()).map_err(|err| match err {
        gcm_profile::upload_intent::UploadIntentError::UnsupportedExtension => ApiError::InvalidFileType,
        gcm_profile::upload_intent::UploadIntentError::FileTooLarge => ApiError::FileTooLarge,
    })?;

    let document = pending_document(&token, &intent);

    let mut profile = match state.companies.get(&user.company_id).await {
        Some(profile) => profile,
        None => return Err(ApiError::CompanyNotFound),
    };
    profile.documents.push(document);
    profile.updated_at = Utc::now();
    state.companies.upsert(user.company_id.clone(), profile).await;

    ok_json(UploadUrlResponse { upload_url: format!("{}?token={}", token.upload_key, token.token), key: token.upload_key, document_id: token.document_id.to_string() })
}

fn find_document_mut<'a>(profile: &'a mut gcm_core::company::CompanyProfile, document_id: &str) -> Option<&'a mut CompanyDocument> {
    profile.documents.iter_mut().find(|doc| doc.document_id == document_id)
}

pub async fn confirm_upload(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(document_id): Path<String>,
) -> ApiResult<CompanyDocument> {
    let mut profile = load_profile(&state, &user.company_id).await?;
    let document = find_document_mut(&mut profile, &document_id).ok_or(ApiError::DocumentNotFound)?;
    user.require_scoped(&document.s3_key)?;

    let confirmed = gcm_profile::upload_intent::confirm_upload(document.clone());
    *document = confirmed.clone();
    profile.updated_at = Utc::now();
    state.companies.upsert(user.company_id.clone(), profile).await;

    let ctx = state.profile_context();
    let company_id = user.company_id.clone();
    let doc_id = document_id.clone();
    tokio::spawn(async move {
        if let Err(err) = gcm_profile::process_document(&ctx, &company_id, &doc_id).await {
            tracing::warn!(error = %err, company_id, document_id = doc_id, "document processing failed");
        }
    });

    ok_json(confirmed)
}

#[derive(Debug, Serialize)]
pub struct DownloadUrlResponse {
    #[serde(rename = "downloadUrl")]
    pub download_url: String,
}

pub async fn download_url(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(document_id): Path<String>,
) -> ApiResult<DownloadUrlResponse> {
    let profile = load_profile(&state, &user.company_id).await?;
    let document = profile.documents.iter().find(|doc| doc.document_id == document_id).ok_or(ApiError::DocumentNotFound)?;
    user.require_scoped(&document.s3_key)?;

    if document.status == gcm_core::company::DocumentStatus::Uploading {
        return Err(ApiError::DocumentNotReady);
    }

    let expires_at = Utc::now() + Duration::hours(1);
    let token = gcm_storage::sha256_hex(format!("{}|{expires_at}", document.s3_key).as_bytes());
    let download_url = format!("{}?token={token}&expires={expires_at}", document.s3_key);

    ok_json(DownloadUrlResponse { download_url })
}

#[derive(Debug, Deserialize, Default)]
pub struct ListDocumentsQuery {
    pub category: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct DocumentListResponse {
    pub documents: Vec<CompanyDocument>,
    pub page: usize,
    pub limit: usize,
    pub total: usize,
}

pub async fn list_documents(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Query(query): Query<ListDocumentsQuery>,
) -> ApiResult<DocumentListResponse> {
    let profile = load_profile(&state, &user.company_id).await?;

    let mut documents: Vec<CompanyDocument> = profile
        .documents
        .into_iter()
        .filter(|doc| match query.category.as_deref() {
            Some(category) => doc.category == category,
            None => true,
        })
        .collect();

    let descending = query.sort_order.as_deref() != Some("asc");
    match query.sort_by.as_deref() {
        Some("size") => documents.sort_by_key(|doc| doc.size),
        Some("filename") => documents.sort_by(|a, b| a.filename.cmp(&b.filename)),
        _ => documents.sort_by(|a, b| a.document_id.cmp(&b.document_id)),
    }
    if descending {
        documents.reverse();
    }

    let total = documents.len();
    let limit = query.limit.unwrap_or(20).max(1);
    let page = query.page.unwrap_or(1).max(1);
    let start = (page - 1) * limit;
    let page_rows = documents.into_iter().skip(start).take(limit).collect();

    ok_json(DocumentListResponse { documents: page_rows, page, limit, total })
}

#[derive(Debug, Serialize)]
pub struct DeleteDocumentResponse {
    pub document_id: String,
}

pub async fn delete_document(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(document_id): Path<String>,
) -> ApiResult<DeleteDocumentResponse> {
    let profile = load_profile(&state, &user.company_id).await?;
    let document = profile.documents.iter().find(|doc| doc.document_id == document_id).ok_or(ApiError::DocumentNotFound)?;
    user.require_scoped(&document.s3_key)?;

    let ctx = state.profile_context();
    gcm_profile::delete_document(&ctx, &user.company_id, &document_id).await.map_err(|err| ApiError::ProcessingFailed(err.to_string()))?;

    ok_json(DeleteDocumentResponse { document_id })
}
