//! `{success, data?, error?:{code, message, timestamp}}` envelope (spec
//! §6) every handler responds with, plus the fixed error-code taxonomy.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub code: &'static str,
    pub message: String,
    pub timestamp: chrono::DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiErrorBody>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self { success: true, data: Some(data), error: None }
    }
}

/// The error-code taxonomy from spec §6. Each variant knows its own
/// HTTP status so handlers only need `?`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request body is not valid JSON")]
    InvalidJson,
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("filename is required")]
    MissingFilename,
    #[error("file exceeds the upload size limit")]
    FileTooLarge,
    #[error("unsupported file type")]
    InvalidFileType,
    #[error("access denied")]
    AccessDenied,
    #[error("document not found")]
    DocumentNotFound,
    #[error("document is not ready")]
    DocumentNotReady,
    #[error("company not found")]
    CompanyNotFound,
    #[error("processing failed: {0}")]
    ProcessingFailed(String),
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidJson => "INVALID_JSON",
            ApiError::MissingField(_) => "MISSING_FIELD",
            ApiError::MissingFilename => "MISSING_FILENAME",
            ApiError::FileTooLarge => "FILE_TOO_LARGE",
            ApiError::InvalidFileType => "INVALID_FILE_TYPE",
            ApiError::AccessDenied => "ACCESS_DENIED",
            ApiError::DocumentNotFound => "DOCUMENT_NOT_FOUND",
            ApiError::DocumentNotReady => "DOCUMENT_NOT_READY",
            ApiError::CompanyNotFound => "COMPANY_NOT_FOUND",
            ApiError::ProcessingFailed(_) => "PROCESSING_FAILED",
            ApiError::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidJson | ApiError::MissingField(_) | ApiError::MissingFilename | ApiError::FileTooLarge | ApiError::InvalidFileType => {
                StatusCode::BAD_REQUEST
            }
            ApiError::AccessDenied => StatusCode::FORBIDDEN,
            ApiError::DocumentNotFound | ApiError::CompanyNotFound => StatusCode::NOT_FOUND,
            ApiError::DocumentNotReady => StatusCode::CONFLICT,
            ApiError::ProcessingFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body: ApiResponse<()> =
            ApiResponse { success: false, data: None, error: Some(ApiErrorBody { code: self.code(), message: self.to_string(), timestamp: Utc::now() }) };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

pub fn ok_json<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::ok(data)))
}
