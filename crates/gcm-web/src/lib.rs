//! JSON API surface (C7/C11 front door, spec §6): document upload-intent
//! issuance/confirm/download/list/delete, and weight-config CRUD, behind
//! bearer-JWT claims extraction and tenant-path access isolation.

pub mod auth;
pub mod documents;
pub mod response;
pub mod weight_config;

use std::sync::Arc;

use axum::http::Method;
use axum::routing::{delete, get, post, put};
use axum::Router;
use gcm_core::company::CompanyProfile;
use gcm_core::embedding::VectorIndexEntry;
use gcm_embed::embedder::EmbeddingModel;
use gcm_embed::summarizer::{SummarizerLlm, TextClassifierLlm};
use gcm_extract::ocr::OcrService;
use gcm_match::WeightConfigStore;
use gcm_profile::llm_fill::FieldExtractionLlm;
use gcm_storage::{KvTable, ObjectStore};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub const CRATE_NAME: &str = "gcm-web";

pub struct AppState {
    pub object_store: Arc<dyn ObjectStore>,
    pub companies: Arc<dyn KvTable<CompanyProfile>>,
    pub vector_index: Arc<dyn KvTable<VectorIndexEntry>>,
    pub embedding_model: Arc<dyn EmbeddingModel>,
    pub summarizer: Arc<dyn SummarizerLlm>,
    pub classifier_llm: Arc<dyn TextClassifierLlm>,
    pub field_llm: Arc<dyn FieldExtractionLlm>,
    pub ocr: Option<Arc<dyn OcrService>>,
    pub weight_config_store: Arc<WeightConfigStore>,
    pub jwt_secret: String,
}

impl AppState {
    /// Builds the [`gcm_profile::ProfileDocumentContext`] handlers need
    /// to drive the document pipeline, cloning the shared `Arc` handles.
    pub fn profile_context(&self) -> gcm_profile::ProfileDocumentContext {
        gcm_profile::ProfileDocumentContext {
            object_store: self.object_store.clone(),
            companies: self.companies.clone(),
            vector_index: self.vector_index.clone(),
            embedding_model: self.embedding_model.clone(),
            summarizer: self.summarizer.clone(),
            classifier_llm: self.classifier_llm.clone(),
            field_llm: self.field_llm.clone(),
            ocr: self.ocr.clone(),
        }
    }
}

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS]);

    Router::new()
        .route("/documents/upload-url", post(documents::upload_url))
        .route("/documents/{id}/confirm", post(documents::confirm_upload))
        .route("/documents/{id}/download-url", get(documents::download_url))
        .route("/documents", get(documents::list_documents))
        .route("/documents/{id}", delete(documents::delete_document))
        .route(
            "/weight-config",
            get(weight_config::get_weight_config)
                .post(weight_config::create_weight_config)
                .put(weight_config::update_weight_config)
                .delete(weight_config::reset_weight_config),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Reads `GCM_WEB_PORT`/`GCM_JWT_SECRET` and serves the JSON API with an
/// in-memory/local-filesystem backend (spec §1 ambient stack — the
/// managed KV table, object store, and model endpoints are abstract
/// collaborators this binary fills in with the local stand-ins).
pub async fn serve_from_env(state: AppState) -> anyhow::Result<()> {
    let port: u16 = std::env::var("GCM_WEB_PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(8080);
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "gcm-web listening");
    axum::serve(listener, app(state)).await?;
    Ok(())
}
