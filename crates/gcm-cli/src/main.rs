use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use gcm_embed::{FixedVectorEmbeddingModel, TemplateSummarizer, UniformTextClassifier};
use gcm_ingest::{run_ingest_once, IngestConfig, ProcessorContext};
use gcm_match::WeightConfigStore;
use gcm_profile::llm_fill::NullFieldExtractionLlm;
use gcm_storage::{HttpClientConfig, HttpFetcher, InMemoryKvTable, LocalObjectStore};
use gcm_web::AppState;

#[derive(Debug, Parser)]
#[command(name = "gcm-cli")]
#[command(about = "Government contracting opportunity-matching command-line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Download the daily opportunity CSV and run it through C6/C5 once.
    Ingest,
    /// Serve the document-upload and weight-config JSON API (spec §6).
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Ingest) {
        Commands::Ingest => {
            let config = IngestConfig::from_env();
            let fetcher = HttpFetcher::new(HttpClientConfig {
                user_agent: Some(config.user_agent.clone()),
                ..Default::default()
            })?;
            let csv_bytes = gcm_ingest::csv_ingest::download_csv(&fetcher, "daily-csv", &config.csv_source_url).await?;

            let ctx = ProcessorContext {
                object_store: Arc::new(LocalObjectStore::new(config.object_store_root.clone())),
                opportunities: Arc::new(InMemoryKvTable::new()),
                vector_index: Arc::new(InMemoryKvTable::new()),
                embedding_model: Arc::new(FixedVectorEmbeddingModel::default()),
                http_fetcher: Some(Arc::new(fetcher)),
                ocr: None,
            };

            let summary = run_ingest_once(&ctx, &csv_bytes).await?;
            println!(
                "ingest complete: rows_seen={} transformed={} deduplicated={} completed={} already_existing={} validation_failed={} failed={}",
                summary.rows_seen,
                summary.rows_transformed,
                summary.deduplicated,
                summary.completed,
                summary.already_existing,
                summary.validation_failed,
                summary.failed,
            );
        }
        Commands::Serve => {
            let object_store_root = std::env::var("GCM_OBJECT_STORE_ROOT").unwrap_or_else(|_| "./data/objects".to_string());
            let jwt_secret = std::env::var("GCM_JWT_SECRET").unwrap_or_else(|_| "dev-secret".to_string());

            let state = AppState {
                object_store: Arc::new(LocalObjectStore::new(object_store_root)),
                companies: Arc::new(InMemoryKvTable::new()),
                vector_index: Arc::new(InMemoryKvTable::new()),
                embedding_model: Arc::new(FixedVectorEmbeddingModel::default()),
                summarizer: Arc::new(TemplateSummarizer),
                classifier_llm: Arc::new(UniformTextClassifier),
                field_llm: Arc::new(NullFieldExtractionLlm),
                ocr: None,
                weight_config_store: Arc::new(WeightConfigStore::new(Arc::new(InMemoryKvTable::new()), Arc::new(InMemoryKvTable::new()))),
                jwt_secret,
            };

            gcm_web::serve_from_env(state).await?;
        }
    }

    Ok(())
}
