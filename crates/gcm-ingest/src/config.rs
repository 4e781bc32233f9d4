//! Environment-driven configuration (ambient stack, SPEC_FULL §1),
//! grounded on the teacher's `SyncConfig::from_env` shape.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub csv_source_url: String,
    pub object_store_root: PathBuf,
    pub user_agent: String,
    pub http_timeout_secs: u64,
    pub max_csv_bytes: u64,
}

impl IngestConfig {
    pub fn from_env() -> Self {
        Self {
            csv_source_url: std::env::var("GCM_CSV_SOURCE_URL")
                .unwrap_or_else(|_| "https://example.gov/opportunities.csv".to_string()),
            object_store_root: std::env::var("GCM_OBJECT_STORE_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data/objects")),
            user_agent: std::env::var("GCM_USER_AGENT").unwrap_or_else(|_| "gcm-ingest/0.1".to_string()),
            http_timeout_secs: std::env::var("GCM_HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(20),
            max_csv_bytes: std::env::var("GCM_MAX_CSV_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(200 * 1024 * 1024),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane_when_env_unset() {
        let config = IngestConfig {
            csv_source_url: "https://example.gov/opportunities.csv".into(),
            object_store_root: PathBuf::from("./data/objects"),
            user_agent: "gcm-ingest/0.1".into(),
            http_timeout_secs: 20,
            max_csv_bytes: 200 * 1024 * 1024,
        };
        assert!(config.max_csv_bytes > 0);
    }
}
