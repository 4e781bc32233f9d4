//! Object-store capability (spec §4.13): `raw-documents`,
//! `processed-documents`, `embeddings`, `temp-processing` namespaces, all
//! addressed by deterministic keys (see [`crate::keys`]). A local
//! filesystem-backed implementation stands in for the managed object
//! store named as an external collaborator in spec §1.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("io error at key {key}: {source}")]
    Io { key: String, #[source] source: std::io::Error },
    #[error("key not found: {0}")]
    NotFound(String),
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), ObjectStoreError>;
    async fn get(&self, key: &str) -> Result<Vec<u8>, ObjectStoreError>;
    async fn exists(&self, key: &str) -> Result<bool, ObjectStoreError>;
    async fn delete(&self, key: &str) -> Result<(), ObjectStoreError>;
}

/// Filesystem-backed object store rooted at a local directory, with
/// atomic temp-file-then-rename writes so a crash mid-write never leaves
/// a partial object visible under its final key.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), ObjectStoreError> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| ObjectStoreError::Io { key: key.to_string(), source })?;
        }

        let temp_name = format!(".{}.tmp", Uuid::new_v4());
        let temp_path = path
            .parent()
            .map(|p| p.join(&temp_name))
            .unwrap_or_else(|| PathBuf::from(&temp_name));

        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|source| ObjectStoreError::Io { key: key.to_string(), source })?;
        file.write_all(bytes)
            .await
            .map_err(|source| ObjectStoreError::Io { key: key.to_string(), source })?;
        file.flush()
            .await
            .map_err(|source| ObjectStoreError::Io { key: key.to_string(), source })?;
        drop(file);

        fs::rename(&temp_path, &path)
            .await
            .map_err(|source| ObjectStoreError::Io { key: key.to_string(), source })?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, ObjectStoreError> {
        let path = self.path_for(key);
        fs::read(&path).await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ObjectStoreError::NotFound(key.to_string())
            } else {
                ObjectStoreError::Io { key: key.to_string(), source }
            }
        })
    }

    async fn exists(&self, key: &str) -> Result<bool, ObjectStoreError> {
        let path = self.path_for(key);
        fs::try_exists(&path)
            .await
            .map_err(|source| ObjectStoreError::Io { key: key.to_string(), source })
    }

    async fn delete(&self, key: &str) -> Result<(), ObjectStoreError> {
        let path = self.path_for(key);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(ObjectStoreError::Io { key: key.to_string(), source }),
        }
    }
}

pub fn is_tenant_scoped(key: &str, company_id: &str) -> bool {
    key.starts_with(&format!("tenants/{company_id}/"))
}

pub fn root_exists(root: &Path) -> bool {
    root.exists()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let dir = tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path());
        store.put("opportunities/2026-07-27/OPP-1/embedding_main.json", b"{}").await.unwrap();
        let bytes = store.get("opportunities/2026-07-27/OPP-1/embedding_main.json").await.unwrap();
        assert_eq!(bytes, b"{}");
    }

    #[tokio::test]
    async fn get_missing_key_is_not_found() {
        let dir = tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path());
        let err = store.get("missing/key.json").await.unwrap_err();
        assert!(matches!(err, ObjectStoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn put_is_idempotent_replace_in_place() {
        let dir = tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path());
        store.put("k", b"first").await.unwrap();
        store.put("k", b"second").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), b"second");
    }

    #[test]
    fn tenant_scoping_rejects_foreign_keys() {
        assert!(is_tenant_scoped("tenants/acme/raw/doc-1/a.pdf", "acme"));
        assert!(!is_tenant_scoped("tenants/other/raw/doc-1/a.pdf", "acme"));
        assert!(!is_tenant_scoped("raw/doc-1/a.pdf", "acme"));
    }
}
