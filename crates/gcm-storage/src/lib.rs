//! Persistence abstractions (spec §4.13): an object-store capability, a
//! KV-table capability, deterministic key builders, and the HTTP fetch
//! client used by the CSV ingestor, attachment fetcher, and website
//! scraper. The managed services spec §1 calls out as external
//! collaborators (object storage, KV with secondary indexes) are never
//! reimplemented — only their capability contracts, backed here by
//! filesystem/in-memory implementations sufficient for tests and local
//! development.

pub mod http;
pub mod keys;
pub mod kv;
pub mod object_store;

pub use http::{
    BackoffPolicy, FetchError, FetchedResponse, HttpClientConfig, HttpFetcher, RetryDisposition,
    SimpleTokenBucket, TokenBucketConfig,
};
pub use kv::{InMemoryKvTable, KvError, KvTable};
pub use object_store::{LocalObjectStore, ObjectStore, ObjectStoreError};

pub const CRATE_NAME: &str = "gcm-storage";

pub fn sha256_hex(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_hex_is_stable() {
        assert_eq!(
            sha256_hex(b"hello world"),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }
}
