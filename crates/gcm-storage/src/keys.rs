//! Deterministic object-store key builders (spec §3, §4.13). Every
//! producer of an embedding or document artifact calls through these
//! functions so idempotent re-ingestion (spec §8) holds by construction:
//! the same `(notice_id, posted_date, content_type)` — or the same
//! `(company_id, document_id)` — always yields the same key.

use chrono::{DateTime, Utc};

/// `opportunities/<posted_date>/<notice_id>/embedding_<segment>.json`
pub fn opportunity_embedding_key(posted_date: DateTime<Utc>, notice_id: &str, content_type: &str) -> String {
    format!(
        "opportunities/{}/{}/embedding_{}.json",
        posted_date.format("%Y-%m-%d"),
        notice_id,
        content_type
    )
}

/// `opportunities/<posted_date>/<notice_id>/attachments/<attachment_id>/chunk_<i>.json`
pub fn opportunity_attachment_chunk_key(
    posted_date: DateTime<Utc>,
    notice_id: &str,
    attachment_id: &str,
    chunk_index: usize,
) -> String {
    format!(
        "opportunities/{}/{}/attachments/{}/chunk_{}.json",
        posted_date.format("%Y-%m-%d"),
        notice_id,
        attachment_id,
        chunk_index
    )
}

/// `tenants/<company_id>/raw/<doc_id>/<filename>`
pub fn tenant_raw_document_key(company_id: &str, document_id: &str, filename: &str) -> String {
    format!("tenants/{company_id}/raw/{document_id}/{filename}")
}

/// `tenants/<company_id>/processed/<doc_id>/<filename>.txt`
pub fn tenant_processed_document_key(company_id: &str, document_id: &str, filename: &str) -> String {
    format!("tenants/{company_id}/processed/{document_id}/{filename}.txt")
}

/// `tenants/<company_id>/embeddings/<level>/<doc_id>_<chunk>.json`
pub fn tenant_embedding_key(company_id: &str, level: &str, document_id: &str, chunk: usize) -> String {
    format!("tenants/{company_id}/embeddings/{level}/{document_id}_{chunk}.json")
}

pub fn vector_index_key(entity_type: &str, entity_id: &str) -> String {
    format!("{entity_type}#{entity_id}")
}

pub fn match_cache_key_material(notice_id: &str, company_id: &str, opportunity_hash: &str, company_hash: &str, weights_hash: &str) -> String {
    format!("{notice_id}|{company_id}|{opportunity_hash}|{company_hash}|{weights_hash}")
}

/// Stable (non-`DefaultHasher`) content hash for cache-key fingerprints
/// and embedding-key content addressing. `DefaultHasher`'s algorithm is
/// unspecified across Rust releases (spec §9 redesign: no hidden
/// nondeterminism at persistence boundaries), so a `Sha256` digest of the
/// canonical JSON form is used instead.
pub fn stable_content_hash(value: &serde_json::Value) -> String {
    crate::sha256_hex(value.to_string().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn embedding_key_is_deterministic_across_calls() {
        let date = Utc.with_ymd_and_hms(2026, 7, 27, 0, 0, 0).single().unwrap();
        let a = opportunity_embedding_key(date, "OPP-1", "main");
        let b = opportunity_embedding_key(date, "OPP-1", "main");
        assert_eq!(a, b);
        assert_eq!(a, "opportunities/2026-07-27/OPP-1/embedding_main.json");
    }

    #[test]
    fn stable_hash_is_order_sensitive_but_deterministic() {
        let a = serde_json::json!({"x": 1, "y": 2});
        let b = serde_json::json!({"x": 1, "y": 2});
        assert_eq!(stable_content_hash(&a), stable_content_hash(&b));
    }

    #[test]
    fn tenant_keys_are_scoped_under_company() {
        let key = tenant_raw_document_key("acme-co", "doc-1", "resume.pdf");
        assert!(key.starts_with("tenants/acme-co/"));
    }
}
