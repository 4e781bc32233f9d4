//! Semantic similarity component (spec §4.9). Pure scoring over
//! already-retrieved vectors; the orchestrator is responsible for loading
//! the opportunity's `main` embedding, the company's profile-level
//! embedding, and (optionally) the opportunity's chunk embeddings for
//! re-ranking.

use super::{cosine_similarity, ComponentOutput};

const TOP_CHUNKS_FOR_RERANK: usize = 3;

/// `score = max(profile-vs-main, mean(top-3 chunk-vs-profile))`: the
/// chunk re-rank compares each opportunity chunk embedding against the
/// company's profile vector (the thing being matched against), not
/// against the opportunity's own main embedding.
pub fn score(
    opportunity_main_vector: Option<&[f32]>,
    company_profile_vector: Option<&[f32]>,
    opportunity_chunk_vectors: &[Vec<f32>],
) -> ComponentOutput {
    let (Some(main), Some(profile)) = (opportunity_main_vector, company_profile_vector) else {
        return ComponentOutput::no_data(serde_json::json!({
            "reason": "missing main or profile embedding",
        }));
    };

    let Some(profile_vs_main) = cosine_similarity(profile, main) else {
        return ComponentOutput::no_data(serde_json::json!({
            "reason": "embedding dimension mismatch",
        }));
    };

    let mut chunk_similarities: Vec<f64> = opportunity_chunk_vectors
        .iter()
        .filter_map(|chunk| cosine_similarity(chunk, profile))
        .collect();
    chunk_similarities.sort_by(|a, b| b.partial_cmp(a).unwrap());
    let top_n = &chunk_similarities[..chunk_similarities.len().min(TOP_CHUNKS_FOR_RERANK)];
    let mean_top_chunks = if top_n.is_empty() {
        0.0
    } else {
        top_n.iter().sum::<f64>() / top_n.len() as f64
    };

    let score = profile_vs_main.max(mean_top_chunks).clamp(0.0, 1.0);

    let mut recommendations = Vec::new();
    if score < 0.4 {
        recommendations.push("capability statement shows low semantic overlap with this opportunity's scope".to_string());
    }

    ComponentOutput::ok(
        score,
        serde_json::json!({
            "profile_vs_main": profile_vs_main,
            "mean_top_chunk_vs_profile": mean_top_chunks,
            "chunks_considered": top_n.len(),
        }),
    )
    .with_recommendations(recommendations)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(dim: usize, hot: usize) -> Vec<f32> {
        let mut v = vec![0.0f32; dim];
        v[hot] = 1.0;
        v
    }

    #[test]
    fn missing_embeddings_yield_no_data() {
        let result = score(None, Some(&unit(4, 0)), &[]);
        assert_eq!(result.overall_score, 0.0);
    }

    #[test]
    fn identical_profile_and_main_score_one() {
        let v = unit(4, 1);
        let result = score(Some(&v), Some(&v), &[]);
        assert!((result.overall_score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn takes_max_of_profile_and_chunk_rerank() {
        let main = unit(4, 0);
        let profile = unit(4, 1);
        let matching_chunk = unit(4, 0);
        let result = score(Some(&main), Some(&profile), std::slice::from_ref(&matching_chunk));
        assert!(result.overall_score > 0.9);
    }

    #[test]
    fn only_considers_top_three_chunks() {
        let main = unit(4, 0);
        let profile = vec![0.1f32; 4];
        let chunks = vec![unit(4, 0), unit(4, 0), unit(4, 0), vec![0.0f32; 4]];
        let result = score(Some(&main), Some(&profile), &chunks);
        assert_eq!(result.evidence["chunks_considered"], serde_json::json!(3));
    }
}
