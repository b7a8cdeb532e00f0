//! End-to-end retrieval scenarios over a controlled vector space.
//!
//! These tests use the precomputed embedding provider so lexical and
//! semantic rankings can be reasoned about exactly.

use std::collections::HashMap;
use std::sync::Arc;

use dalil::access::{Role, RoleHierarchy};
use dalil::analysis::Glossary;
use dalil::config::RetrievalConfig;
use dalil::corpus::Chunk;
use dalil::embedding::PrecomputedEmbedder;
use dalil::retrieval::{RetrievalEngine, RetrievalRequest};
use dalil::storage::IndexSnapshot;
use dalil::vector::Vector;

const DIM: usize = 4;

const QUERY_NUCLEAR: &str = "الطاقة النووية";
const QUERY_NO_LEXICAL: &str = "سلامة المختبرات";
const QUERY_GLOSSARY: &str = "الطاقة الذرية";

fn chunks() -> Vec<Chunk> {
    vec![
        Chunk::new(
            1,
            "policy_restricted.pdf",
            Some("المادة 12".to_string()),
            3,
            "الطاقة النووية والرقابة على الطاقة النووية",
        ),
        Chunk::new(2, "restricted_annex.pdf", None, 9, "ضوابط الطاقة النووية السرية"),
        Chunk::new(3, "nuclear_law.pdf", Some("المادة 1".to_string()), 1, "قانون تنظيم الطاقة النووية"),
        Chunk::new(4, "nuclear_law.pdf", None, 5, "استخدامات الطاقة في المفاعلات"),
        Chunk::new(5, "guidelines.pdf", None, 2, "ارشادات السلامة العامة للمنشات"),
        Chunk::new(6, "agriculture.pdf", None, 7, "الزراعة العضوية في المناطق الريفية"),
    ]
}

fn embedder() -> PrecomputedEmbedder {
    let mut embedder = PrecomputedEmbedder::new(DIM);
    let entries: [(&str, [f32; DIM]); 9] = [
        // Chunk texts.
        ("الطاقة النووية والرقابة على الطاقة النووية", [1.0, 0.0, 0.0, 0.0]),
        ("ضوابط الطاقة النووية السرية", [0.95, 0.05, 0.0, 0.0]),
        ("قانون تنظيم الطاقة النووية", [0.9, 0.1, 0.0, 0.0]),
        ("استخدامات الطاقة في المفاعلات", [0.7, 0.3, 0.0, 0.0]),
        ("ارشادات السلامة العامة للمنشات", [0.5, 0.5, 0.0, 0.0]),
        ("الزراعة العضوية في المناطق الريفية", [0.0, 0.0, 1.0, 0.0]),
        // Queries.
        (QUERY_NUCLEAR, [1.0, 0.0, 0.0, 0.0]),
        (QUERY_NO_LEXICAL, [0.6, 0.4, 0.2, 0.0]),
        (QUERY_GLOSSARY, [1.0, 0.0, 0.0, 0.0]),
    ];
    for (text, data) in entries {
        embedder.insert(text, Vector::new(data.to_vec())).unwrap();
    }
    embedder
}

async fn engine() -> RetrievalEngine {
    engine_with_glossary(Glossary::empty()).await
}

async fn engine_with_glossary(glossary: Glossary) -> RetrievalEngine {
    let provider = embedder();
    let config = RetrievalConfig::default();
    let snapshot = IndexSnapshot::build(chunks(), &provider, &config)
        .await
        .unwrap();
    RetrievalEngine::new(
        snapshot,
        Arc::new(provider),
        config,
        glossary,
        RoleHierarchy::default(),
    )
    .unwrap()
}

#[tokio::test]
async fn scenario_a_staff_never_sees_restricted_top_hit() {
    let engine = engine().await;

    // Chunk 1, from the restricted policy document, scores highest on both
    // modalities for this query.
    let request = RetrievalRequest::new(QUERY_NUCLEAR, vec![Role::Staff]);
    let result = engine.retrieve(&request).await.unwrap();

    assert!(result.items.iter().all(|item| item.chunk_id != 1));
    assert!(result.hidden_count >= 1);
    assert!(
        result
            .items
            .iter()
            .all(|item| !item.doc_name.to_lowercase().contains("restricted"))
    );
}

#[tokio::test]
async fn scenario_b_legal_sees_restricted_top_hit() {
    let engine = engine().await;

    let request = RetrievalRequest::new(QUERY_NUCLEAR, vec![Role::Legal]);
    let result = engine.retrieve(&request).await.unwrap();

    assert_eq!(result.items[0].chunk_id, 1);
    assert_eq!(result.items[0].doc_name, "policy_restricted.pdf");
    assert_eq!(result.hidden_count, 0);
}

#[tokio::test]
async fn scenario_c_vector_only_ranking_when_no_lexical_match() {
    let engine = engine().await;

    let request =
        RetrievalRequest::new(QUERY_NO_LEXICAL, vec![Role::Admin]).with_top_k(6);
    let result = engine.retrieve(&request).await.unwrap();

    // No chunk contains either query token, so bm25_norm is 0 everywhere
    // and fused = alpha * vector_norm. The best vector match leads with
    // fused exactly alpha.
    assert_eq!(result.items.len(), 6);
    assert_eq!(result.items[0].chunk_id, 4);
    assert!((result.items[0].fused_score - 0.5).abs() < 1e-5);

    let ids: Vec<u64> = result.items.iter().map(|i| i.chunk_id).collect();
    assert_eq!(ids, vec![4, 5, 3, 2, 1, 6]);
}

#[tokio::test]
async fn scenario_d_filter_runs_before_truncation() {
    let engine = engine().await;

    // The two restricted chunks hold the top-2 fused ranks for this query;
    // staff must still receive a full page of three visible results.
    let request = RetrievalRequest::new(QUERY_NUCLEAR, vec![Role::Staff])
        .with_top_k(3)
        .with_bm25_k(50)
        .with_vec_k(50);
    let result = engine.retrieve(&request).await.unwrap();

    assert_eq!(result.items.len(), 3);
    assert_eq!(result.hidden_count, 2);
    let ids: Vec<u64> = result.items.iter().map(|i| i.chunk_id).collect();
    assert_eq!(ids, vec![3, 4, 5]);
}

#[tokio::test]
async fn hidden_count_is_exact_over_the_pretruncation_pool() {
    let engine = engine().await;

    // All six chunks enter the fused pool; exactly the two restricted ones
    // are removed for staff, regardless of top_k.
    for top_k in [1, 2, 6] {
        let request =
            RetrievalRequest::new(QUERY_NUCLEAR, vec![Role::Staff]).with_top_k(top_k);
        let result = engine.retrieve(&request).await.unwrap();
        assert_eq!(result.hidden_count, 2, "top_k={top_k}");
    }
}

#[tokio::test]
async fn result_size_never_exceeds_top_k() {
    let engine = engine().await;

    for top_k in 1..=8 {
        for roles in [vec![Role::Staff], vec![Role::Legal], vec![Role::Admin]] {
            let request =
                RetrievalRequest::new(QUERY_NUCLEAR, roles.clone()).with_top_k(top_k);
            let result = engine.retrieve(&request).await.unwrap();
            assert!(result.items.len() <= top_k, "top_k={top_k} roles={roles:?}");
        }
    }
}

#[tokio::test]
async fn identical_requests_produce_identical_output() {
    let engine = engine().await;

    let request = RetrievalRequest::new(QUERY_NUCLEAR, vec![Role::Admin]).with_top_k(6);
    let first = engine.retrieve(&request).await.unwrap();
    for _ in 0..5 {
        let next = engine.retrieve(&request).await.unwrap();
        assert_eq!(first, next);
    }
}

#[tokio::test]
async fn raising_alpha_never_demotes_the_best_vector_candidate() {
    let engine = engine().await;

    // Chunk 1 holds the maximal vector_norm for this query and chunk 6 the
    // minimal; chunk 1 must stay ahead at every alpha.
    for alpha in [0.0, 0.25, 0.5, 0.75, 1.0] {
        let request = RetrievalRequest::new(QUERY_NUCLEAR, vec![Role::Admin])
            .with_top_k(6)
            .with_alpha(alpha);
        let result = engine.retrieve(&request).await.unwrap();

        let pos = |id: u64| result.items.iter().position(|i| i.chunk_id == id).unwrap();
        assert!(pos(1) < pos(6), "alpha={alpha}");
    }
}

#[tokio::test]
async fn glossary_expansion_recovers_lexical_matches() {
    let mut entries = HashMap::new();
    entries.insert("الذرية".to_string(), vec!["النووية".to_string()]);
    let engine = engine_with_glossary(Glossary::from_entries(entries).unwrap()).await;

    // No chunk contains "الذرية"; the glossary maps it onto the indexed
    // term, so lexical candidates reappear.
    let request = RetrievalRequest::new(QUERY_GLOSSARY, vec![Role::Staff]);
    let result = engine.retrieve(&request).await.unwrap();

    assert!(!result.items.is_empty());
    assert_eq!(result.items[0].chunk_id, 3);
}

#[tokio::test]
async fn snippet_carries_chunk_metadata() {
    let engine = engine().await;

    let request = RetrievalRequest::new(QUERY_NUCLEAR, vec![Role::Legal]).with_top_k(1);
    let result = engine.retrieve(&request).await.unwrap();

    let item = &result.items[0];
    assert_eq!(item.article_ref.as_deref(), Some("المادة 12"));
    assert_eq!(item.page, 3);
    assert!(item.snippet.contains("الطاقة النووية"));
}
