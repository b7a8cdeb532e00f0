//! Leakage properties of the access filter, checked through the full
//! pipeline for every corpus role.

use std::sync::Arc;

use dalil::access::{AccessFilter, Role, RoleHierarchy};
use dalil::analysis::Glossary;
use dalil::config::RetrievalConfig;
use dalil::corpus::{Chunk, CorpusStore};
use dalil::embedding::HashEmbedder;
use dalil::retrieval::{RetrievalEngine, RetrievalRequest};
use dalil::storage::IndexSnapshot;

fn chunks() -> Vec<Chunk> {
    vec![
        Chunk::new(1, "policy_restricted.pdf", None, 1, "سياسة الطاقة النووية الداخلية"),
        Chunk::new(2, "nuclear_law.pdf", None, 2, "قانون الطاقة النووية"),
        Chunk::new(3, "RESTRICTED_memo.pdf", None, 1, "مذكرة الطاقة التنظيمية"),
        Chunk::new(4, "safety_manual.pdf", None, 8, "دليل السلامة في المنشات النووية"),
        Chunk::new(5, "annual_report.pdf", None, 3, "التقرير السنوي عن الطاقة"),
    ]
}

async fn engine() -> RetrievalEngine {
    let embedder = HashEmbedder::new(64);
    let config = RetrievalConfig::default();
    let snapshot = IndexSnapshot::build(chunks(), &embedder, &config)
        .await
        .unwrap();
    RetrievalEngine::new(
        snapshot,
        Arc::new(embedder),
        config,
        Glossary::empty(),
        RoleHierarchy::default(),
    )
    .unwrap()
}

#[tokio::test]
async fn no_role_ever_receives_a_chunk_outside_its_effective_set() {
    let engine = engine().await;
    let corpus = CorpusStore::new(chunks()).unwrap();
    let filter = AccessFilter::new(RoleHierarchy::default());

    for role in [Role::Staff, Role::Legal, Role::Admin] {
        let request =
            RetrievalRequest::new("الطاقة النووية", vec![role]).with_top_k(5);
        let result = engine.retrieve(&request).await.unwrap();

        let effective = filter.effective_roles(&[role]);
        for item in &result.items {
            let chunk = corpus.get(item.chunk_id).unwrap();
            assert!(
                chunk.required_roles.iter().any(|r| effective.contains(r)),
                "role {role} received chunk {} requiring {:?}",
                chunk.id,
                chunk.required_roles
            );
        }
    }
}

#[tokio::test]
async fn staff_results_never_name_restricted_documents() {
    let engine = engine().await;

    let request = RetrievalRequest::new("الطاقة", vec![Role::Staff]).with_top_k(5);
    let result = engine.retrieve(&request).await.unwrap();

    for item in &result.items {
        assert!(!item.doc_name.to_lowercase().contains("restricted"));
        assert!(!item.snippet.is_empty());
    }
    // Both restricted chunks match the query and are counted, not shown.
    assert_eq!(result.hidden_count, 2);
}

#[tokio::test]
async fn legal_and_admin_hide_nothing_in_this_corpus() {
    let engine = engine().await;

    for role in [Role::Legal, Role::Admin] {
        let request = RetrievalRequest::new("الطاقة", vec![role]).with_top_k(5);
        let result = engine.retrieve(&request).await.unwrap();
        assert_eq!(result.hidden_count, 0, "role {role}");
    }
}

#[tokio::test]
async fn multi_role_requests_union_their_effective_sets() {
    let engine = engine().await;

    let request =
        RetrievalRequest::new("الطاقة", vec![Role::Staff, Role::Legal]).with_top_k(5);
    let result = engine.retrieve(&request).await.unwrap();
    assert_eq!(result.hidden_count, 0);
}
