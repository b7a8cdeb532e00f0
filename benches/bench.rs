//! Criterion benchmarks for the Dalil retrieval pipeline.
//!
//! Covers the hot paths a serving process exercises per request:
//! - Arabic normalization and tokenization
//! - BM25 scoring over the inverted index
//! - Flat vector search
//! - The full retrieve pipeline (analyze, dual retrieval, fusion, filtering)

use std::hint::black_box;
use std::sync::Arc;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use rand::prelude::*;

use dalil::access::{Role, RoleHierarchy};
use dalil::analysis::{Glossary, normalize, tokenize};
use dalil::config::RetrievalConfig;
use dalil::corpus::{Chunk, CorpusStore};
use dalil::embedding::HashEmbedder;
use dalil::lexical::{Bm25Params, LexicalIndex};
use dalil::retrieval::{RetrievalEngine, RetrievalRequest};
use dalil::storage::IndexSnapshot;
use dalil::vector::{FlatVectorIndex, Vector, VectorIndex};

const DIM: usize = 128;

/// Generate chunks with a skewed Arabic vocabulary so term statistics
/// resemble a real corpus rather than uniform noise.
fn generate_chunks(count: usize) -> Vec<Chunk> {
    let vocabulary = [
        "الطاقة",
        "النووية",
        "الرقابة",
        "المنشات",
        "الترخيص",
        "السلامة",
        "الاشعاع",
        "المفاعلات",
        "الوقود",
        "النفايات",
        "التفتيش",
        "الطوارئ",
        "الحماية",
        "البيئة",
        "القانون",
        "المادة",
        "اللائحة",
        "الهيئة",
        "التصاريح",
        "المخالفات",
        "العقوبات",
        "التعويضات",
        "المسؤولية",
        "التامين",
        "النقل",
        "التخزين",
        "التصدير",
        "الاستيراد",
        "الضمانات",
        "التحقق",
        "السجلات",
        "التقارير",
    ];

    let mut rng = StdRng::seed_from_u64(42);
    let mut chunks = Vec::with_capacity(count);
    for i in 0..count {
        let length = rng.random_range(40..120);
        let words: Vec<&str> = (0..length)
            .map(|_| {
                // Zipf-ish skew: low indices dominate.
                let idx = (rng.random_range(0.0f64..1.0).powi(2) * vocabulary.len() as f64) as usize;
                vocabulary[idx.min(vocabulary.len() - 1)]
            })
            .collect();

        let doc_name = if i % 10 == 0 {
            format!("policy_restricted_{}.pdf", i / 10)
        } else {
            format!("law_{}.pdf", i / 10)
        };
        chunks.push(Chunk::new(
            i as u64,
            doc_name,
            None,
            (i % 30) as u32 + 1,
            words.join(" "),
        ));
    }
    chunks
}

fn bench_analysis(c: &mut Criterion) {
    let text = "النُّصوصُ القانونيَّةُ المُنظِّمة لاستخدام الطاقة النوويَّة \
                في المادة ٤٢ من اللائحة التنفيذية";

    let mut group = c.benchmark_group("analysis");
    group.throughput(Throughput::Bytes(text.len() as u64));
    group.bench_function("normalize", |b| {
        b.iter(|| normalize(black_box(text)));
    });
    group.bench_function("tokenize", |b| {
        b.iter(|| tokenize(black_box(text)));
    });
    group.finish();
}

fn bench_bm25_search(c: &mut Criterion) {
    let corpus = CorpusStore::new(generate_chunks(2_000)).unwrap();
    let index = LexicalIndex::build(&corpus, Bm25Params::default());
    let tokens = tokenize("الرقابة على المنشات النووية");

    let mut group = c.benchmark_group("lexical");
    group.throughput(Throughput::Elements(corpus.len() as u64));
    group.bench_function("bm25_search_2k_chunks", |b| {
        b.iter(|| index.search(black_box(&tokens), 50));
    });
    group.finish();
}

fn bench_vector_search(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let mut index = FlatVectorIndex::new(DIM);
    for i in 0..2_000u64 {
        let data: Vec<f32> = (0..DIM).map(|_| rng.random_range(-1.0..1.0)).collect();
        index.add(i, Vector::new(data)).unwrap();
    }
    let query_data: Vec<f32> = (0..DIM).map(|_| rng.random_range(-1.0..1.0)).collect();
    let query = Vector::new(query_data);

    let mut group = c.benchmark_group("vector");
    group.throughput(Throughput::Elements(index.len() as u64));
    group.bench_function("flat_search_2k_rows", |b| {
        b.iter(|| index.search(black_box(&query), 50).unwrap());
    });
    group.finish();
}

fn bench_retrieve_pipeline(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let embedder = Arc::new(HashEmbedder::new(DIM));
    let config = RetrievalConfig::default();
    let snapshot = runtime
        .block_on(IndexSnapshot::build(
            generate_chunks(2_000),
            embedder.as_ref(),
            &config,
        ))
        .unwrap();
    let engine = RetrievalEngine::new(
        snapshot,
        embedder,
        config,
        Glossary::empty(),
        RoleHierarchy::default(),
    )
    .unwrap();

    let request = RetrievalRequest::new("الرقابة على المنشات النووية", vec![Role::Staff])
        .with_top_k(5)
        .with_bm25_k(50)
        .with_vec_k(50);

    c.bench_function("retrieve_2k_chunks", |b| {
        b.iter(|| {
            runtime
                .block_on(engine.retrieve(black_box(&request)))
                .unwrap()
        });
    });
}

criterion_group!(
    benches,
    bench_analysis,
    bench_bm25_search,
    bench_vector_search,
    bench_retrieve_pipeline
);
criterion_main!(benches);
