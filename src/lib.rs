//! # Dalil
//!
//! Hybrid retrieval for Arabic document corpora: lexical (BM25) and
//! semantic (dense-embedding) search fused into one deterministic ranking,
//! with role-based visibility enforced before truncation.
//!
//! ## Features
//!
//! - Deterministic Arabic normalization and tokenization
//! - BM25 inverted index with configurable `k1`/`b`
//! - Exact vector search behind a swappable index trait
//! - Pure, testable score-scale fusion (min-max or rank based)
//! - Non-leaking role-based access filtering with hidden-count reporting
//! - Checksummed on-disk index artifacts with atomic snapshot reload

pub mod access;
pub mod analysis;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod embedding;
pub mod error;
pub mod fusion;
pub mod lexical;
pub mod retrieval;
pub mod storage;
pub mod util;
pub mod vector;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
