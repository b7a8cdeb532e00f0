//! The retrieval orchestrator.
//!
//! One request runs the linear pipeline
//! `RECEIVE → NORMALIZE → EXPAND_SYNONYMS → RETRIEVE(BM25 ∥ VECTOR) → FUSE →
//! FILTER → TRUNCATE → RETURN`. The pipeline is all-or-nothing and
//! deterministic: identical query, role set, parameters, and index state
//! always produce identical ordered output.

pub mod engine;
pub mod types;

pub use engine::RetrievalEngine;
pub use types::{RetrievalRequest, RetrievalResult, RetrievedItem};
