//! Lexical retrieval: inverted index build and BM25 search.
//!
//! The index is built once, offline, from the corpus's normalized chunk
//! text and is read-only afterwards. Searching scores only chunks that
//! contain at least one query term and returns a deterministic, tie-broken
//! top-k list.

pub mod index;
pub mod search;

pub use index::{Bm25Params, LexicalIndex, LexicalStats};
pub use search::LexicalHit;
