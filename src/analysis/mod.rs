//! Arabic text analysis: normalization, tokenization, and glossary-driven
//! synonym expansion.
//!
//! The same analysis chain is applied at index-build time and at query time,
//! which is what keeps the lexical postings and query tokens in one term
//! space. [`normalize`] is idempotent, so already-normalized chunk text can
//! be re-analyzed safely.

pub mod normalize;
pub mod synonym;
pub mod tokenizer;

pub use normalize::normalize;
pub use synonym::Glossary;
pub use tokenizer::tokenize;
