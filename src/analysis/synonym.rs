//! Glossary-driven synonym expansion for query token sets.
//!
//! The glossary is a configuration mapping of term → list of synonym terms,
//! loaded once at startup. Expansion is applied exactly once per query: a
//! synonym already present in the token set is not appended again, and
//! appended synonyms are not themselves expanded.

use std::collections::HashMap;
use std::path::Path;

use ahash::AHashMap;

use crate::analysis::tokenize;
use crate::error::{DalilError, Result};

/// Term → synonyms mapping used to widen the lexical query.
///
/// Entries are normalized through the crate's analysis chain when the
/// glossary is built, so lookups use the same term space as the index.
#[derive(Debug, Clone, Default)]
pub struct Glossary {
    map: AHashMap<String, Vec<String>>,
}

impl Glossary {
    /// Create an empty glossary. Expansion becomes a no-op.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a glossary from in-memory entries.
    ///
    /// Keys must normalize to a single token; multi-token keys are rejected
    /// because the expander matches per token. Synonym values may be
    /// multi-word phrases and are flattened into their token sequences.
    pub fn from_entries(entries: HashMap<String, Vec<String>>) -> Result<Self> {
        let mut map = AHashMap::with_capacity(entries.len());

        for (term, synonyms) in entries {
            let key_tokens = tokenize(&term);
            let [key] = key_tokens.as_slice() else {
                return Err(DalilError::analysis(format!(
                    "glossary term '{term}' must normalize to exactly one token"
                )));
            };

            let mut expanded = Vec::new();
            for synonym in &synonyms {
                expanded.extend(tokenize(synonym));
            }
            map.insert(key.clone(), expanded);
        }

        Ok(Self { map })
    }

    /// Load a glossary from a JSON file of the form
    /// `{"term": ["synonym", ...], ...}`.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DalilError::analysis(format!("failed to read glossary '{}': {e}", path.display()))
        })?;
        let entries: HashMap<String, Vec<String>> = serde_json::from_str(&content).map_err(|e| {
            DalilError::analysis(format!("failed to parse glossary '{}': {e}", path.display()))
        })?;
        Self::from_entries(entries)
    }

    /// Synonyms recorded for a normalized term, if any.
    pub fn synonyms(&self, term: &str) -> Option<&[String]> {
        self.map.get(term).map(|v| v.as_slice())
    }

    /// Number of glossary entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the glossary has no entries.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Expand a query token set with glossary synonyms.
    ///
    /// Each input token is looked up once; synonyms not already present in
    /// the (growing) token set are appended in glossary order. Input order
    /// and duplicates among the original tokens are preserved so BM25 query
    /// term frequency is unaffected.
    pub fn expand(&self, tokens: &[String]) -> Vec<String> {
        if self.map.is_empty() {
            return tokens.to_vec();
        }

        let mut expanded = tokens.to_vec();
        let present: ahash::AHashSet<&str> = tokens.iter().map(|t| t.as_str()).collect();
        let mut appended: Vec<String> = Vec::new();

        for token in tokens {
            if let Some(synonyms) = self.map.get(token) {
                for synonym in synonyms {
                    if !present.contains(synonym.as_str())
                        && !appended.iter().any(|a| a == synonym)
                    {
                        appended.push(synonym.clone());
                    }
                }
            }
        }

        expanded.extend(appended);
        expanded
    }
}
