//! Engine configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DalilError, Result};
use crate::fusion::ScoreNormalization;
use crate::lexical::Bm25Params;

/// Policy for query-time embedding failures and timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingFallback {
    /// Degrade the request to BM25-only ranking and log the event.
    #[default]
    Bm25Only,
    /// Surface the embedding error; the request fails.
    Fail,
}

/// Configuration for the retrieval engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// BM25 ranking parameters.
    pub bm25: Bm25Params,
    /// Default fusion weight for the vector modality, in [0, 1].
    pub alpha: f32,
    /// Default number of results returned to the caller.
    pub top_k: usize,
    /// Default width of the lexical candidate pool.
    pub bm25_k: usize,
    /// Default width of the vector candidate pool.
    pub vec_k: usize,
    /// Score rescaling strategy used before fusion.
    pub normalization: ScoreNormalization,
    /// Timeout for the query-time embedding call, in milliseconds.
    pub embedding_timeout_ms: u64,
    /// What to do when the embedding call fails or times out.
    pub embedding_fallback: EmbeddingFallback,
    /// Optional path to the synonym glossary JSON.
    pub glossary_path: Option<PathBuf>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            bm25: Bm25Params::default(),
            alpha: 0.5,
            top_k: 5,
            bm25_k: 50,
            vec_k: 50,
            normalization: ScoreNormalization::default(),
            embedding_timeout_ms: 2_000,
            embedding_fallback: EmbeddingFallback::default(),
            glossary_path: None,
        }
    }
}

impl RetrievalConfig {
    /// Load a configuration from a JSON file. Missing fields take their
    /// defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DalilError::validation(format!("failed to read config '{}': {e}", path.display()))
        })?;
        let config: RetrievalConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(DalilError::validation(format!(
                "alpha must be in [0, 1], got {}",
                self.alpha
            )));
        }
        if self.top_k == 0 {
            return Err(DalilError::validation("top_k must be at least 1"));
        }
        if self.bm25_k == 0 || self.vec_k == 0 {
            return Err(DalilError::validation(
                "bm25_k and vec_k must be at least 1",
            ));
        }
        Ok(())
    }
}
