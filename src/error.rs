//! Error types for the Dalil library.
//!
//! All fallible operations in the crate return [`Result`], whose error type
//! is the [`DalilError`] enum. The variants mirror the retrieval pipeline's
//! failure taxonomy: validation failures are detected before any index is
//! touched, `IndexUnavailable` is fatal for the request, and
//! `EmbeddingProvider` may be locally recovered through the BM25-only
//! fallback configured on the engine.

use std::io;

use thiserror::Error;

/// The main error type for Dalil operations.
#[derive(Error, Debug)]
pub enum DalilError {
    /// Empty/malformed query or out-of-range request parameters.
    #[error("Validation error: {0}")]
    Validation(String),

    /// No valid role set supplied with the request.
    #[error("Authorization error: {0}")]
    Authorization(String),

    /// Index artifacts missing, corrupt, or inconsistent. Fatal for the
    /// request; surfaced, never silently retried.
    #[error("Index unavailable: {0}")]
    IndexUnavailable(String),

    /// External embedding call failed or timed out.
    #[error("Embedding provider error: {0}")]
    EmbeddingProvider(String),

    /// Analysis errors (normalization, tokenization, glossary loading).
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Artifact storage errors outside of plain I/O.
    #[error("Storage error: {0}")]
    Storage(String),

    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error.
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with [`DalilError`].
pub type Result<T> = std::result::Result<T, DalilError>;

impl DalilError {
    /// Create a new validation error.
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        DalilError::Validation(msg.into())
    }

    /// Create a new authorization error.
    pub fn authorization<S: Into<String>>(msg: S) -> Self {
        DalilError::Authorization(msg.into())
    }

    /// Create a new index-unavailable error.
    pub fn index_unavailable<S: Into<String>>(msg: S) -> Self {
        DalilError::IndexUnavailable(msg.into())
    }

    /// Create a new embedding provider error.
    pub fn embedding<S: Into<String>>(msg: S) -> Self {
        DalilError::EmbeddingProvider(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        DalilError::Analysis(msg.into())
    }

    /// Create a new storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        DalilError::Storage(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        DalilError::Other(msg.into())
    }
}
