//! Persisted index artifacts and the immutable serving snapshot.
//!
//! The offline pipeline writes one directory per built index; the serving
//! process loads it once into an [`IndexSnapshot`] and treats it as
//! read-only. Binary artifacts are framed with a magic tag, a format
//! version, and a CRC32 of the payload, and every load cross-checks the
//! manifest against the actual artifact contents. Any mismatch is an
//! [`IndexUnavailable`](crate::error::DalilError::IndexUnavailable) error,
//! fatal for the load and surfaced, never silently retried.

pub mod artifacts;
pub mod snapshot;

pub use artifacts::{
    CORPUS_FILE, FORMAT_VERSION, IndexManifest, LEXICAL_FILE, MANIFEST_FILE, VECTORS_FILE,
};
pub use snapshot::IndexSnapshot;
