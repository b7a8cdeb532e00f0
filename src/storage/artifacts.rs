//! On-disk artifact formats: manifest, corpus table, lexical index, and
//! vector rows.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::corpus::{Chunk, CorpusStore};
use crate::error::{DalilError, Result};
use crate::lexical::{Bm25Params, LexicalIndex};
use crate::vector::{FlatVectorIndex, Vector, VectorIndex};

/// Manifest file name inside an index directory.
pub const MANIFEST_FILE: &str = "manifest.json";
/// Chunk table file name.
pub const CORPUS_FILE: &str = "corpus.json";
/// Lexical index artifact file name.
pub const LEXICAL_FILE: &str = "lexical.bin";
/// Vector rows artifact file name.
pub const VECTORS_FILE: &str = "vectors.bin";

/// Current artifact format version.
pub const FORMAT_VERSION: u32 = 1;

const LEXICAL_MAGIC: &[u8; 4] = b"DLEX";
const VECTORS_MAGIC: &[u8; 4] = b"DVEC";

/// Index-wide metadata persisted alongside the artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexManifest {
    /// Artifact format version.
    pub format_version: u32,
    /// When the index was built.
    pub built_at: DateTime<Utc>,
    /// Number of chunks in the corpus.
    pub chunk_count: u64,
    /// Embedding dimension of the vector artifact.
    pub embedding_dimension: usize,
    /// Provider family that produced the embeddings.
    pub embedder: String,
    /// BM25 parameters the lexical index was built with.
    pub bm25: Bm25Params,
}

fn unavailable(file: &str, reason: impl std::fmt::Display) -> DalilError {
    DalilError::index_unavailable(format!("{file}: {reason}"))
}

/// Write the manifest.
pub fn write_manifest(dir: &Path, manifest: &IndexManifest) -> Result<()> {
    let json = serde_json::to_vec_pretty(manifest)?;
    fs::write(dir.join(MANIFEST_FILE), json)?;
    Ok(())
}

/// Read and version-check the manifest.
pub fn read_manifest(dir: &Path) -> Result<IndexManifest> {
    let path = dir.join(MANIFEST_FILE);
    let content = fs::read(&path).map_err(|e| unavailable(MANIFEST_FILE, e))?;
    let manifest: IndexManifest =
        serde_json::from_slice(&content).map_err(|e| unavailable(MANIFEST_FILE, e))?;

    if manifest.format_version != FORMAT_VERSION {
        return Err(unavailable(
            MANIFEST_FILE,
            format!(
                "unsupported format version {} (expected {FORMAT_VERSION})",
                manifest.format_version
            ),
        ));
    }
    Ok(manifest)
}

/// Write the chunk table.
pub fn write_corpus(dir: &Path, corpus: &CorpusStore) -> Result<()> {
    let chunks: Vec<&Chunk> = corpus.iter().collect();
    let json = serde_json::to_vec(&chunks)?;
    fs::write(dir.join(CORPUS_FILE), json)?;
    Ok(())
}

/// Read the chunk table.
pub fn read_corpus(dir: &Path) -> Result<CorpusStore> {
    let content =
        fs::read(dir.join(CORPUS_FILE)).map_err(|e| unavailable(CORPUS_FILE, e))?;
    let chunks: Vec<Chunk> =
        serde_json::from_slice(&content).map_err(|e| unavailable(CORPUS_FILE, e))?;
    CorpusStore::new(chunks).map_err(|e| unavailable(CORPUS_FILE, e))
}

fn frame(magic: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 16);
    out.extend_from_slice(magic);
    out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    out.extend_from_slice(&(payload.len() as u64).to_le_bytes());
    out.extend_from_slice(payload);
    out.extend_from_slice(&crc32fast::hash(payload).to_le_bytes());
    out
}

fn unframe<'a>(magic: &[u8; 4], file: &str, bytes: &'a [u8]) -> Result<&'a [u8]> {
    let mut cursor = Cursor::new(bytes);

    let mut found_magic = [0u8; 4];
    std::io::Read::read_exact(&mut cursor, &mut found_magic)
        .map_err(|e| unavailable(file, e))?;
    if &found_magic != magic {
        return Err(unavailable(file, "bad magic tag"));
    }

    let version = cursor
        .read_u32::<LittleEndian>()
        .map_err(|e| unavailable(file, e))?;
    if version != FORMAT_VERSION {
        return Err(unavailable(
            file,
            format!("unsupported format version {version}"),
        ));
    }

    let payload_len = cursor
        .read_u64::<LittleEndian>()
        .map_err(|e| unavailable(file, e))? as usize;
    let payload_start = cursor.position() as usize;
    let payload_end = payload_start
        .checked_add(payload_len)
        .ok_or_else(|| unavailable(file, "payload length overflow"))?;
    let crc_end = payload_end
        .checked_add(4)
        .ok_or_else(|| unavailable(file, "payload length overflow"))?;
    if bytes.len() < crc_end {
        return Err(unavailable(file, "truncated payload"));
    }

    let payload = &bytes[payload_start..payload_end];
    let stored_crc = u32::from_le_bytes(
        bytes[payload_end..payload_end + 4]
            .try_into()
            .map_err(|_| unavailable(file, "truncated checksum"))?,
    );
    if crc32fast::hash(payload) != stored_crc {
        return Err(unavailable(file, "checksum mismatch"));
    }

    Ok(payload)
}

/// Write the lexical index artifact.
pub fn write_lexical(dir: &Path, index: &LexicalIndex) -> Result<()> {
    let payload = bincode::serialize(index)
        .map_err(|e| DalilError::storage(format!("failed to encode lexical index: {e}")))?;
    fs::write(dir.join(LEXICAL_FILE), frame(LEXICAL_MAGIC, &payload))?;
    Ok(())
}

/// Read the lexical index artifact.
pub fn read_lexical(dir: &Path) -> Result<LexicalIndex> {
    let bytes =
        fs::read(dir.join(LEXICAL_FILE)).map_err(|e| unavailable(LEXICAL_FILE, e))?;
    let payload = unframe(LEXICAL_MAGIC, LEXICAL_FILE, &bytes)?;
    bincode::deserialize(payload).map_err(|e| unavailable(LEXICAL_FILE, e))
}

/// Write the vector rows artifact.
///
/// Layout after the common frame: dimension (u32), row count (u64), then
/// `count` rows of chunk id (u64) followed by `dimension` little-endian
/// f32 components.
pub fn write_vectors(dir: &Path, index: &FlatVectorIndex) -> Result<()> {
    let dimension = index.dimension();
    let mut payload =
        Vec::with_capacity(12 + index.len() * (8 + dimension * 4));

    payload
        .write_u32::<LittleEndian>(dimension as u32)
        .map_err(DalilError::Io)?;
    payload
        .write_u64::<LittleEndian>(index.len() as u64)
        .map_err(DalilError::Io)?;

    for (chunk_id, row) in index.iter_rows() {
        payload
            .write_u64::<LittleEndian>(chunk_id)
            .map_err(DalilError::Io)?;
        for component in row {
            payload
                .write_f32::<LittleEndian>(*component)
                .map_err(DalilError::Io)?;
        }
    }

    fs::write(dir.join(VECTORS_FILE), frame(VECTORS_MAGIC, &payload))?;
    Ok(())
}

/// Read the vector rows artifact.
pub fn read_vectors(dir: &Path) -> Result<FlatVectorIndex> {
    let bytes =
        fs::read(dir.join(VECTORS_FILE)).map_err(|e| unavailable(VECTORS_FILE, e))?;
    let payload = unframe(VECTORS_MAGIC, VECTORS_FILE, &bytes)?;
    let mut cursor = Cursor::new(payload);

    let dimension = cursor
        .read_u32::<LittleEndian>()
        .map_err(|e| unavailable(VECTORS_FILE, e))? as usize;
    let count = cursor
        .read_u64::<LittleEndian>()
        .map_err(|e| unavailable(VECTORS_FILE, e))?;

    let mut index = FlatVectorIndex::new(dimension);
    for _ in 0..count {
        let chunk_id = cursor
            .read_u64::<LittleEndian>()
            .map_err(|e| unavailable(VECTORS_FILE, e))?;
        let mut data = vec![0.0f32; dimension];
        cursor
            .read_f32_into::<LittleEndian>(&mut data)
            .map_err(|e| unavailable(VECTORS_FILE, e))?;
        index
            .add(chunk_id, Vector::new(data))
            .map_err(|e| unavailable(VECTORS_FILE, e))?;
    }

    Ok(index)
}
