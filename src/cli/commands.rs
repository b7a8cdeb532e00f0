//! CLI command execution.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use crate::access::{Role, RoleHierarchy};
use crate::analysis::Glossary;
use crate::cli::args::{Command, DalilArgs};
use crate::config::RetrievalConfig;
use crate::embedding::{Embedder, HashEmbedder};
use crate::error::{DalilError, Result};
use crate::retrieval::{RetrievalEngine, RetrievalRequest, RetrievalResult};
use crate::storage::IndexSnapshot;
use crate::vector::VectorIndex;

/// Execute the parsed CLI command.
pub fn execute_command(args: DalilArgs) -> Result<()> {
    match args.command {
        Command::Query {
            index,
            roles,
            top_k,
            bm25_k,
            vec_k,
            alpha,
            glossary,
            json,
            query,
        } => run_query(
            &index, &roles, top_k, bm25_k, vec_k, alpha, glossary.as_deref(), json, &query,
        ),
        Command::Inspect { index, json } => run_inspect(&index, json),
    }
}

/// Reconstruct the embedding provider recorded in the manifest.
///
/// Only the in-crate feature-hashing family can be rebuilt here;
/// model-backed providers are wired in by the serving layer.
fn embedder_from_manifest(name: &str, dimension: usize) -> Result<Arc<dyn Embedder>> {
    match name {
        "hash" => Ok(Arc::new(HashEmbedder::new(dimension))),
        other => Err(DalilError::embedding(format!(
            "index was built with embedder '{other}', which this CLI cannot instantiate"
        ))),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_query(
    index_dir: &Path,
    role_names: &[String],
    top_k: usize,
    bm25_k: usize,
    vec_k: usize,
    alpha: f32,
    glossary_path: Option<&Path>,
    json: bool,
    query: &str,
) -> Result<()> {
    let roles = role_names
        .iter()
        .map(|name| Role::parse_str(name))
        .collect::<Result<Vec<Role>>>()?;

    let snapshot = IndexSnapshot::load(index_dir)?;
    let embedder = embedder_from_manifest(
        &snapshot.manifest.embedder,
        snapshot.manifest.embedding_dimension,
    )?;
    let glossary = match glossary_path {
        Some(path) => Glossary::load_from_file(path)?,
        None => Glossary::empty(),
    };

    let engine = RetrievalEngine::new(
        snapshot,
        embedder,
        RetrievalConfig::default(),
        glossary,
        RoleHierarchy::default(),
    )?;

    let request = RetrievalRequest::new(query, roles)
        .with_top_k(top_k)
        .with_bm25_k(bm25_k)
        .with_vec_k(vec_k)
        .with_alpha(alpha);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(DalilError::Io)?;
    let result = runtime.block_on(engine.retrieve(&request))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }
    Ok(())
}

fn print_result(result: &RetrievalResult) {
    if result.items.is_empty() {
        println!("no visible results");
    }
    for (rank, item) in result.items.iter().enumerate() {
        println!(
            "{:>2}. [{:.4}] {} (page {}{})",
            rank + 1,
            item.fused_score,
            item.doc_name,
            item.page,
            item.article_ref
                .as_deref()
                .map(|a| format!(", {a}"))
                .unwrap_or_default(),
        );
        println!("    {}", item.snippet);
    }
    if result.hidden_count > 0 {
        println!("({} result(s) hidden by access policy)", result.hidden_count);
    }
}

fn run_inspect(index_dir: &Path, json: bool) -> Result<()> {
    let snapshot = IndexSnapshot::load(index_dir)?;
    let stats = snapshot.lexical.stats();

    let mut pages_per_doc: BTreeMap<&str, usize> = BTreeMap::new();
    let mut restricted_docs: BTreeMap<&str, bool> = BTreeMap::new();
    for chunk in snapshot.corpus.iter() {
        *pages_per_doc.entry(chunk.doc_name.as_str()).or_default() += 1;
        restricted_docs
            .entry(chunk.doc_name.as_str())
            .or_insert_with(|| !chunk.required_roles.contains(&Role::Staff));
    }

    if json {
        let value = serde_json::json!({
            "manifest": snapshot.manifest,
            "lexical": stats,
            "vector_rows": snapshot.vectors.len(),
            "documents": pages_per_doc
                .iter()
                .map(|(name, chunks)| {
                    serde_json::json!({
                        "name": name,
                        "chunks": chunks,
                        "restricted": restricted_docs.get(name).copied().unwrap_or(false),
                    })
                })
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("built at:        {}", snapshot.manifest.built_at);
        println!("embedder:        {} (dimension {})", snapshot.manifest.embedder, snapshot.manifest.embedding_dimension);
        println!("chunks:          {}", stats.chunk_count);
        println!("distinct terms:  {}", stats.term_count);
        println!("avg chunk size:  {:.1} tokens", stats.avg_chunk_length);
        println!("documents:");
        for (name, chunks) in &pages_per_doc {
            let marker = if restricted_docs.get(name).copied().unwrap_or(false) {
                " [restricted]"
            } else {
                ""
            };
            println!("  {name}: {chunks} chunk(s){marker}");
        }
    }
    Ok(())
}
