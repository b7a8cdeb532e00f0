//! Command line argument parsing using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Dalil - hybrid Arabic document retrieval with role-based access control
#[derive(Parser, Debug, Clone)]
#[command(name = "dalil")]
#[command(about = "Hybrid Arabic document retrieval with role-based access control")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct DalilArgs {
    /// Verbosity level (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run a retrieval query against an index directory
    Query {
        /// Index directory holding the persisted artifacts
        #[arg(short, long)]
        index: PathBuf,

        /// Roles held by the requester, comma separated (staff, legal, admin)
        #[arg(short, long, value_delimiter = ',')]
        roles: Vec<String>,

        /// Number of results to return
        #[arg(long, default_value_t = 5)]
        top_k: usize,

        /// Lexical candidate pool width
        #[arg(long, default_value_t = 50)]
        bm25_k: usize,

        /// Vector candidate pool width
        #[arg(long, default_value_t = 50)]
        vec_k: usize,

        /// Fusion weight for the vector modality
        #[arg(long, default_value_t = 0.5)]
        alpha: f32,

        /// Optional synonym glossary JSON
        #[arg(long)]
        glossary: Option<PathBuf>,

        /// Emit results as JSON instead of human-readable text
        #[arg(long)]
        json: bool,

        /// Query text
        query: String,
    },

    /// Print manifest and corpus statistics for an index directory
    Inspect {
        /// Index directory holding the persisted artifacts
        #[arg(short, long)]
        index: PathBuf,

        /// Emit statistics as JSON
        #[arg(long)]
        json: bool,
    },
}

impl DalilArgs {
    /// Effective verbosity level: 0 = quiet, 1 = normal, 2+ = debug.
    pub fn verbosity(&self) -> u8 {
        if self.quiet { 0 } else { self.verbose.saturating_add(1) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_command() {
        let args = DalilArgs::parse_from([
            "dalil", "query", "--index", "/tmp/idx", "--roles", "staff,legal", "--top-k", "3",
            "الطاقة النووية",
        ]);

        match args.command {
            Command::Query {
                roles, top_k, query, ..
            } => {
                assert_eq!(roles, vec!["staff", "legal"]);
                assert_eq!(top_k, 3);
                assert_eq!(query, "الطاقة النووية");
            }
            _ => panic!("expected query command"),
        }
    }

    #[test]
    fn test_verbosity_levels() {
        let args = DalilArgs::parse_from(["dalil", "inspect", "--index", "/tmp/idx"]);
        assert_eq!(args.verbosity(), 1);

        let args = DalilArgs::parse_from(["dalil", "-v", "inspect", "--index", "/tmp/idx"]);
        assert_eq!(args.verbosity(), 2);

        let args = DalilArgs::parse_from(["dalil", "-q", "inspect", "--index", "/tmp/idx"]);
        assert_eq!(args.verbosity(), 0);
    }
}
