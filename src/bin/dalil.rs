//! Dalil CLI binary.

use clap::Parser;
use dalil::cli::args::DalilArgs;
use dalil::cli::commands::execute_command;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let args = DalilArgs::parse();

    let default_level = match args.verbosity() {
        0 => "error",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = execute_command(args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
