//! Command-line interface for querying and inspecting index directories.

pub mod args;
pub mod commands;
