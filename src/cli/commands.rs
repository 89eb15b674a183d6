//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Clireplay - record/playback fixture inspector.
#[derive(Parser, Debug)]
#[command(name = "clireplay")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the harness settings file.
    #[arg(short, long, global = true, env = "CLIREPLAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List recorded fixtures.
    List {
        /// Restrict the listing to one suite.
        suite: Option<String>,
    },

    /// Show one fixture's recorded exchanges.
    Show {
        /// Suite the fixture belongs to.
        suite: String,

        /// Test title (or its on-disk key).
        test: String,
    },

    /// Validate every fixture in the store.
    Validate,
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}
