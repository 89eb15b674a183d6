//! CLI module for the clireplay fixture inspector.
//!
//! This module provides the command-line interface for listing,
//! inspecting, and validating recorded fixtures.

mod commands;
mod output;

pub use commands::{Cli, Commands, OutputFormat};
pub use output::{ListingEntry, OutputFormatter, ValidationOutcome};
