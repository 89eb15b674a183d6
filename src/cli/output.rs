//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying fixture
//! listings, contents, and validation reports.

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use std::fmt::Write;
use std::path::PathBuf;
use tabled::{Table, Tabled};

use crate::fixture::Fixture;

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// One fixture in a listing.
#[derive(Debug, Clone, Serialize)]
pub struct ListingEntry {
    /// Suite directory name.
    pub suite: String,
    /// Fixture key (derived from the test title).
    pub test: String,
    /// Recorded exchange count across all attempt groups.
    pub exchanges: usize,
    /// When the fixture was recorded, if the file says.
    pub recorded_at: Option<DateTime<Utc>>,
    /// On-disk path of the fixture file.
    pub path: PathBuf,
}

/// One fixture's validation outcome.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationOutcome {
    /// Suite directory name.
    pub suite: String,
    /// Fixture key.
    pub test: String,
    /// Hex sha256 of the fixture file, when readable.
    pub checksum: Option<String>,
    /// Validation error, if the fixture failed to load.
    pub error: Option<String>,
}

impl ValidationOutcome {
    /// Returns true if the fixture loaded cleanly.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

/// Fixture row for table display.
#[derive(Tabled)]
struct FixtureRow {
    #[tabled(rename = "Suite")]
    suite: String,
    #[tabled(rename = "Test")]
    test: String,
    #[tabled(rename = "Exchanges")]
    exchanges: usize,
    #[tabled(rename = "Recorded")]
    recorded: String,
    #[tabled(rename = "Path")]
    path: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a fixture listing for display.
    #[must_use]
    pub fn format_listing(&self, entries: &[ListingEntry]) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(entries).unwrap_or_default(),
            OutputFormat::Text => Self::format_listing_text(entries),
        }
    }

    fn format_listing_text(entries: &[ListingEntry]) -> String {
        if entries.is_empty() {
            return String::from("No fixtures recorded.\n");
        }

        let rows: Vec<FixtureRow> = entries
            .iter()
            .map(|e| FixtureRow {
                suite: e.suite.clone(),
                test: e.test.clone(),
                exchanges: e.exchanges,
                recorded: e
                    .recorded_at
                    .map_or_else(|| String::from("-"), |t| t.format("%Y-%m-%d %H:%M").to_string()),
                path: e.path.display().to_string(),
            })
            .collect();

        let mut output = Table::new(rows).to_string();
        output.push('\n');
        let _ = writeln!(output, "\n{} fixture(s)", entries.len());
        output
    }

    /// Formats one fixture's recorded contents for display.
    #[must_use]
    pub fn format_fixture(&self, fixture: &Fixture) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(fixture).unwrap_or_default(),
            OutputFormat::Text => Self::format_fixture_text(fixture),
        }
    }

    fn format_fixture_text(fixture: &Fixture) -> String {
        let mut output = String::new();
        let _ = writeln!(output, "\nFixture: {}", fixture.label().bold());
        let _ = writeln!(output, "Profile: {}", fixture.profile.display_name);
        if let Some(recorded_at) = &fixture.recorded_at {
            let _ = writeln!(output, "Recorded: {recorded_at}");
        }

        if !fixture.env_overrides.is_empty() {
            output.push_str("\nEnvironment overrides:\n");
            for (name, value) in &fixture.env_overrides {
                let _ = writeln!(output, "   {name}={value}");
            }
        }

        for (index, group) in fixture.exchanges.iter().enumerate() {
            let _ = writeln!(output, "\nAttempt group {}:", index + 1);
            for exchange in group {
                let _ = writeln!(
                    output,
                    "   {} -> {}",
                    exchange.describe(),
                    exchange.response.status
                );
            }
        }

        output
    }

    /// Formats a validation report for display.
    #[must_use]
    pub fn format_validation(&self, outcomes: &[ValidationOutcome]) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(outcomes).unwrap_or_default(),
            OutputFormat::Text => Self::format_validation_text(outcomes),
        }
    }

    fn format_validation_text(outcomes: &[ValidationOutcome]) -> String {
        let mut output = String::new();
        let mut failures = 0usize;

        for outcome in outcomes {
            match &outcome.error {
                None => {
                    let digest = outcome
                        .checksum
                        .as_deref()
                        .map_or_else(String::new, |sum| format!("  {}", &sum[..12.min(sum.len())]));
                    let _ = writeln!(
                        output,
                        "{} {}/{}{digest}",
                        "✓".green(),
                        outcome.suite,
                        outcome.test
                    );
                }
                Some(error) => {
                    failures += 1;
                    let _ = writeln!(
                        output,
                        "{} {}/{}: {error}",
                        "✗".red(),
                        outcome.suite,
                        outcome.test
                    );
                }
            }
        }

        if failures == 0 {
            let _ = writeln!(output, "\n{} fixture(s) valid", outcomes.len());
        } else {
            let _ = writeln!(
                output,
                "\n{failures} of {} fixture(s) invalid",
                outcomes.len()
            );
        }
        output
    }
}
