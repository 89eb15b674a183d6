//! Clireplay CLI entrypoint.
//!
//! This is the main entrypoint for the clireplay fixture inspection tool.

use std::path::Path;
use std::process::ExitCode;

use clireplay::cli::{Cli, Commands, ListingEntry, OutputFormatter, ValidationOutcome};
use clireplay::config::{find_settings_file, SettingsLoader};
use clireplay::error::{FixtureError, HarnessError, Result};
use clireplay::fixture::{Fixture, FixtureStore};
use clireplay::HarnessSettings;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Main entry point after argument parsing.
fn run(cli: Cli) -> Result<()> {
    let settings = load_settings(cli.config.as_deref())?;
    let store = FixtureStore::discover(&settings.fixture_root)?;
    let formatter = OutputFormatter::new(cli.output);

    match cli.command {
        Commands::List { suite } => cmd_list(&store, suite.as_deref(), &formatter),
        Commands::Show { suite, test } => cmd_show(&store, &suite, &test, &formatter),
        Commands::Validate => cmd_validate(&store, &formatter),
    }
}

/// Loads harness settings: explicit file, discovered file, or environment
/// defaults.
fn load_settings(config: Option<&Path>) -> Result<HarnessSettings> {
    let loader = SettingsLoader::new();
    loader.load_dotenv()?;

    if let Some(path) = config {
        return loader.load_with_env(path);
    }

    match find_settings_file(".") {
        Ok(path) => loader.load_with_env(path),
        Err(_) => {
            debug!("No settings file found; using defaults and environment");
            SettingsLoader::from_env()
        }
    }
}

/// Lists recorded fixtures, optionally restricted to one suite.
fn cmd_list(store: &FixtureStore, suite: Option<&str>, formatter: &OutputFormatter) -> Result<()> {
    let mut entries = Vec::new();
    for entry in store.entries() {
        if suite.is_some_and(|s| s != entry.suite) {
            continue;
        }
        // A fixture that fails to load still appears, with a zero count;
        // `validate` reports the breakage.
        let fixture = store.load(&entry.suite, &entry.test).ok().flatten();
        entries.push(ListingEntry {
            suite: entry.suite,
            test: entry.test,
            exchanges: fixture.as_ref().map_or(0, Fixture::exchange_count),
            recorded_at: fixture.and_then(|f| f.recorded_at),
            path: entry.path,
        });
    }

    println!("{}", formatter.format_listing(&entries));
    Ok(())
}

/// Shows one fixture's recorded exchanges.
fn cmd_show(
    store: &FixtureStore,
    suite: &str,
    test: &str,
    formatter: &OutputFormatter,
) -> Result<()> {
    let fixture = store.load(suite, test)?.ok_or_else(|| {
        HarnessError::Fixture(FixtureError::NotFound {
            suite: suite.to_string(),
            test: test.to_string(),
            path: store.expected_path(suite, test),
        })
    })?;

    println!("{}", formatter.format_fixture(&fixture));
    Ok(())
}

/// Validates every fixture in the store.
fn cmd_validate(store: &FixtureStore, formatter: &OutputFormatter) -> Result<()> {
    let mut outcomes = Vec::new();
    for entry in store.entries() {
        let error = match store.load(&entry.suite, &entry.test) {
            Ok(Some(_)) => None,
            Ok(None) => Some(String::from("fixture disappeared during scan")),
            Err(e) => Some(e.to_string()),
        };
        outcomes.push(ValidationOutcome {
            checksum: FixtureStore::checksum(&entry.path).ok(),
            suite: entry.suite,
            test: entry.test,
            error,
        });
    }

    println!("{}", formatter.format_validation(&outcomes));

    let failures = outcomes.iter().filter(|o| !o.is_valid()).count();
    if failures > 0 {
        return Err(HarnessError::internal(format!(
            "{failures} invalid fixture(s)"
        )));
    }
    Ok(())
}
