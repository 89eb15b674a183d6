//! Error types for the clireplay harness.
//!
//! This module provides the error hierarchy for all phases of a harness run:
//! settings, fixture loading, HTTP interception, and command execution.
//! The two classification helpers on [`HarnessError`] drive the harness
//! control flow: [`HarnessError::is_retryable`] feeds the retry controller,
//! and [`HarnessError::is_integrity`] separates harness faults (which abort
//! the current test) from failures that flow back as ordinary
//! `CommandResult`s.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the clireplay harness.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Settings-related errors.
    #[error("Settings error: {0}")]
    Config(#[from] ConfigError),

    /// Fixture store errors.
    #[error("Fixture error: {0}")]
    Fixture(#[from] FixtureError),

    /// HTTP interception errors.
    #[error("Interception error: {0}")]
    Intercept(#[from] InterceptError),

    /// Command execution errors.
    #[error("Execution error: {0}")]
    Exec(#[from] ExecError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Settings-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file was not found.
    #[error("Settings file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The settings file could not be parsed.
    #[error("Failed to parse settings: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// A setting or environment value was not understood.
    #[error("Invalid value for {name}: {value}")]
    InvalidValue {
        /// Name of the setting or variable.
        name: String,
        /// The rejected value.
        value: String,
    },

    /// Environment variable is missing.
    #[error("Missing environment variable: {name}")]
    MissingEnvVar {
        /// Name of the missing variable.
        name: String,
    },
}

/// Fixture store errors.
///
/// All of these are integrity failures: they indicate the harness itself is
/// in an inconsistent state relative to its recordings and must never be
/// retried or silently skipped.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// No fixture was recorded for this test.
    #[error("No fixture recorded for test '{test}' in suite '{suite}' (expected at {path})")]
    NotFound {
        /// Suite name.
        suite: String,
        /// Full test title.
        test: String,
        /// Path where the fixture was expected.
        path: PathBuf,
    },

    /// A fixture file exists but could not be parsed.
    #[error("Malformed fixture {path}: {message}")]
    Malformed {
        /// Path to the offending fixture file.
        path: PathBuf,
        /// Description of the parse failure.
        message: String,
    },

    /// A fixture declares an unsupported format version.
    #[error("Fixture {path} has unsupported version {found} (expected {expected})")]
    VersionMismatch {
        /// Path to the fixture file.
        path: PathBuf,
        /// Supported version.
        expected: u32,
        /// Version found in the file.
        found: u32,
    },

    /// The fixture root directory could not be scanned.
    #[error("Failed to scan fixture root {path}: {message}")]
    ScanFailed {
        /// Fixture root directory.
        path: PathBuf,
        /// Description of the scan failure.
        message: String,
    },

    /// A recorded exchange could not be compiled into a scope.
    #[error("Invalid exchange in fixture '{fixture}': {message}")]
    InvalidExchange {
        /// Fixture label (`suite/test`).
        fixture: String,
        /// Description of the problem (e.g. a bad pattern).
        message: String,
    },
}

/// HTTP interception errors.
///
/// Like [`FixtureError`], these are integrity failures and abort the
/// current test with full diagnostic context.
#[derive(Debug, Error)]
pub enum InterceptError {
    /// The code under test issued a request with no scope left to serve it.
    #[error(
        "No matching interceptor for {method} {url} (fixture '{fixture}', \
         {consumed} scope(s) already consumed)"
    )]
    UnexpectedRequest {
        /// HTTP method of the offending request.
        method: String,
        /// URL of the offending request.
        url: String,
        /// Fixture label for diagnostics.
        fixture: String,
        /// Number of scopes consumed before this request.
        consumed: usize,
    },

    /// The next recorded scope does not match the request that arrived.
    #[error(
        "Out-of-order request {method} {url}: expected {expected} \
         (fixture '{fixture}', position {position})"
    )]
    ScopeMismatch {
        /// HTTP method of the offending request.
        method: String,
        /// URL of the offending request.
        url: String,
        /// Description of the scope that was expected next.
        expected: String,
        /// Fixture label for diagnostics.
        fixture: String,
        /// Zero-based cursor position of the expected scope.
        position: usize,
    },

    /// Scopes were left unconsumed at teardown.
    #[error(
        "{} scope(s) never matched for fixture '{fixture}': {}",
        remaining.len(),
        remaining.join("; ")
    )]
    UnconsumedScopes {
        /// Descriptions of every unmatched scope, in recorded order.
        remaining: Vec<String>,
        /// Fixture label for diagnostics.
        fixture: String,
    },
}

/// Command execution errors.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The dispatched command panicked.
    #[error("Command panicked: {message}")]
    Panicked {
        /// Panic payload, if it was a string.
        message: String,
    },

    /// A network-level failure reached the transport.
    #[error("Network error: {message}")]
    Network {
        /// Description of the network failure.
        message: String,
    },

    /// The dispatcher reported a process-level failure.
    #[error("Dispatch failed: {message}")]
    Dispatch {
        /// Description of the dispatch failure.
        message: String,
    },

    /// A format string and its arguments disagree.
    #[error("Command format expects {expected} argument(s), {provided} provided")]
    FormatArity {
        /// Number of `%s` placeholders in the format string.
        expected: usize,
        /// Number of arguments supplied.
        provided: usize,
    },

    /// Captured output was expected to be JSON but is not.
    #[error("Command output is not valid JSON: {message}")]
    OutputNotJson {
        /// Description of the parse failure.
        message: String,
    },
}

/// Result type alias for harness operations.
pub type Result<T> = std::result::Result<T, HarnessError>;

impl HarnessError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true if this error represents a transient execution failure
    /// that the retry controller may mask.
    ///
    /// Fixture and interception errors are never retryable: they indicate
    /// the harness is in an inconsistent state.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Exec(
                ExecError::Panicked { .. }
                    | ExecError::Network { .. }
                    | ExecError::Dispatch { .. }
            )
        )
    }

    /// Returns true if this error is a harness-integrity fault that must
    /// abort the current test rather than flow back as a `CommandResult`.
    #[must_use]
    pub const fn is_integrity(&self) -> bool {
        matches!(self, Self::Fixture(_) | Self::Intercept(_))
    }
}

impl ExecError {
    /// Creates a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates a dispatch error.
    #[must_use]
    pub fn dispatch(message: impl Into<String>) -> Self {
        Self::Dispatch {
            message: message.into(),
        }
    }
}

impl FixtureError {
    /// Creates a malformed-fixture error.
    #[must_use]
    pub fn malformed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            message: message.into(),
        }
    }
}
