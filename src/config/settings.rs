//! Harness settings schema.
//!
//! Settings describe where fixtures live, which execution mode the suite
//! runs in, and how tolerant the retry controller is. They can come from a
//! `clireplay.yaml` file, from `CLIREPLAY_*` environment variables, or from
//! code via the builder-style `with_` methods.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ConfigError;

/// Environment variable selecting the execution mode.
pub const MODE_ENV_VAR: &str = "CLIREPLAY_MODE";

/// Execution mode of the harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// All external calls are satisfied from fixtures; no network access.
    #[default]
    Playback,
    /// Calls go to the live service and are captured into new fixtures.
    Record,
    /// Calls go to the live service; nothing is captured.
    Live,
}

impl Mode {
    /// Returns true in playback mode.
    #[must_use]
    pub const fn is_playback(self) -> bool {
        matches!(self, Self::Playback)
    }

    /// Returns true in record mode.
    #[must_use]
    pub const fn is_record(self) -> bool {
        matches!(self, Self::Record)
    }

    /// Returns true whenever live network access occurs.
    #[must_use]
    pub const fn is_live(self) -> bool {
        matches!(self, Self::Record | Self::Live)
    }

    /// Returns the canonical string form of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Playback => "playback",
            Self::Record => "record",
            Self::Live => "live",
        }
    }
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "playback" => Ok(Self::Playback),
            "record" => Ok(Self::Record),
            "live" => Ok(Self::Live),
            other => Err(ConfigError::InvalidValue {
                name: String::from(MODE_ENV_VAR),
                value: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Harness settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HarnessSettings {
    /// Execution mode.
    #[serde(default)]
    pub mode: Mode,

    /// Root directory holding recorded fixtures, one subdirectory per suite.
    #[serde(default = "default_fixture_root")]
    pub fixture_root: PathBuf,

    /// Maximum total command invocations for retryable failures.
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Request timeout for the live transport, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Replace recorded request bodies with wildcard matchers.
    ///
    /// Bodies legitimately vary run-to-run (timestamps, generated names),
    /// so recordings default to matching any body while still enforcing
    /// method and URL order.
    #[serde(default = "default_true")]
    pub relax_recorded_bodies: bool,

    /// Suite-wide environment defaults (e.g. region names), layered under
    /// each fixture's own overrides.
    #[serde(default)]
    pub seed_env: BTreeMap<String, String>,
}

fn default_fixture_root() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("clireplay")
        .join("fixtures")
}

const fn default_retry_count() -> u32 {
    5
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_true() -> bool {
    true
}

impl Default for HarnessSettings {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            fixture_root: default_fixture_root(),
            retry_count: default_retry_count(),
            request_timeout_secs: default_timeout_secs(),
            relax_recorded_bodies: true,
            seed_env: BTreeMap::new(),
        }
    }
}

impl HarnessSettings {
    /// Creates settings with defaults and the given fixture root.
    #[must_use]
    pub fn new(fixture_root: impl Into<PathBuf>) -> Self {
        Self {
            fixture_root: fixture_root.into(),
            ..Self::default()
        }
    }

    /// Sets the execution mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the retry count.
    #[must_use]
    pub const fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }

    /// Adds a suite-wide environment default.
    #[must_use]
    pub fn with_seed_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.seed_env.insert(name.into(), value.into());
        self
    }

    /// Validates settings ranges.
    ///
    /// # Errors
    ///
    /// Returns an error if the retry count is zero or the timeout is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry_count == 0 {
            return Err(ConfigError::InvalidValue {
                name: String::from("retry_count"),
                value: String::from("0"),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                name: String::from("request_timeout_secs"),
                value: String::from("0"),
            });
        }
        Ok(())
    }
}
