//! Per-test environment overlay.
//!
//! Fixture environment overrides are not applied by mutating process-wide
//! variables. Each test session owns an overlay (suite defaults layered
//! under the fixture's own overrides) that the command under test reads
//! through its context, falling back to the real process environment.
//! Isolation between consecutive tests is structural: the overlay dies
//! with the session, so nothing leaks into the next test.

use std::collections::BTreeMap;

/// Layered environment view for one test session.
#[derive(Debug, Clone, Default)]
pub struct EnvOverlay {
    overrides: BTreeMap<String, String>,
}

impl EnvOverlay {
    /// Creates an empty overlay (process environment only).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            overrides: BTreeMap::new(),
        }
    }

    /// Builds an overlay from suite defaults with fixture overrides
    /// layered on top.
    #[must_use]
    pub fn layered(
        seed: &BTreeMap<String, String>,
        overrides: &BTreeMap<String, String>,
    ) -> Self {
        let mut merged = seed.clone();
        for (name, value) in overrides {
            merged.insert(name.clone(), value.clone());
        }
        Self { overrides: merged }
    }

    /// Sets one override.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.overrides.insert(name.into(), value.into());
    }

    /// Looks up a variable: overrides first, then the process
    /// environment.
    #[must_use]
    pub fn var(&self, name: &str) -> Option<String> {
        self.overrides
            .get(name)
            .cloned()
            .or_else(|| std::env::var(name).ok())
    }

    /// Returns true if the overlay itself overrides this variable.
    #[must_use]
    pub fn overrides_var(&self, name: &str) -> bool {
        self.overrides.contains_key(name)
    }

    /// Number of overridden variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    /// Returns true if nothing is overridden.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}
