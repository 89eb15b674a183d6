//! Fixture store: discovery, lookup, and loading.
//!
//! The store is an explicit registry built by scanning the fixture root at
//! suite-load time: one subdirectory per suite, one JSON file per test,
//! named by [`fixture_key`]. Recording and playback share that single
//! sanitization rule, so the two sides agree on naming without manual
//! bookkeeping. Lookups are pure; a missing fixture is reported as
//! `Ok(None)` (diagnostic, not fatal), while a malformed fixture is a hard
//! failure so the harness never proceeds with partial mocking.

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{FixtureError, HarnessError, Result};

use super::model::{Fixture, FixtureFile, FIXTURE_VERSION};

/// Derives the filesystem-safe lookup key for a test title.
///
/// Lowercases the title and replaces every character outside `[a-z0-9]`
/// with an underscore. Both the recorder and the loader use this rule.
#[must_use]
pub fn fixture_key(test_title: &str) -> String {
    test_title
        .trim()
        .chars()
        .map(|c| {
            let lower = c.to_ascii_lowercase();
            if lower.is_ascii_alphanumeric() {
                lower
            } else {
                '_'
            }
        })
        .collect()
}

/// One discovered fixture file.
#[derive(Debug, Clone)]
pub struct FixtureEntry {
    /// Suite name (directory under the fixture root).
    pub suite: String,
    /// Test key (file stem, normalized through [`fixture_key`]).
    pub test: String,
    /// Path to the fixture file.
    pub path: PathBuf,
}

/// Registry of recorded fixtures under one root directory.
#[derive(Debug)]
pub struct FixtureStore {
    /// Fixture root directory.
    root: PathBuf,
    /// `(suite, key)` to fixture file path.
    registry: BTreeMap<(String, String), PathBuf>,
}

impl FixtureStore {
    /// Builds the registry by scanning the fixture root.
    ///
    /// A missing root yields an empty store: new suites legitimately start
    /// with no recordings.
    ///
    /// # Errors
    ///
    /// Returns an error if the root exists but cannot be scanned.
    pub fn discover(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let mut registry = BTreeMap::new();

        if !root.exists() {
            debug!("Fixture root {} does not exist; store is empty", root.display());
            return Ok(Self { root, registry });
        }

        let suites = std::fs::read_dir(&root).map_err(|e| {
            HarnessError::Fixture(FixtureError::ScanFailed {
                path: root.clone(),
                message: e.to_string(),
            })
        })?;

        for suite_entry in suites {
            let suite_entry = suite_entry.map_err(|e| {
                HarnessError::Fixture(FixtureError::ScanFailed {
                    path: root.clone(),
                    message: e.to_string(),
                })
            })?;
            let suite_path = suite_entry.path();
            if !suite_path.is_dir() {
                continue;
            }
            let Some(suite_name) = suite_path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            let files = std::fs::read_dir(&suite_path).map_err(|e| {
                HarnessError::Fixture(FixtureError::ScanFailed {
                    path: suite_path.clone(),
                    message: e.to_string(),
                })
            })?;

            for file_entry in files.flatten() {
                let file_path = file_entry.path();
                if file_path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }
                let Some(stem) = file_path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                // Registry keys go through the same sanitization rule as
                // lookups, so a hand-renamed file stays loadable by the
                // key it is listed under.
                let key = fixture_key(stem);
                if key != stem {
                    debug!("Normalized fixture stem '{stem}' to key '{key}'");
                }
                registry.insert((suite_name.to_string(), key), file_path.clone());
            }
        }

        info!(
            "Discovered {} fixture(s) under {}",
            registry.len(),
            root.display()
        );
        Ok(Self { root, registry })
    }

    /// Returns the fixture root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the number of registered fixtures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Returns true if no fixtures were discovered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Returns every discovered fixture, ordered by suite then test key.
    #[must_use]
    pub fn entries(&self) -> Vec<FixtureEntry> {
        self.registry
            .iter()
            .map(|((suite, test), path)| FixtureEntry {
                suite: suite.clone(),
                test: test.clone(),
                path: path.clone(),
            })
            .collect()
    }

    /// Returns the path where a fixture for this test is (or would be)
    /// stored.
    #[must_use]
    pub fn expected_path(&self, suite: &str, test_title: &str) -> PathBuf {
        self.root
            .join(suite)
            .join(format!("{}.json", fixture_key(test_title)))
    }

    /// Looks up the registered fixture file for a test, if any.
    #[must_use]
    pub fn lookup(&self, suite: &str, test_title: &str) -> Option<&Path> {
        self.registry
            .get(&(suite.to_string(), fixture_key(test_title)))
            .map(PathBuf::as_path)
    }

    /// Loads the fixture for a test.
    ///
    /// Returns `Ok(None)` when no fixture was recorded for the test; that
    /// is expected for new tests and is the caller's signal, not a crash.
    ///
    /// # Errors
    ///
    /// Returns a hard error when the fixture file exists but is malformed
    /// or has an unsupported version.
    pub fn load(&self, suite: &str, test_title: &str) -> Result<Option<Fixture>> {
        let Some(path) = self.lookup(suite, test_title) else {
            debug!(
                "No fixture for '{suite}/{test_title}' (expected at {})",
                self.expected_path(suite, test_title).display()
            );
            return Ok(None);
        };
        let path = path.to_path_buf();

        let content = std::fs::read_to_string(&path).map_err(|e| {
            HarnessError::Fixture(FixtureError::malformed(&path, e.to_string()))
        })?;

        let file: FixtureFile = serde_json::from_str(&content).map_err(|e| {
            HarnessError::Fixture(FixtureError::malformed(&path, e.to_string()))
        })?;

        if file.version != FIXTURE_VERSION {
            return Err(HarnessError::Fixture(FixtureError::VersionMismatch {
                path,
                expected: FIXTURE_VERSION,
                found: file.version,
            }));
        }

        Ok(Some(Fixture::from_file(suite, fixture_key(test_title), file)))
    }

    /// Computes the sha256 checksum of a fixture file, hex-encoded.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn checksum(path: impl AsRef<Path>) -> Result<String> {
        let data = std::fs::read(path.as_ref())?;
        let mut hasher = Sha256::new();
        hasher.update(&data);
        Ok(hex::encode(hasher.finalize()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::model::{Profile, RecordedExchange, RecordedResponse};
    use serde_json::json;

    fn write_fixture(root: &Path, suite: &str, test: &str) -> PathBuf {
        let file = FixtureFile {
            version: FIXTURE_VERSION,
            profile: Profile::synthetic("Test Sub"),
            env_overrides: BTreeMap::new(),
            exchanges: vec![vec![RecordedExchange::new(
                "get",
                "/things/foo",
                RecordedResponse::json(200, &json!({"name": "foo"})),
            )]],
            recorded_at: None,
        };
        let dir = root.join(suite);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("{}.json", fixture_key(test)));
        std::fs::write(&path, serde_json::to_string_pretty(&file).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_fixture_key_sanitization() {
        assert_eq!(
            fixture_key("thing set should update tags"),
            "thing_set_should_update_tags"
        );
        assert_eq!(fixture_key("Simple"), "simple");
        assert_eq!(fixture_key("list-pods"), "list_pods");
        // The rule is deterministic: recording and playback derive the
        // same key from the same title.
        assert_eq!(fixture_key("A/B: c"), fixture_key("A/B: c"));
    }

    #[test]
    fn test_discover_and_load() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "things", "thing set should update tags");

        let store = FixtureStore::discover(dir.path()).unwrap();
        assert_eq!(store.len(), 1);

        let fixture = store
            .load("things", "thing set should update tags")
            .unwrap()
            .expect("fixture should be found");
        assert_eq!(fixture.suite, "things");
        assert_eq!(fixture.exchange_count(), 1);
    }

    #[test]
    fn test_non_canonical_stem_is_loadable_by_its_listed_key() {
        let dir = tempfile::tempdir().unwrap();
        let canonical = write_fixture(dir.path(), "things", "placeholder");
        // A hand-renamed file whose stem is not already a sanitized key.
        let renamed = canonical.with_file_name("Thing-Set.json");
        std::fs::rename(&canonical, &renamed).unwrap();

        let store = FixtureStore::discover(dir.path()).unwrap();
        let entries = store.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].test, "thing_set");

        // The entry loads back under the very key it is listed by, and
        // under any title that sanitizes to it.
        assert!(store
            .load(&entries[0].suite, &entries[0].test)
            .unwrap()
            .is_some());
        assert!(store.load("things", "Thing Set").unwrap().is_some());
    }

    #[test]
    fn test_missing_fixture_is_none_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FixtureStore::discover(dir.path()).unwrap();
        let result = store.load("things", "never recorded").unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_missing_root_is_empty_store() {
        let store = FixtureStore::discover("/nonexistent/clireplay-fixtures").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_malformed_fixture_is_hard_failure() {
        let dir = tempfile::tempdir().unwrap();
        let suite_dir = dir.path().join("things");
        std::fs::create_dir_all(&suite_dir).unwrap();
        std::fs::write(suite_dir.join("broken.json"), "{not json").unwrap();

        let store = FixtureStore::discover(dir.path()).unwrap();
        let result = store.load("things", "broken");
        assert!(matches!(
            result,
            Err(HarnessError::Fixture(FixtureError::Malformed { .. }))
        ));
    }

    #[test]
    fn test_version_mismatch_is_hard_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path(), "things", "old");
        let mut value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        value["version"] = json!(99);
        std::fs::write(&path, value.to_string()).unwrap();

        let store = FixtureStore::discover(dir.path()).unwrap();
        let result = store.load("things", "old");
        assert!(matches!(
            result,
            Err(HarnessError::Fixture(FixtureError::VersionMismatch {
                found: 99,
                ..
            }))
        ));
    }

    #[test]
    fn test_checksum_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path(), "things", "sum");
        let first = FixtureStore::checksum(&path).unwrap();
        let second = FixtureStore::checksum(&path).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }
}
