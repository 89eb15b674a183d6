//! Record-mode capture buffer.
//!
//! A `RecordingSession` is an explicit per-suite object (never a module
//! global) that accumulates observed request/response pairs in issue order
//! while commands run against the live service, then serializes them into
//! fixture files at suite teardown. Each top-level command attempt opens a
//! new exchange group for the current test, so retried attempts replay as
//! distinct sequential call patterns.

use chrono::Utc;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{HarnessError, Result};
use crate::fixture::{
    fixture_key, BodyMatcher, FixtureFile, PathMatcher, Profile, RecordedExchange,
    RecordedResponse, FIXTURE_VERSION,
};

use super::scope::{path_and_query, HttpRequest, HttpResponse};

/// Mutable capture state, grouped per test key.
#[derive(Debug, Default)]
struct RecordState {
    /// Test key to ordered exchange groups (one group per attempt).
    tests: BTreeMap<String, Vec<Vec<RecordedExchange>>>,
    /// Key of the test currently capturing.
    current: Option<String>,
}

/// In-memory capture buffer for one suite's record-mode run.
#[derive(Debug)]
pub struct RecordingSession {
    /// Suite name (fixture subdirectory).
    suite: String,
    /// Unique identifier of this recording run.
    run_id: Uuid,
    /// Replace captured request bodies with wildcard matchers.
    relax_bodies: bool,
    /// Capture state.
    state: Mutex<RecordState>,
}

impl RecordingSession {
    /// Creates a recording session for a suite.
    #[must_use]
    pub fn new(suite: impl Into<String>, relax_bodies: bool) -> Self {
        let suite = suite.into();
        let run_id = Uuid::new_v4();
        info!("Recording session {run_id} started for suite '{suite}'");
        Self {
            suite,
            run_id,
            relax_bodies,
            state: Mutex::new(RecordState::default()),
        }
    }

    /// Returns the identifier of this recording run.
    #[must_use]
    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Returns the suite this session records for.
    #[must_use]
    pub fn suite(&self) -> &str {
        &self.suite
    }

    /// Opens a new exchange group for a command attempt of the given test.
    ///
    /// # Errors
    ///
    /// Returns an error if the capture state is poisoned.
    pub fn begin_attempt(&self, test_title: &str) -> Result<()> {
        let key = fixture_key(test_title);
        let mut state = self.lock_state()?;
        state.tests.entry(key.clone()).or_default().push(Vec::new());
        state.current = Some(key);
        Ok(())
    }

    /// Appends an observed exchange to the current attempt, preserving
    /// issue order.
    ///
    /// # Errors
    ///
    /// Returns an error if no attempt is open.
    pub fn capture(&self, request: &HttpRequest, response: &HttpResponse) -> Result<()> {
        let mut state = self.lock_state()?;
        let Some(current) = state.current.clone() else {
            return Err(HarnessError::internal(
                "capture called with no open attempt",
            ));
        };

        let body = match (&request.body, self.relax_bodies) {
            (Some(body), false) => BodyMatcher::Exact(body.clone()),
            _ => BodyMatcher::Any,
        };

        let exchange = RecordedExchange {
            method: request.method.clone(),
            path: PathMatcher::Exact(path_and_query(&request.url).to_string()),
            body,
            response: RecordedResponse {
                status: response.status,
                body: response.body.clone(),
                headers: response.headers.clone(),
            },
        };
        debug!("Captured {} for test '{current}'", exchange.describe());

        let groups = state
            .tests
            .get_mut(&current)
            .ok_or_else(|| HarnessError::internal("capture state lost current test"))?;
        match groups.last_mut() {
            Some(group) => group.push(exchange),
            None => groups.push(vec![exchange]),
        }
        Ok(())
    }

    /// Number of tests with at least one captured exchange.
    ///
    /// # Errors
    ///
    /// Returns an error if the capture state is poisoned.
    pub fn captured_tests(&self) -> Result<usize> {
        let state = self.lock_state()?;
        Ok(state
            .tests
            .values()
            .filter(|groups| groups.iter().any(|g| !g.is_empty()))
            .count())
    }

    /// Serializes every captured test into a fixture file under the given
    /// root, using the shared naming rule. Attempts that made no HTTP
    /// calls are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if a fixture file cannot be written.
    pub fn flush(&self, root: &Path, profile: &Profile) -> Result<Vec<PathBuf>> {
        let state = self.lock_state()?;
        let suite_dir = root.join(&self.suite);
        let mut written = Vec::new();

        for (key, groups) in &state.tests {
            let exchanges: Vec<Vec<RecordedExchange>> =
                groups.iter().filter(|g| !g.is_empty()).cloned().collect();
            if exchanges.is_empty() {
                continue;
            }

            let file = FixtureFile {
                version: FIXTURE_VERSION,
                profile: profile.clone(),
                env_overrides: BTreeMap::new(),
                exchanges,
                recorded_at: Some(Utc::now()),
            };

            std::fs::create_dir_all(&suite_dir)?;
            let path = suite_dir.join(format!("{key}.json"));
            let text = serde_json::to_string_pretty(&file)
                .map_err(|e| HarnessError::internal(format!("fixture serialization: {e}")))?;
            std::fs::write(&path, text)?;
            written.push(path);
        }

        info!(
            "Recording session {} flushed {} fixture(s) to {}",
            self.run_id,
            written.len(),
            suite_dir.display()
        );
        Ok(written)
    }

    fn lock_state(&self) -> Result<std::sync::MutexGuard<'_, RecordState>> {
        self.state
            .lock()
            .map_err(|_| HarnessError::internal("recording state poisoned"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::FixtureStore;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: BTreeMap::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_capture_preserves_issue_order() {
        let session = RecordingSession::new("things", true);
        session.begin_attempt("create then get").unwrap();
        session
            .capture(
                &HttpRequest::new("PUT", "https://host/things/foo"),
                &response(201, "{}"),
            )
            .unwrap();
        session
            .capture(
                &HttpRequest::new("GET", "https://host/things/foo"),
                &response(200, "{\"name\":\"foo\"}"),
            )
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let profile = Profile::synthetic("Recorded Sub");
        let written = session.flush(dir.path(), &profile).unwrap();
        assert_eq!(written.len(), 1);

        let store = FixtureStore::discover(dir.path()).unwrap();
        let fixture = store
            .load("things", "create then get")
            .unwrap()
            .expect("flushed fixture should load back");
        assert_eq!(fixture.exchanges.len(), 1);
        assert_eq!(fixture.exchanges[0][0].describe(), "PUT /things/foo");
        assert_eq!(fixture.exchanges[0][1].describe(), "GET /things/foo");
    }

    #[test]
    fn test_each_attempt_opens_a_group() {
        let session = RecordingSession::new("things", true);
        session.begin_attempt("flaky").unwrap();
        session
            .capture(&HttpRequest::new("GET", "/a"), &response(500, ""))
            .unwrap();
        session.begin_attempt("flaky").unwrap();
        session
            .capture(&HttpRequest::new("GET", "/a"), &response(200, "{}"))
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let written = session
            .flush(dir.path(), &Profile::synthetic("Recorded Sub"))
            .unwrap();
        assert_eq!(written.len(), 1);

        let store = FixtureStore::discover(dir.path()).unwrap();
        let fixture = store.load("things", "flaky").unwrap().unwrap();
        assert_eq!(fixture.exchanges.len(), 2);
    }

    #[test]
    fn test_relaxed_bodies_become_wildcards() {
        let session = RecordingSession::new("things", true);
        session.begin_attempt("put with body").unwrap();
        session
            .capture(
                &HttpRequest::new("PUT", "/a").with_body("{\"ts\": 12345}"),
                &response(200, "{}"),
            )
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        session
            .flush(dir.path(), &Profile::synthetic("Recorded Sub"))
            .unwrap();
        let store = FixtureStore::discover(dir.path()).unwrap();
        let fixture = store.load("things", "put with body").unwrap().unwrap();
        assert_eq!(fixture.exchanges[0][0].body, BodyMatcher::Any);
    }

    #[test]
    fn test_exact_bodies_kept_when_not_relaxed() {
        let session = RecordingSession::new("things", false);
        session.begin_attempt("put with body").unwrap();
        session
            .capture(
                &HttpRequest::new("PUT", "/a").with_body("{\"n\":1}"),
                &response(200, "{}"),
            )
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        session
            .flush(dir.path(), &Profile::synthetic("Recorded Sub"))
            .unwrap();
        let store = FixtureStore::discover(dir.path()).unwrap();
        let fixture = store.load("things", "put with body").unwrap().unwrap();
        assert_eq!(
            fixture.exchanges[0][0].body,
            BodyMatcher::Exact(String::from("{\"n\":1}"))
        );
    }

    #[test]
    fn test_capture_without_attempt_is_error() {
        let session = RecordingSession::new("things", true);
        let result = session.capture(&HttpRequest::new("GET", "/a"), &response(200, ""));
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_attempts_are_not_flushed() {
        let session = RecordingSession::new("things", true);
        session.begin_attempt("no calls").unwrap();

        let dir = tempfile::tempdir().unwrap();
        let written = session
            .flush(dir.path(), &Profile::synthetic("Recorded Sub"))
            .unwrap();
        assert!(written.is_empty());
    }
}
