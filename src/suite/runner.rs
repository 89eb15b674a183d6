//! Suite runner: the harness lifecycle state machine.
//!
//! Phases per suite: `setup_suite` once, then per test
//! `setup_test` -> test body -> `teardown_test`, then `teardown_suite`.
//! The runner decides live vs. playback, activates the matching fixture,
//! seeds deterministic identifiers through the environment overlay, and
//! enforces the strict scope-consumption contract at test teardown.
//!
//! Tests within a suite run sequentially; a runner is never shared across
//! concurrently running suites. Parallel suites each construct their own
//! runner (own store handle, own recording session, own overlays), which
//! preserves isolation without locks.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::{HarnessSettings, Mode};
use crate::error::{FixtureError, HarnessError, Result};
use crate::exec::{
    format_command, split_command, CommandContext, CommandDispatcher, CommandResult,
    ExecutionDriver, RetryController, RetryPolicy,
};
use crate::fixture::{FixtureStore, Profile};
use crate::intercept::{
    HttpTransport, InterceptSession, LiveTransport, PlaybackTransport, RecordingSession,
    RecordingTransport,
};

use super::env::EnvOverlay;

/// Per-test setup options.
#[derive(Debug, Clone, Copy, Default)]
pub struct TestOptions {
    /// The test only makes sense against a live service; in playback it
    /// gets an empty scope list instead of a missing-fixture error, and
    /// any HTTP call it makes still fails loudly.
    pub live_only: bool,
}

/// One-time resources a suite needs on the live service, shared by all
/// of its tests (e.g. a resource group the commands operate inside).
///
/// `create` runs at suite setup and `destroy` at suite teardown, only
/// when the suite actually reaches the network. Playback runs have the
/// preconditions' effects baked into the recordings and skip both.
#[async_trait]
pub trait SuitePreconditions: Send + Sync {
    /// Creates the shared resources before the first test runs.
    async fn create(&self, transport: Arc<dyn HttpTransport>) -> Result<()>;

    /// Deletes the shared resources after the last test.
    async fn destroy(&self, transport: Arc<dyn HttpTransport>) -> Result<()>;
}

/// Orchestrates one suite's lifecycle.
pub struct SuiteRunner {
    suite: String,
    settings: HarnessSettings,
    store: FixtureStore,
    dispatcher: Arc<dyn CommandDispatcher>,
    recording: Option<Arc<RecordingSession>>,
    preconditions: Option<Arc<dyn SuitePreconditions>>,
}

impl SuiteRunner {
    /// Creates a runner for a suite, discovering its fixture registry.
    ///
    /// # Errors
    ///
    /// Returns an error if settings are invalid or the fixture root
    /// cannot be scanned.
    pub fn new(
        suite: impl Into<String>,
        dispatcher: Arc<dyn CommandDispatcher>,
        settings: HarnessSettings,
    ) -> Result<Self> {
        settings.validate()?;
        let suite = suite.into();
        let store = FixtureStore::discover(&settings.fixture_root)?;
        Ok(Self {
            suite,
            settings,
            store,
            dispatcher,
            recording: None,
            preconditions: None,
        })
    }

    /// Registers one-time live-service preconditions for this suite.
    #[must_use]
    pub fn with_preconditions(mut self, preconditions: Arc<dyn SuitePreconditions>) -> Self {
        self.preconditions = Some(preconditions);
        self
    }

    /// Returns the execution mode of this suite.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.settings.mode
    }

    /// Returns the suite name.
    #[must_use]
    pub fn suite(&self) -> &str {
        &self.suite
    }

    /// One-time suite setup: opens the recording session in record mode
    /// and creates any registered live-service preconditions.
    ///
    /// # Errors
    ///
    /// Returns an error if the preconditions fail to create.
    pub async fn setup_suite(&mut self) -> Result<()> {
        info!(
            "Suite '{}' starting in {} mode ({} fixture(s) discovered)",
            self.suite,
            self.settings.mode,
            self.store.len()
        );
        if self.settings.mode.is_record() {
            self.recording = Some(Arc::new(RecordingSession::new(
                &self.suite,
                self.settings.relax_recorded_bodies,
            )));
        }
        if self.settings.mode.is_live() {
            if let Some(preconditions) = &self.preconditions {
                debug!("Creating suite preconditions for '{}'", self.suite);
                preconditions.create(self.live_transport()?).await?;
            }
        }
        Ok(())
    }

    fn live_transport(&self) -> Result<Arc<dyn HttpTransport>> {
        Ok(Arc::new(LiveTransport::new(
            self.settings.request_timeout_secs,
        )?))
    }

    /// Per-test setup with default options.
    ///
    /// # Errors
    ///
    /// See [`Self::setup_test_with`].
    pub fn setup_test(&self, test_title: &str) -> Result<TestSession> {
        self.setup_test_with(test_title, TestOptions::default())
    }

    /// Per-test setup: activates the fixture (playback), or wires the
    /// live/recording transport.
    ///
    /// # Errors
    ///
    /// In playback mode, a missing fixture for a test not marked
    /// `live_only` fails loudly: it signals the recording is stale
    /// relative to the test code. Malformed fixtures are always hard
    /// errors.
    pub fn setup_test_with(&self, test_title: &str, options: TestOptions) -> Result<TestSession> {
        debug!("Setting up test '{}' ({:?})", test_title, self.settings.mode);
        let controller = RetryController::new(
            ExecutionDriver::new(Arc::clone(&self.dispatcher)),
            RetryPolicy::new(self.settings.retry_count),
            self.settings.mode,
        );

        match self.settings.mode {
            Mode::Playback => self.setup_playback_test(test_title, options, controller),
            Mode::Record => {
                let recorder = self.recording.as_ref().ok_or_else(|| {
                    HarnessError::internal("setup_suite must run before setup_test in record mode")
                })?;
                let live = LiveTransport::new(self.settings.request_timeout_secs)?;
                let transport: Arc<dyn HttpTransport> = Arc::new(RecordingTransport::new(
                    Arc::new(live),
                    Arc::clone(recorder),
                ));
                Ok(TestSession {
                    name: test_title.to_string(),
                    mode: Mode::Record,
                    transport,
                    playback: None,
                    recorder: Some(Arc::clone(recorder)),
                    profile: None,
                    env: EnvOverlay::layered(&self.settings.seed_env, &BTreeMap::new()),
                    controller,
                })
            }
            Mode::Live => {
                let transport: Arc<dyn HttpTransport> =
                    Arc::new(LiveTransport::new(self.settings.request_timeout_secs)?);
                Ok(TestSession {
                    name: test_title.to_string(),
                    mode: Mode::Live,
                    transport,
                    playback: None,
                    recorder: None,
                    profile: None,
                    env: EnvOverlay::layered(&self.settings.seed_env, &BTreeMap::new()),
                    controller,
                })
            }
        }
    }

    fn setup_playback_test(
        &self,
        test_title: &str,
        options: TestOptions,
        controller: RetryController,
    ) -> Result<TestSession> {
        let fixture = self.store.load(&self.suite, test_title)?;

        let (session, profile, env) = match fixture {
            Some(fixture) => {
                let session = InterceptSession::from_fixture(&fixture)?;
                let env = EnvOverlay::layered(&self.settings.seed_env, &fixture.env_overrides);
                (session, Some(fixture.profile), env)
            }
            None if options.live_only => (
                InterceptSession::empty(format!("{}/{}", self.suite, test_title)),
                None,
                EnvOverlay::layered(&self.settings.seed_env, &BTreeMap::new()),
            ),
            None => {
                return Err(HarnessError::Fixture(FixtureError::NotFound {
                    suite: self.suite.clone(),
                    test: test_title.to_string(),
                    path: self.store.expected_path(&self.suite, test_title),
                }));
            }
        };

        let playback = Arc::new(PlaybackTransport::new(session));
        let transport: Arc<dyn HttpTransport> = Arc::clone(&playback) as Arc<dyn HttpTransport>;
        Ok(TestSession {
            name: test_title.to_string(),
            mode: Mode::Playback,
            transport,
            playback: Some(playback),
            recorder: None,
            profile,
            env,
            controller,
        })
    }

    /// Per-test teardown: asserts full scope consumption in playback.
    ///
    /// # Errors
    ///
    /// Returns an error listing every scope the test never matched.
    pub fn teardown_test(&self, session: TestSession) -> Result<()> {
        debug!("Tearing down test '{}'", session.name);
        if let Some(playback) = &session.playback {
            playback.verify_consumed()?;
        }
        Ok(())
    }

    /// Suite teardown: flushes captured fixtures in record mode and
    /// deletes the preconditions created in [`Self::setup_suite`].
    ///
    /// Returns the paths of fixture files written.
    ///
    /// # Errors
    ///
    /// Returns an error if captured fixtures cannot be written or the
    /// preconditions fail to delete.
    pub async fn teardown_suite(self) -> Result<Vec<PathBuf>> {
        let written = if let Some(recorder) = &self.recording {
            let profile = Profile::synthetic(format!("{} recording", self.suite));
            let written = recorder.flush(self.store.root(), &profile)?;
            info!(
                "Suite '{}' recorded {} fixture(s)",
                self.suite,
                written.len()
            );
            written
        } else {
            Vec::new()
        };

        if self.settings.mode.is_live() {
            if let Some(preconditions) = &self.preconditions {
                debug!("Destroying suite preconditions for '{}'", self.suite);
                preconditions.destroy(self.live_transport()?).await?;
            }
        }

        info!("Suite '{}' finished", self.suite);
        Ok(written)
    }
}

/// Transient per-test state handed to the test body.
pub struct TestSession {
    name: String,
    mode: Mode,
    transport: Arc<dyn HttpTransport>,
    playback: Option<Arc<PlaybackTransport>>,
    recorder: Option<Arc<RecordingSession>>,
    profile: Option<Profile>,
    env: EnvOverlay,
    controller: RetryController,
}

impl TestSession {
    /// Returns the test title this session was set up for.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the session's execution mode.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns the synthetic profile active for this test, if any.
    #[must_use]
    pub const fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    /// Returns the environment overlay for this test.
    #[must_use]
    pub const fn env(&self) -> &EnvOverlay {
        &self.env
    }

    /// Runs a command given as a printf-style format string.
    ///
    /// # Errors
    ///
    /// Returns format-arity errors and harness-integrity faults; all
    /// other failures arrive as a failing [`CommandResult`].
    pub async fn run(&self, fmt: &str, args: &[&str]) -> Result<CommandResult> {
        let command = format_command(fmt, args)?;
        self.run_argv(split_command(&command)).await
    }

    /// Runs a command given as a pre-split argument vector (for arguments
    /// containing literal spaces).
    ///
    /// # Errors
    ///
    /// Returns harness-integrity faults; all other failures arrive as a
    /// failing [`CommandResult`].
    pub async fn run_argv(&self, argv: Vec<String>) -> Result<CommandResult> {
        self.controller
            .execute_command(|_attempt| {
                if let Some(recorder) = &self.recorder {
                    recorder.begin_attempt(&self.name)?;
                }
                Ok(CommandContext {
                    argv: argv.clone(),
                    transport: Arc::clone(&self.transport),
                    profile: self.profile.clone(),
                    env: self.env.clone(),
                })
            })
            .await
    }

    /// Waits for out-of-band propagation (DNS, certificate rollout)
    /// between dependent setup steps. Skipped entirely in playback, where
    /// recorded responses are already final.
    pub async fn pause(&self, duration: Duration) {
        if self.mode.is_playback() {
            debug!("Skipping {duration:?} pause in playback");
            return;
        }
        tokio::time::sleep(duration).await;
    }

    /// Number of scopes consumed so far (playback only).
    ///
    /// # Errors
    ///
    /// Returns an error if the interceptor state is unavailable.
    pub fn scopes_consumed(&self) -> Result<usize> {
        self.playback
            .as_ref()
            .map_or(Ok(0), |playback| playback.consumed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InterceptError;
    use crate::exec::CommandOutput;
    use crate::fixture::{
        fixture_key, BodyMatcher, FixtureFile, RecordedExchange, RecordedResponse, FIXTURE_VERSION,
    };
    use crate::intercept::HttpRequest;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::path::Path;
    use std::sync::atomic::{AtomicU32, Ordering};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Minimal cloud CLI standing in for the tool under test: `thing set
    /// <name> --tags <k=v> --json` issues a GET then a PUT through the
    /// injected transport and prints the PUT response body.
    struct FakeCloudCli;

    #[async_trait]
    impl CommandDispatcher for FakeCloudCli {
        async fn dispatch(&self, ctx: CommandContext) -> crate::error::Result<CommandOutput> {
            let argv: Vec<&str> = ctx.argv.iter().map(String::as_str).collect();
            let base = ctx
                .env
                .var("CLOUD_API_BASE")
                .unwrap_or_else(|| String::from("https://cloud.example.com"));

            match argv.as_slice() {
                ["thing", "set", name, "--tags", tags, "--json"] => {
                    let get = ctx
                        .transport
                        .send(HttpRequest::new(
                            "GET",
                            format!("{base}/things/{name}?api-version=2014-04-01"),
                        ))
                        .await?;
                    if !get.is_success() {
                        return Ok(CommandOutput {
                            exit_code: 1,
                            stdout: String::new(),
                            stderr: format!("error: service returned {}", get.status),
                        });
                    }

                    let (key, value) = tags.split_once('=').unwrap_or((*tags, ""));
                    let body = json!({"tags": {key: value}}).to_string();
                    let put = ctx
                        .transport
                        .send(
                            HttpRequest::new(
                                "PUT",
                                format!("{base}/things/{name}?api-version=2014-04-01"),
                            )
                            .with_body(body),
                        )
                        .await?;
                    Ok(CommandOutput {
                        exit_code: 0,
                        stdout: put.body,
                        stderr: String::new(),
                    })
                }
                _ => Ok(CommandOutput {
                    exit_code: 1,
                    stdout: String::new(),
                    stderr: String::from("error: unrecognized command"),
                }),
            }
        }
    }

    fn write_fixture(
        root: &Path,
        suite: &str,
        test: &str,
        env_overrides: BTreeMap<String, String>,
        exchanges: Vec<RecordedExchange>,
    ) {
        let file = FixtureFile {
            version: FIXTURE_VERSION,
            profile: Profile::synthetic("Playback Sub"),
            env_overrides,
            exchanges: vec![exchanges],
            recorded_at: None,
        };
        let dir = root.join(suite);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join(format!("{}.json", fixture_key(test))),
            serde_json::to_string_pretty(&file).unwrap(),
        )
        .unwrap();
    }

    fn tag_update_exchanges() -> Vec<RecordedExchange> {
        vec![
            RecordedExchange::new(
                "GET",
                "/things/foo?api-version=2014-04-01",
                RecordedResponse::json(
                    200,
                    &json!({"name": "foo", "properties": {"provisioningState": "Succeeded"}}),
                ),
            ),
            RecordedExchange::new(
                "PUT",
                "/things/foo?api-version=2014-04-01",
                RecordedResponse::json(200, &json!({"name": "foo", "tags": {"a": "1"}})),
            )
            .with_body(BodyMatcher::Json(json!({"tags": {"a": "1"}}))),
        ]
    }

    async fn playback_runner(root: &Path) -> SuiteRunner {
        let settings = HarnessSettings::new(root).with_mode(Mode::Playback);
        let mut runner = SuiteRunner::new("things", Arc::new(FakeCloudCli), settings).unwrap();
        runner.setup_suite().await.unwrap();
        runner
    }

    #[tokio::test]
    async fn test_playback_tag_update_flow() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(
            dir.path(),
            "things",
            "thing set updates tags",
            BTreeMap::new(),
            tag_update_exchanges(),
        );

        let runner = playback_runner(dir.path()).await;
        let session = runner.setup_test("thing set updates tags").unwrap();
        assert!(session.profile().is_some());

        let result = session
            .run("thing set %s --tags %s --json", &["foo", "a=1"])
            .await
            .unwrap();
        assert_eq!(result.exit_status, 0);
        assert_eq!(result.json().unwrap()["tags"]["a"], "1");
        assert_eq!(session.scopes_consumed().unwrap(), 2);

        runner.teardown_test(session).unwrap();
        runner.teardown_suite().await.unwrap();
    }

    #[tokio::test]
    async fn test_playback_is_deterministic_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(
            dir.path(),
            "things",
            "thing set updates tags",
            BTreeMap::new(),
            tag_update_exchanges(),
        );
        let runner = playback_runner(dir.path()).await;

        let mut outputs = Vec::new();
        for _ in 0..2 {
            let session = runner.setup_test("thing set updates tags").unwrap();
            let result = session
                .run("thing set %s --tags %s --json", &["foo", "a=1"])
                .await
                .unwrap();
            runner.teardown_test(session).unwrap();
            outputs.push(result);
        }
        assert_eq!(outputs[0], outputs[1]);
    }

    #[tokio::test]
    async fn test_missing_fixture_fails_loudly() {
        let dir = tempfile::tempdir().unwrap();
        let runner = playback_runner(dir.path()).await;

        let result = runner.setup_test("never recorded");
        assert!(matches!(
            result,
            Err(HarnessError::Fixture(FixtureError::NotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_live_only_test_gets_empty_scopes() {
        let dir = tempfile::tempdir().unwrap();
        let runner = playback_runner(dir.path()).await;

        let session = runner
            .setup_test_with("live only check", TestOptions { live_only: true })
            .unwrap();
        // Any call the test does make still fails loudly.
        let result = session.run("thing set %s --tags %s --json", &["foo", "a=1"]).await;
        assert!(matches!(
            result,
            Err(HarnessError::Intercept(InterceptError::UnexpectedRequest { .. }))
        ));
    }

    #[tokio::test]
    async fn test_unexpected_extra_call_fails_with_diagnostic() {
        let dir = tempfile::tempdir().unwrap();
        // Only the GET is recorded; the command's PUT has no scope.
        write_fixture(
            dir.path(),
            "things",
            "stale recording",
            BTreeMap::new(),
            vec![tag_update_exchanges().remove(0)],
        );
        let runner = playback_runner(dir.path()).await;
        let session = runner.setup_test("stale recording").unwrap();

        let result = session
            .run("thing set %s --tags %s --json", &["foo", "a=1"])
            .await;
        match result {
            Err(HarnessError::Intercept(InterceptError::UnexpectedRequest {
                method, consumed, ..
            })) => {
                assert_eq!(method, "PUT");
                assert_eq!(consumed, 1);
            }
            other => panic!("expected UnexpectedRequest, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unconsumed_scopes_fail_test_teardown() {
        let dir = tempfile::tempdir().unwrap();
        let mut exchanges = tag_update_exchanges();
        exchanges.push(RecordedExchange::new(
            "DELETE",
            "/things/foo?api-version=2014-04-01",
            RecordedResponse::json(200, &json!({})),
        ));
        write_fixture(
            dir.path(),
            "things",
            "over recorded",
            BTreeMap::new(),
            exchanges,
        );
        let runner = playback_runner(dir.path()).await;
        let session = runner.setup_test("over recorded").unwrap();

        session
            .run("thing set %s --tags %s --json", &["foo", "a=1"])
            .await
            .unwrap();

        let err = runner.teardown_test(session).unwrap_err();
        assert!(err.to_string().contains("DELETE /things/foo"));
    }

    #[tokio::test]
    async fn test_env_overrides_do_not_leak_between_tests() {
        let marker = "CLIREPLAY_MARKER_REGION_4471";
        let dir = tempfile::tempdir().unwrap();
        write_fixture(
            dir.path(),
            "things",
            "test a",
            BTreeMap::from([(marker.to_string(), String::from("westus"))]),
            vec![],
        );
        write_fixture(dir.path(), "things", "test b", BTreeMap::new(), vec![]);
        let runner = playback_runner(dir.path()).await;

        let session_a = runner.setup_test("test a").unwrap();
        assert_eq!(session_a.env().var(marker).as_deref(), Some("westus"));
        runner.teardown_test(session_a).unwrap();

        let session_b = runner.setup_test("test b").unwrap();
        assert!(session_b.env().var(marker).is_none());
        runner.teardown_test(session_b).unwrap();
    }

    #[tokio::test]
    async fn test_command_level_error_is_a_result_not_a_fault() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "things", "bad args", BTreeMap::new(), vec![]);
        let runner = playback_runner(dir.path()).await;
        let session = runner.setup_test("bad args").unwrap();

        let result = session.run("thing frobnicate", &[]).await.unwrap();
        assert_eq!(result.exit_status, 1);
        assert!(result.error_contains("unrecognized command"));

        runner.teardown_test(session).unwrap();
    }

    #[tokio::test]
    async fn test_record_mode_captures_and_replays() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/things/foo"))
            .and(query_param("api-version", "2014-04-01"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                json!({"name": "foo", "properties": {"provisioningState": "Succeeded"}})
                    .to_string(),
            ))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/things/foo"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(json!({"name": "foo", "tags": {"a": "1"}}).to_string()),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let settings = HarnessSettings::new(dir.path())
            .with_mode(Mode::Record)
            .with_seed_var("CLOUD_API_BASE", server.uri());
        let mut runner = SuiteRunner::new("things", Arc::new(FakeCloudCli), settings).unwrap();
        runner.setup_suite().await.unwrap();

        let session = runner.setup_test("thing set updates tags").unwrap();
        let result = session
            .run("thing set %s --tags %s --json", &["foo", "a=1"])
            .await
            .unwrap();
        assert!(result.success());
        runner.teardown_test(session).unwrap();

        let written = runner.teardown_suite().await.unwrap();
        assert_eq!(written.len(), 1);

        // The flushed recording replays the same command without the
        // server.
        let settings = HarnessSettings::new(dir.path()).with_mode(Mode::Playback);
        let mut replay = SuiteRunner::new("things", Arc::new(FakeCloudCli), settings).unwrap();
        replay.setup_suite().await.unwrap();
        let session = replay.setup_test("thing set updates tags").unwrap();
        // Recording keeps only the path-and-query, so replay matches even
        // though the base URL now differs from the mock server's.
        let result = session
            .run("thing set %s --tags %s --json", &["foo", "a=1"])
            .await
            .unwrap();
        assert_eq!(result.json().unwrap()["tags"]["a"], "1");
        replay.teardown_test(session).unwrap();
    }

    struct CountingPreconditions {
        created: AtomicU32,
        destroyed: AtomicU32,
    }

    #[async_trait]
    impl SuitePreconditions for CountingPreconditions {
        async fn create(&self, _transport: Arc<dyn HttpTransport>) -> crate::error::Result<()> {
            self.created.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn destroy(&self, _transport: Arc<dyn HttpTransport>) -> crate::error::Result<()> {
            self.destroyed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_suite_preconditions_run_only_in_live_modes() {
        let dir = tempfile::tempdir().unwrap();

        // Playback has the preconditions' effects baked into the
        // recordings; neither hook runs.
        let counters = Arc::new(CountingPreconditions {
            created: AtomicU32::new(0),
            destroyed: AtomicU32::new(0),
        });
        let settings = HarnessSettings::new(dir.path()).with_mode(Mode::Playback);
        let mut runner = SuiteRunner::new("things", Arc::new(FakeCloudCli), settings)
            .unwrap()
            .with_preconditions(Arc::clone(&counters) as Arc<dyn SuitePreconditions>);
        runner.setup_suite().await.unwrap();
        runner.teardown_suite().await.unwrap();
        assert_eq!(counters.created.load(Ordering::SeqCst), 0);
        assert_eq!(counters.destroyed.load(Ordering::SeqCst), 0);

        // Live mode creates the shared resources once at setup and
        // deletes them once at teardown.
        let counters = Arc::new(CountingPreconditions {
            created: AtomicU32::new(0),
            destroyed: AtomicU32::new(0),
        });
        let settings = HarnessSettings::new(dir.path()).with_mode(Mode::Live);
        let mut runner = SuiteRunner::new("things", Arc::new(FakeCloudCli), settings)
            .unwrap()
            .with_preconditions(Arc::clone(&counters) as Arc<dyn SuitePreconditions>);
        runner.setup_suite().await.unwrap();
        assert_eq!(counters.created.load(Ordering::SeqCst), 1);
        assert_eq!(counters.destroyed.load(Ordering::SeqCst), 0);
        runner.teardown_suite().await.unwrap();
        assert_eq!(counters.created.load(Ordering::SeqCst), 1);
        assert_eq!(counters.destroyed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_pause_is_skipped_in_playback() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "things", "paused", BTreeMap::new(), vec![]);
        let runner = playback_runner(dir.path()).await;
        let session = runner.setup_test("paused").unwrap();

        let started = std::time::Instant::now();
        session.pause(Duration::from_secs(30)).await;
        assert!(started.elapsed() < Duration::from_secs(1));

        runner.teardown_test(session).unwrap();
    }
}
