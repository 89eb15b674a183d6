//! Execution driver: one command invocation, one structured result.
//!
//! The command under test is an external collaborator reached through the
//! [`CommandDispatcher`] trait: argv in, captured output out. The driver
//! guarantees exactly one [`CommandResult`] per invocation: dispatcher
//! errors and panics are converted into failing results instead of
//! escaping and aborting the whole test run. Only harness-integrity
//! faults (fixture/interception errors) propagate as errors.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::error::{ExecError, HarnessError, Result};
use crate::fixture::Profile;
use crate::intercept::HttpTransport;
use crate::suite::EnvOverlay;

/// Structured outcome of one command-line invocation under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Process exit code: 0 success, 1 for anticipated command-level
    /// errors.
    pub exit_status: i32,
    /// Captured standard output.
    pub text: String,
    /// Captured standard error.
    pub error_text: String,
}

impl CommandResult {
    /// Returns true if the command exited with status 0.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_status == 0
    }

    /// Parses the captured stdout as JSON (for commands run with
    /// `--json`).
    ///
    /// # Errors
    ///
    /// Returns an error if stdout is not valid JSON.
    pub fn json(&self) -> Result<serde_json::Value> {
        serde_json::from_str(&self.text).map_err(|e| {
            HarnessError::Exec(ExecError::OutputNotJson {
                message: e.to_string(),
            })
        })
    }

    /// Checks whether stdout contains a substring.
    #[must_use]
    pub fn text_contains(&self, pattern: &str) -> bool {
        self.text.contains(pattern)
    }

    /// Checks whether stderr contains a substring.
    #[must_use]
    pub fn error_contains(&self, pattern: &str) -> bool {
        self.error_text.contains(pattern)
    }
}

/// What a dispatcher produces for one successful dispatch (the command
/// itself may still have failed, via a non-zero exit code).
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// Command exit code.
    pub exit_code: i32,
    /// Text the command printed to stdout.
    pub stdout: String,
    /// Text the command printed to stderr.
    pub stderr: String,
}

/// Everything one invocation of the command under test may touch.
///
/// The context carries the harness-controlled transport, environment
/// overlay, and synthetic profile, so the command never reaches
/// process-wide state.
#[derive(Clone)]
pub struct CommandContext {
    /// Argument vector for the invocation.
    pub argv: Vec<String>,
    /// Outbound HTTP capability.
    pub transport: Arc<dyn HttpTransport>,
    /// Synthetic account profile (playback mode).
    pub profile: Option<Profile>,
    /// Environment overlay for this test.
    pub env: EnvOverlay,
}

impl std::fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandContext")
            .field("argv", &self.argv)
            .field("profile", &self.profile)
            .field("env", &self.env)
            .finish_non_exhaustive()
    }
}

/// Entry point of the command-line tool under test.
#[async_trait]
pub trait CommandDispatcher: Send + Sync {
    /// Parses and runs one argv, returning captured output.
    ///
    /// Errors returned here are treated as process-level failures and
    /// folded into a failing [`CommandResult`] by the driver, except for
    /// harness-integrity faults which propagate.
    async fn dispatch(&self, ctx: CommandContext) -> Result<CommandOutput>;
}

/// One driven execution: the result plus its retry classification.
#[derive(Debug)]
pub struct Execution {
    /// The result handed back to the test.
    pub result: CommandResult,
    /// Whether the failure (if any) is transient and retry-eligible.
    pub retryable: bool,
}

/// Substitutes printf-style `%s` placeholders positionally.
///
/// # Errors
///
/// Returns an error when the number of placeholders and arguments differ.
pub fn format_command(fmt: &str, args: &[&str]) -> Result<String> {
    let expected = fmt.matches("%s").count();
    if expected != args.len() {
        return Err(HarnessError::Exec(ExecError::FormatArity {
            expected,
            provided: args.len(),
        }));
    }

    let mut out = String::with_capacity(fmt.len());
    let mut rest = fmt;
    for arg in args {
        let Some(idx) = rest.find("%s") else { break };
        out.push_str(&rest[..idx]);
        out.push_str(arg);
        rest = &rest[idx + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Splits a command line into an argument vector on whitespace.
///
/// Callers needing literal spaces inside an argument must pass a
/// pre-split argv instead of a format string.
#[must_use]
pub fn split_command(command: &str) -> Vec<String> {
    command.split_whitespace().map(str::to_string).collect()
}

/// Runs command invocations through a dispatcher without letting them
/// affect the host process.
#[derive(Clone)]
pub struct ExecutionDriver {
    dispatcher: Arc<dyn CommandDispatcher>,
}

impl ExecutionDriver {
    /// Creates a driver around a dispatcher.
    #[must_use]
    pub fn new(dispatcher: Arc<dyn CommandDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Executes one invocation.
    ///
    /// Exactly one [`Execution`] is produced per call unless the failure
    /// is a harness-integrity fault, which aborts the test instead. The
    /// dispatch runs on its own task so a panic inside the command is
    /// contained and converted into a failing result.
    ///
    /// # Errors
    ///
    /// Returns fixture/interception integrity faults only.
    pub async fn execute(&self, ctx: CommandContext) -> Result<Execution> {
        debug!("Executing command: {:?}", ctx.argv);
        let dispatcher = Arc::clone(&self.dispatcher);
        let handle = tokio::spawn(async move { dispatcher.dispatch(ctx).await });

        match handle.await {
            Ok(Ok(output)) => Ok(Execution {
                result: CommandResult {
                    exit_status: output.exit_code,
                    text: output.stdout,
                    error_text: output.stderr,
                },
                retryable: false,
            }),
            Ok(Err(e)) if e.is_integrity() => Err(e),
            Ok(Err(e)) => Ok(Execution {
                retryable: e.is_retryable(),
                result: CommandResult {
                    exit_status: 1,
                    text: String::new(),
                    error_text: e.to_string(),
                },
            }),
            Err(join_error) => {
                if !join_error.is_panic() {
                    return Err(HarnessError::internal(format!(
                        "command task failed: {join_error}"
                    )));
                }
                let payload = join_error.into_panic();
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| String::from("non-string panic payload"));
                let error = ExecError::Panicked { message };
                Ok(Execution {
                    result: CommandResult {
                        exit_status: 1,
                        text: String::new(),
                        error_text: error.to_string(),
                    },
                    retryable: true,
                })
            }
        }
    }
}
