//! Retry controller.
//!
//! Wraps the execution driver to re-issue a whole command a bounded number
//! of times when it fails for transient reasons (network errors, panics),
//! never for assertion or command-level failures. Retries are immediate;
//! record mode runs rarely, driven by a human against a real service. In
//! playback mode retries are disabled: the fixture provides a fixed,
//! already-successful recorded sequence, and retrying against consumed
//! scopes would fail on the wrong diagnostic.

use tracing::debug;

use crate::config::Mode;
use crate::error::Result;

use super::driver::{CommandContext, CommandResult, ExecutionDriver};

/// Bounded retry policy for whole-command execution.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum total invocations (not additional retries).
    pub attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { attempts: 5 }
    }
}

impl RetryPolicy {
    /// Creates a policy with the given total attempt bound.
    #[must_use]
    pub const fn new(attempts: u32) -> Self {
        Self { attempts }
    }

    /// Effective attempt bound for a mode: always 1 in playback, at
    /// least 1 otherwise.
    #[must_use]
    pub const fn effective_attempts(self, mode: Mode) -> u32 {
        if mode.is_playback() {
            1
        } else if self.attempts == 0 {
            1
        } else {
            self.attempts
        }
    }
}

/// Re-issues commands through the driver on transient failures.
#[derive(Clone)]
pub struct RetryController {
    driver: ExecutionDriver,
    policy: RetryPolicy,
    mode: Mode,
}

impl RetryController {
    /// Creates a controller for the given mode.
    #[must_use]
    pub const fn new(driver: ExecutionDriver, policy: RetryPolicy, mode: Mode) -> Self {
        Self {
            driver,
            policy,
            mode,
        }
    }

    /// Executes a command with bounded retries.
    ///
    /// `prepare` is invoked once per attempt (1-based) to build a fresh
    /// context; the suite runner uses it to open a new recording group per
    /// attempt. The caller always receives a [`CommandResult`]: after
    /// exhausting retries, the last observed failing result is returned,
    /// never an internal error.
    ///
    /// # Errors
    ///
    /// Returns harness-integrity faults from the driver, or an error from
    /// `prepare`.
    pub async fn execute_command<F>(&self, mut prepare: F) -> Result<CommandResult>
    where
        F: FnMut(u32) -> Result<CommandContext> + Send,
    {
        let attempts = self.policy.effective_attempts(self.mode);
        let mut last: Option<CommandResult> = None;

        for attempt in 1..=attempts {
            if attempt > 1 {
                debug!("Retry attempt {attempt} of {attempts}");
            }
            let ctx = prepare(attempt)?;
            let execution = self.driver.execute(ctx).await?;
            if !execution.retryable {
                return Ok(execution.result);
            }
            last = Some(execution.result);
        }

        last.ok_or_else(|| crate::error::HarnessError::internal("no command attempts executed"))
    }
}
