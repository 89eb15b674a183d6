//! Interceptor session: ordered scope consumption.
//!
//! One session is created per test and destroyed at its teardown;
//! back-to-back tests never see each other's scopes. The session flattens
//! the fixture's exchange groups into one ordered list and advances a
//! cursor as requests match. Requests must arrive strictly in recorded
//! order: an out-of-order request fails even if it would match some later
//! scope, and scopes left unconsumed at teardown fail the test.

use tracing::{debug, warn};

use crate::error::{InterceptError, Result};
use crate::fixture::Fixture;

use super::scope::{HttpRequest, HttpResponse, Scope};

/// Per-test interception state.
#[derive(Debug)]
pub struct InterceptSession {
    /// All scopes in recorded order, groups flattened.
    scopes: Vec<Scope>,
    /// Number of scopes consumed so far.
    cursor: usize,
    /// Fixture label for diagnostics.
    fixture_label: String,
}

impl InterceptSession {
    /// Creates an empty session (used for live-only tests in playback:
    /// any request fails loudly).
    #[must_use]
    pub fn empty(fixture_label: impl Into<String>) -> Self {
        Self {
            scopes: Vec::new(),
            cursor: 0,
            fixture_label: fixture_label.into(),
        }
    }

    /// Compiles a fixture's exchange groups into an ordered session.
    ///
    /// # Errors
    ///
    /// Returns an error if any recorded exchange fails to compile.
    pub fn from_fixture(fixture: &Fixture) -> Result<Self> {
        let label = fixture.label();
        let mut scopes = Vec::with_capacity(fixture.exchange_count());
        for group in &fixture.exchanges {
            for exchange in group {
                scopes.push(Scope::compile(exchange, &label)?);
            }
        }
        debug!(
            "Installed {} scope(s) for fixture '{label}'",
            scopes.len()
        );
        Ok(Self {
            scopes,
            cursor: 0,
            fixture_label: label,
        })
    }

    /// Matches the next request against the scope at the cursor.
    ///
    /// # Errors
    ///
    /// Returns an integrity error when no scopes remain or the request
    /// does not match the next recorded scope.
    pub fn match_next(&mut self, request: &HttpRequest) -> Result<HttpResponse> {
        let Some(scope) = self.scopes.get(self.cursor) else {
            warn!(
                "Unexpected request {} {} after fixture '{}' was exhausted",
                request.method, request.url, self.fixture_label
            );
            return Err(InterceptError::UnexpectedRequest {
                method: request.method.clone(),
                url: request.url.clone(),
                fixture: self.fixture_label.clone(),
                consumed: self.cursor,
            }
            .into());
        };

        if !scope.matches(request) {
            return Err(InterceptError::ScopeMismatch {
                method: request.method.clone(),
                url: request.url.clone(),
                expected: scope.describe().to_string(),
                fixture: self.fixture_label.clone(),
                position: self.cursor,
            }
            .into());
        }

        let response = scope.response();
        debug!(
            "Scope {} matched {} {} -> {}",
            self.cursor, request.method, request.url, response.status
        );
        self.cursor += 1;
        Ok(response)
    }

    /// Verifies every scope was consumed.
    ///
    /// An unmatched scope at teardown indicates either a non-deterministic
    /// code path or a behavioral change in the code under test; it must
    /// surface as a failure, never be ignored.
    ///
    /// # Errors
    ///
    /// Returns an error listing every unmatched scope in recorded order.
    pub fn verify_consumed(&self) -> Result<()> {
        if self.cursor >= self.scopes.len() {
            return Ok(());
        }
        let remaining: Vec<String> = self.scopes[self.cursor..]
            .iter()
            .map(|s| s.describe().to_string())
            .collect();
        Err(InterceptError::UnconsumedScopes {
            remaining,
            fixture: self.fixture_label.clone(),
        }
        .into())
    }

    /// Number of scopes consumed so far.
    #[must_use]
    pub const fn consumed(&self) -> usize {
        self.cursor
    }

    /// Number of scopes not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.scopes.len() - self.cursor
    }

    /// Fixture label for diagnostics.
    #[must_use]
    pub fn fixture_label(&self) -> &str {
        &self.fixture_label
    }
}
