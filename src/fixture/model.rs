//! Fixture data model.
//!
//! Fixture files are versioned JSON documents. Each holds the synthetic
//! account profile active during the test, environment overrides to seed,
//! and the ordered exchange groups to replay. Groups are lists of lists:
//! one inner list per expected sequential call pattern, because some
//! recordings represent multiple call sequences across retried top-level
//! attempts. Everything here is immutable after load; playback consumes
//! exchanges through cursors held by the interceptor, never by mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Supported fixture file format version.
pub const FIXTURE_VERSION: u32 = 1;

/// Synthetic identity/account descriptor used while a fixture plays back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Account identifier.
    pub account_id: String,
    /// Human-readable account name.
    pub display_name: String,
    /// Authenticated principal descriptor.
    pub principal: String,
    /// Tenant/directory identifier.
    pub tenant_id: String,
    /// Whether the account is enabled.
    pub enabled: bool,
    /// Capability providers already registered on the account.
    #[serde(default)]
    pub registered_providers: Vec<String>,
    /// Whether this is the default account.
    #[serde(default)]
    pub default_account: bool,
}

impl Profile {
    /// Creates a synthetic profile with fresh identifiers, suitable for
    /// playback without any real credentials.
    #[must_use]
    pub fn synthetic(display_name: impl Into<String>) -> Self {
        Self {
            account_id: Uuid::new_v4().to_string(),
            display_name: display_name.into(),
            principal: String::from("user@example.com"),
            tenant_id: Uuid::new_v4().to_string(),
            enabled: true,
            registered_providers: Vec::new(),
            default_account: true,
        }
    }

    /// Adds a registered capability provider.
    #[must_use]
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.registered_providers.push(provider.into());
        self
    }
}

/// URL matcher for a recorded exchange.
///
/// Exact matching compares the encoded path-and-query byte-for-byte as
/// recorded, including percent-encoded slashes inside resource IDs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathMatcher {
    /// Byte-for-byte match on the encoded path and query.
    Exact(String),
    /// Anchored regular-expression match on the encoded path and query.
    Pattern(String),
}

impl PathMatcher {
    /// Returns a short human-readable description for diagnostics.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Exact(path) => path.clone(),
            Self::Pattern(pattern) => format!("~{pattern}"),
        }
    }
}

/// Request-body matcher for a recorded exchange.
///
/// Most recordings relax the body to a wildcard because bodies legitimately
/// vary run-to-run (timestamps, generated names); method and URL order
/// still pin the call sequence.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyMatcher {
    /// Matches any body, including none.
    #[default]
    Any,
    /// Matches the exact body text.
    Exact(String),
    /// Matches a body that parses to this exact JSON value.
    Json(serde_json::Value),
}

impl BodyMatcher {
    /// Checks whether the given request body satisfies this matcher.
    #[must_use]
    pub fn matches(&self, body: Option<&str>) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(expected) => body == Some(expected.as_str()),
            Self::Json(expected) => body
                .and_then(|b| serde_json::from_str::<serde_json::Value>(b).ok())
                .is_some_and(|actual| &actual == expected),
        }
    }
}

/// Canned response served when an exchange matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body text.
    #[serde(default)]
    pub body: String,
    /// Response headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl RecordedResponse {
    /// Creates a JSON response with the given status.
    #[must_use]
    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert(
            String::from("content-type"),
            String::from("application/json"),
        );
        Self {
            status,
            body: body.to_string(),
            headers,
        }
    }
}

/// One recorded matcher/responder pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedExchange {
    /// HTTP method, uppercase.
    pub method: String,
    /// URL matcher.
    pub path: PathMatcher,
    /// Request-body matcher.
    #[serde(default)]
    pub body: BodyMatcher,
    /// Canned response.
    pub response: RecordedResponse,
}

impl RecordedExchange {
    /// Creates an exchange with an exact path and wildcard body.
    #[must_use]
    pub fn new(method: impl Into<String>, path: impl Into<String>, response: RecordedResponse) -> Self {
        Self {
            method: method.into().to_ascii_uppercase(),
            path: PathMatcher::Exact(path.into()),
            body: BodyMatcher::Any,
            response,
        }
    }

    /// Sets the body matcher.
    #[must_use]
    pub fn with_body(mut self, body: BodyMatcher) -> Self {
        self.body = body;
        self
    }

    /// Returns a short human-readable description for diagnostics.
    #[must_use]
    pub fn describe(&self) -> String {
        format!("{} {}", self.method, self.path.describe())
    }
}

/// On-disk fixture file contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureFile {
    /// Format version; must equal [`FIXTURE_VERSION`].
    pub version: u32,
    /// Synthetic account profile.
    pub profile: Profile,
    /// Environment overrides to seed before the test runs.
    #[serde(default)]
    pub env_overrides: BTreeMap<String, String>,
    /// Ordered exchange groups, consumed strictly in order.
    pub exchanges: Vec<Vec<RecordedExchange>>,
    /// When the fixture was recorded.
    #[serde(default)]
    pub recorded_at: Option<DateTime<Utc>>,
}

/// One loaded, replayable fixture.
#[derive(Debug, Clone, Serialize)]
pub struct Fixture {
    /// Suite name.
    pub suite: String,
    /// Full test title.
    pub test: String,
    /// Synthetic account profile.
    pub profile: Profile,
    /// Environment overrides to seed before the test runs.
    pub env_overrides: BTreeMap<String, String>,
    /// Ordered exchange groups, consumed strictly in order.
    pub exchanges: Vec<Vec<RecordedExchange>>,
    /// When the fixture was recorded.
    pub recorded_at: Option<DateTime<Utc>>,
}

impl Fixture {
    /// Builds a fixture from a parsed file and its identity.
    #[must_use]
    pub fn from_file(suite: impl Into<String>, test: impl Into<String>, file: FixtureFile) -> Self {
        Self {
            suite: suite.into(),
            test: test.into(),
            profile: file.profile,
            env_overrides: file.env_overrides,
            exchanges: file.exchanges,
            recorded_at: file.recorded_at,
        }
    }

    /// Returns the `suite/test` label used in diagnostics.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}/{}", self.suite, self.test)
    }

    /// Total number of recorded exchanges across all groups.
    #[must_use]
    pub fn exchange_count(&self) -> usize {
        self.exchanges.iter().map(Vec::len).sum()
    }
}
