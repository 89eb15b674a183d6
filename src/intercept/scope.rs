//! Scopes: compiled matcher/responder pairs.
//!
//! A scope is one expected HTTP exchange. Matching is keyed on method plus
//! the encoded path-and-query (byte-for-byte for exact matchers, so
//! percent-encoded slashes inside resource IDs match exactly as recorded),
//! with an optional body predicate.

use regex::Regex;
use std::collections::BTreeMap;

use crate::error::{FixtureError, HarnessError, Result};
use crate::fixture::{BodyMatcher, PathMatcher, RecordedExchange, RecordedResponse};

/// One HTTP request issued by the code under test.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method, uppercase.
    pub method: String,
    /// Request URL; absolute in live mode, path-and-query is what matters
    /// for matching.
    pub url: String,
    /// Request headers.
    pub headers: Vec<(String, String)>,
    /// Request body, if any.
    pub body: Option<String>,
}

impl HttpRequest {
    /// Creates a request with no headers or body.
    #[must_use]
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into().to_ascii_uppercase(),
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Sets the request body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Adds a request header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Returns the encoded path-and-query of this request's URL.
    #[must_use]
    pub fn path_and_query(&self) -> &str {
        path_and_query(&self.url)
    }
}

/// One HTTP response returned to the code under test.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: BTreeMap<String, String>,
    /// Response body text.
    pub body: String,
}

impl HttpResponse {
    /// Returns true for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Parses the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid JSON.
    pub fn json(&self) -> Result<serde_json::Value> {
        serde_json::from_str(&self.body)
            .map_err(|e| HarnessError::internal(format!("response body is not JSON: {e}")))
    }
}

impl From<&RecordedResponse> for HttpResponse {
    fn from(recorded: &RecordedResponse) -> Self {
        Self {
            status: recorded.status,
            headers: recorded.headers.clone(),
            body: recorded.body.clone(),
        }
    }
}

/// Extracts the encoded path-and-query from a URL without decoding it.
///
/// Absolute URLs are stripped of scheme and authority; path-only inputs
/// are returned unchanged. No percent-decoding happens anywhere on this
/// path: recorded and observed bytes must agree.
#[must_use]
pub fn path_and_query(url: &str) -> &str {
    if url.starts_with('/') {
        return url;
    }
    url.find("://").map_or(url, |scheme_end| {
        let rest = &url[scheme_end + 3..];
        rest.find('/').map_or("/", |slash| &rest[slash..])
    })
}

/// Compiled URL matcher.
#[derive(Debug)]
enum CompiledPath {
    Exact(String),
    Pattern(Regex),
}

/// One compiled matcher/responder pair.
#[derive(Debug)]
pub struct Scope {
    /// Expected HTTP method, uppercase.
    method: String,
    /// Compiled URL matcher.
    path: CompiledPath,
    /// Request-body predicate.
    body: BodyMatcher,
    /// Canned response.
    response: RecordedResponse,
    /// Human-readable description for diagnostics.
    description: String,
}

impl Scope {
    /// Compiles a recorded exchange into a scope.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern matcher is not a valid regex.
    pub fn compile(exchange: &RecordedExchange, fixture_label: &str) -> Result<Self> {
        let path = match &exchange.path {
            PathMatcher::Exact(path) => CompiledPath::Exact(path.clone()),
            PathMatcher::Pattern(pattern) => {
                let anchored = format!("^(?:{pattern})$");
                let regex = Regex::new(&anchored).map_err(|e| {
                    HarnessError::Fixture(FixtureError::InvalidExchange {
                        fixture: fixture_label.to_string(),
                        message: format!("bad pattern '{pattern}': {e}"),
                    })
                })?;
                CompiledPath::Pattern(regex)
            }
        };

        Ok(Self {
            method: exchange.method.to_ascii_uppercase(),
            path,
            body: exchange.body.clone(),
            response: exchange.response.clone(),
            description: exchange.describe(),
        })
    }

    /// Checks whether a request satisfies this scope.
    #[must_use]
    pub fn matches(&self, request: &HttpRequest) -> bool {
        if request.method != self.method {
            return false;
        }
        let target = request.path_and_query();
        let path_ok = match &self.path {
            CompiledPath::Exact(expected) => target == expected,
            CompiledPath::Pattern(regex) => regex.is_match(target),
        };
        path_ok && self.body.matches(request.body.as_deref())
    }

    /// Returns the canned response for this scope.
    #[must_use]
    pub fn response(&self) -> HttpResponse {
        HttpResponse::from(&self.response)
    }

    /// Returns the human-readable description of this scope.
    #[must_use]
    pub fn describe(&self) -> &str {
        &self.description
    }
}
