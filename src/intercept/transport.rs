//! Transport seam and its three implementations.
//!
//! The code under test reaches the network exclusively through the
//! [`HttpTransport`] trait. Playback serves responses from the active
//! interceptor session; live goes to the real service via reqwest; record
//! wraps live and captures every exchange into a [`RecordingSession`].

use async_trait::async_trait;
use reqwest::Client;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::trace;

use crate::error::{ExecError, HarnessError, Result};

use super::recording::RecordingSession;
use super::scope::{HttpRequest, HttpResponse};
use super::session::InterceptSession;

/// Outbound HTTP capability injected into the code under test.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends one request and returns the response.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Transport that serves responses from an interceptor session.
///
/// The mutex exists because the transport seam must be `Send + Sync`;
/// tests within a suite run sequentially, so calls never actually
/// interleave. Parallel suites each get their own instance.
#[derive(Debug)]
pub struct PlaybackTransport {
    session: Mutex<InterceptSession>,
}

impl PlaybackTransport {
    /// Wraps an interceptor session.
    #[must_use]
    pub fn new(session: InterceptSession) -> Self {
        Self {
            session: Mutex::new(session),
        }
    }

    /// Verifies every scope was consumed (teardown contract).
    ///
    /// # Errors
    ///
    /// Returns an error listing unmatched scopes.
    pub fn verify_consumed(&self) -> Result<()> {
        self.lock_session()?.verify_consumed()
    }

    /// Number of scopes consumed so far.
    ///
    /// # Errors
    ///
    /// Returns an error if the session lock is poisoned.
    pub fn consumed(&self) -> Result<usize> {
        Ok(self.lock_session()?.consumed())
    }

    fn lock_session(&self) -> Result<std::sync::MutexGuard<'_, InterceptSession>> {
        self.session
            .lock()
            .map_err(|_| HarnessError::internal("interceptor session poisoned"))
    }
}

#[async_trait]
impl HttpTransport for PlaybackTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.lock_session()?.match_next(&request)
    }
}

/// Transport that sends requests to the real service.
#[derive(Debug, Clone)]
pub struct LiveTransport {
    client: Client,
}

impl LiveTransport {
    /// Creates a live transport with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ExecError::network(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for LiveTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        trace!("Live request: {} {}", request.method, request.url);

        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|e| ExecError::network(format!("Invalid method: {e}")))?;

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ExecError::network(format!("Request failed: {e}")))?;

        let status = response.status().as_u16();
        let mut headers = BTreeMap::new();
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                headers.insert(name.as_str().to_string(), value.to_string());
            }
        }
        let body = response
            .text()
            .await
            .map_err(|e| ExecError::network(format!("Failed to read response body: {e}")))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Transport that forwards to an inner transport and captures every
/// successful exchange into a recording session, in issue order.
pub struct RecordingTransport {
    inner: Arc<dyn HttpTransport>,
    recorder: Arc<RecordingSession>,
}

impl RecordingTransport {
    /// Wraps a transport with capture.
    #[must_use]
    pub fn new(inner: Arc<dyn HttpTransport>, recorder: Arc<RecordingSession>) -> Self {
        Self { inner, recorder }
    }
}

#[async_trait]
impl HttpTransport for RecordingTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let response = self.inner.send(request.clone()).await?;
        self.recorder.capture(&request, &response)?;
        Ok(response)
    }
}
