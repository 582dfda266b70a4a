//! HTTP mock server helpers for testing outbound HTTP calls.
//!
//! This module provides a thin wrapper around `wiremock` for declarative
//! HTTP stubbing of the upstream post API.
//!
//! # Patterns
//!
//! - **Success response**: `.respond_with_json(value)`
//! - **Error response**: `.respond_with_status(429)`, optionally `.with_json_response(body)`
//! - **Timeout simulation**: `.respond_with_delay(Duration::from_secs(30))`
//! - **Request verification**: `.expect_times(1)` then `server.verify().await`

use std::time::Duration;

use serde_json::Value;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockBuilder, MockServer, ResponseTemplate};

/// Wrapper around a `wiremock` server.
pub struct MockHttpServer {
    server: MockServer,
}

impl MockHttpServer {
    /// Start a server on a random local port.
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URL of the server, without trailing slash.
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Underlying `wiremock` server, for matchers this wrapper does not cover.
    pub fn inner(&self) -> &MockServer {
        &self.server
    }

    /// Begin stubbing a GET on `route`.
    pub fn expect_get(&self, route: &str) -> StubBuilder<'_> {
        StubBuilder {
            server: &self.server,
            matcher: Mock::given(method("GET")).and(path(route)),
            response: ResponseTemplate::new(200),
            times: None,
        }
    }

    /// Assert every `expect_times` expectation was met.
    pub async fn verify(&self) {
        self.server.verify().await;
    }
}

/// Declarative builder for one stubbed route.
pub struct StubBuilder<'a> {
    server: &'a MockServer,
    matcher: MockBuilder,
    response: ResponseTemplate,
    times: Option<u64>,
}

impl StubBuilder<'_> {
    /// Require a request header.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.matcher = self.matcher.and(header(name, value));
        self
    }

    /// Require the bearer credential the upstream client sends.
    pub fn with_bearer(self, token: &str) -> Self {
        self.with_header("Authorization", &format!("Bearer {token}"))
    }

    /// Require a query parameter.
    pub fn with_query_param(mut self, name: &str, value: &str) -> Self {
        self.matcher = self.matcher.and(query_param(name, value));
        self
    }

    /// Respond 200 with a JSON body.
    pub fn respond_with_json(mut self, body: Value) -> Self {
        self.response = ResponseTemplate::new(200).set_body_json(body);
        self
    }

    /// Respond with a bare status code.
    pub fn respond_with_status(mut self, status: u16) -> Self {
        self.response = ResponseTemplate::new(status);
        self
    }

    /// Attach a JSON body to the current response.
    pub fn with_json_response(mut self, body: Value) -> Self {
        self.response = self.response.set_body_json(body);
        self
    }

    /// Delay the current response.
    pub fn respond_with_delay(mut self, delay: Duration) -> Self {
        self.response = self.response.set_delay(delay);
        self
    }

    /// Expect exactly `times` matching requests.
    pub fn expect_times(mut self, times: u64) -> Self {
        self.times = Some(times);
        self
    }

    /// Register the stub with the server.
    pub async fn mount(self) {
        let mut mock = self.matcher.respond_with(self.response);
        if let Some(times) = self.times {
            mock = mock.expect(times);
        }
        mock.mount(self.server).await;
    }
}
