//! Pluggable HTTP execution for `Imagga`.
//!
//! # Design
//! `Transport` is the only place a request leaves the process. It takes a
//! fully built `HttpRequest` and returns whatever status and body came back;
//! interpreting the status is left to `ImaggaClient::parse_response`, so a
//! transport must return 4xx/5xx responses as data rather than as errors.
//! Only failures without a response (DNS, connect, timeout) become
//! `ApiError::Transport`.
//!
//! `UreqTransport` is the blocking default. Any other HTTP stack, or a test
//! double, can stand in by implementing the trait.

use std::time::Duration;

use ureq::{Agent, RequestBuilder};

use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Default timeout for one request, connect to last byte.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Executes `HttpRequest` values.
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        (**self).send(request)
    }
}

/// Blocking transport built on a shared `ureq::Agent`.
///
/// The agent keeps connections alive between calls, so one transport should
/// live as long as the client using it.
#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }

    /// Use a preconfigured agent. It must be built with
    /// `http_status_as_error(false)` so error statuses reach the parser.
    pub fn with_agent(agent: Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let url = request.url.as_str();
        let result = match (request.method, &request.body) {
            (HttpMethod::Get, _) => apply_headers(self.agent.get(url), request).call(),
            (HttpMethod::Delete, _) => apply_headers(self.agent.delete(url), request).call(),
            (HttpMethod::Post, Some(body)) => {
                apply_headers(self.agent.post(url), request).send(body.as_slice())
            }
            (HttpMethod::Post, None) => apply_headers(self.agent.post(url), request).send_empty(),
        };
        let mut response = result.map_err(ApiError::transport)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(ApiError::transport)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn apply_headers<B>(mut builder: RequestBuilder<B>, request: &HttpRequest) -> RequestBuilder<B> {
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}
