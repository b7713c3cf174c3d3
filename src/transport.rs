//! HTTP transport seam
//!
//! [`ApiClient`](crate::ApiClient) never talks to reqwest directly. It hands
//! a fully described [`HttpRequest`] to a [`Transport`] and gets back the
//! status code and body text. Tests inject their own implementation through
//! [`ApiClient::with_transport`](crate::ApiClient::with_transport).

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Verb of an outgoing request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST with a JSON body
    Post,
}

impl HttpMethod {
    /// Upper-case verb
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated request handed to a transport
#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
    /// Verb
    pub method: HttpMethod,
    /// Absolute URL without query string
    pub url: String,
    /// Query parameters, in order
    pub query: Vec<(String, String)>,
    /// Token sent as `Authorization: Bearer <token>`
    pub bearer_token: String,
    /// Encoded JSON body (POST only)
    pub json_body: Option<String>,
}

impl HttpRequest {
    /// Build a GET request
    pub fn get(url: impl Into<String>, bearer_token: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            query: Vec::new(),
            bearer_token: bearer_token.into(),
            json_body: None,
        }
    }

    /// Build a POST request carrying a JSON body
    pub fn post_json(
        url: impl Into<String>,
        bearer_token: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            query: Vec::new(),
            bearer_token: bearer_token.into(),
            json_body: Some(body.into()),
        }
    }

    /// Append a query parameter
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// Status and body of a completed exchange
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Body text (possibly empty)
    pub body: String,
}

impl HttpResponse {
    /// Standard reason phrase of the status code, if it has one
    pub fn reason(&self) -> Option<&'static str> {
        reqwest::StatusCode::from_u16(self.status)
            .ok()
            .and_then(|s| s.canonical_reason())
    }
}

/// Performs HTTP exchanges on behalf of the client
///
/// Implementations must be `Send + Sync`; the trait is object-safe and is
/// stored as `Arc<dyn Transport>`. Any HTTP status, including errors, is a
/// successful exchange at this level: only failures to reach the server or
/// read its answer are reported as errors.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute one request
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Production transport backed by reqwest
///
/// Idle connections are never kept, so every exchange uses a connection of
/// its own.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with the given per-request timeout
    pub fn new(request_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .pool_max_idle_per_host(0)
            .user_agent(concat!("skritter-export/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!(method = %request.method, url = %request.url, "sending request");

        let builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };
        let mut builder = builder.bearer_auth(&request.bearer_token);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = request.json_body {
            builder = builder
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        let response = builder.send().await.map_err(|e| {
            debug!(url = %request.url, error = %e, "request failed");
            Error::Network(e)
        })?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!(url = %request.url, status, body_len = body.len(), "received response");
        Ok(HttpResponse { status, body })
    }
}
