//! Skritter API client split into focused submodules.
//!
//! The `ApiClient` struct and its methods are organized by concern:
//! - [`batch`] - Submit, poll and fetch of a single batch job
//! - [`collect`] - Chunked collection and per-domain aggregation
//! - [`simptrad`] - Simplified/traditional table download

mod batch;
mod collect;
mod simptrad;

pub use collect::{ITEMS_PATH, VOCABS_PATH};

use crate::config::{BEARER_TOKEN_PROPERTY, BatchConfig, Config};
use crate::error::{Error, Result};
use crate::transport::{HttpRequest, ReqwestTransport, Transport};
use crate::types::{BatchEnvelope, BatchJob};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Endpoint of the batch API, relative to the base URL
pub(crate) const BATCH_ENDPOINT: &str = "batch";

/// Authenticated client for the Skritter API
///
/// All operations run strictly one after another: a chunk's submit, poll
/// and fetch finish before the next chunk starts. Polling stops early when
/// the client's cancellation token fires.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    base_url: String,
    bearer_token: String,
    batch: BatchConfig,
    cancel_token: CancellationToken,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("batch", &self.batch)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client talking to the real service through reqwest
    ///
    /// Fails with a configuration error, before any network activity, when
    /// no bearer token is configured.
    pub fn new(config: &Config) -> Result<Self> {
        let token = require_token(config)?;
        let transport = ReqwestTransport::new(config.api.request_timeout)?;
        Self::build(config, token, Arc::new(transport))
    }

    /// Create a client using the given transport
    pub fn with_transport(config: &Config, transport: Arc<dyn Transport>) -> Result<Self> {
        let token = require_token(config)?;
        Self::build(config, token, transport)
    }

    fn build(config: &Config, bearer_token: String, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            transport,
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
            bearer_token,
            batch: config.batch.clone(),
            cancel_token: CancellationToken::new(),
        })
    }

    /// Replace the cancellation token observed while polling
    #[must_use]
    pub fn with_cancellation(mut self, cancel_token: CancellationToken) -> Self {
        self.cancel_token = cancel_token;
        self
    }

    /// Token that aborts any in-progress poll when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Batch settings in effect
    pub fn batch_config(&self) -> &BatchConfig {
        &self.batch
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    pub(crate) fn get_request(&self, url: impl Into<String>) -> HttpRequest {
        HttpRequest::get(url, self.bearer_token.as_str())
    }

    pub(crate) fn post_request(&self, url: impl Into<String>, body: String) -> HttpRequest {
        HttpRequest::post_json(url, self.bearer_token.as_str(), body)
    }

    /// Execute a request and return its body, failing on any status but 200
    pub(crate) async fn send(&self, request: HttpRequest) -> Result<String> {
        let method = request.method;
        let endpoint = request.url.clone();
        let response = self.transport.execute(request).await?;

        if response.status != 200 {
            let message = if response.body.trim().is_empty() {
                response.reason().unwrap_or("no response body").to_string()
            } else {
                response.body.clone()
            };
            return Err(Error::Protocol {
                method: method.to_string(),
                endpoint,
                status: response.status,
                message,
            });
        }

        debug!(%method, endpoint = %endpoint, body = %response.body, "response data");
        Ok(response.body)
    }

    /// Decode a batch envelope, rejecting failures reported inside the body
    pub(crate) fn decode_envelope(&self, method: &str, endpoint: &str, body: &str) -> Result<BatchJob> {
        let envelope: BatchEnvelope = serde_json::from_str(body)
            .map_err(|e| Error::format(format!("{method} {endpoint}"), e.to_string()))?;

        if envelope.status_code != 200 {
            return Err(Error::Protocol {
                method: method.to_string(),
                endpoint: endpoint.to_string(),
                status: envelope.status_code,
                message: body.to_string(),
            });
        }

        envelope
            .batch
            .ok_or_else(|| Error::format(format!("{method} {endpoint}"), "missing Batch object"))
    }
}

fn require_token(config: &Config) -> Result<String> {
    config
        .api
        .bearer_token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            Error::config(
                format!("Missing {BEARER_TOKEN_PROPERTY} property"),
                BEARER_TOKEN_PROPERTY,
            )
        })
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
