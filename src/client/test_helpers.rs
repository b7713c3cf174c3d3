//! Shared test helpers for driving ApiClient without a network.

use crate::config::Config;
use crate::error::Result;
use crate::transport::{HttpRequest, HttpResponse, Transport};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Transport answering from a queue of canned responses and recording
/// every request it receives.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    responses: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, response: HttpResponse) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub(crate) fn push_json(&self, value: Value) {
        self.push(HttpResponse { status: 200, body: value.to_string() });
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let response = self.responses.lock().unwrap().pop_front();
        Ok(response.unwrap_or_else(|| panic!("no scripted response for {} {}", request.method, request.url)))
    }
}

/// Config with a token and a fast polling schedule
pub(crate) fn test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.api.base_url = base_url.to_string();
    config.api.bearer_token = Some("test-token".to_string());
    config.batch.poll_interval = Duration::from_millis(1);
    config.batch.timeout = Duration::from_millis(50);
    config
}

/// Envelope around a job snapshot
pub(crate) fn envelope(job_id: &str, running: u64, requests: Vec<Value>) -> Value {
    json!({
        "statusCode": 200,
        "Batch": {
            "id": job_id,
            "totalRequests": requests.len().max(1),
            "runningRequests": running,
            "created": 1687000000,
            "Requests": requests,
        }
    })
}

/// Spawned sub-request, done when a response is given
pub(crate) fn spawned(id: &str, response: Option<Value>) -> Value {
    let mut request = json!({
        "id": id,
        "created": 1687000000,
        "spawnedBy": 1,
        "done": false,
        "params": {},
        "path": "api/v0/vocabs",
        "method": "GET",
    });
    if let Some(response) = response {
        request["done"] = json!(1687000100);
        request["response"] = response;
    }
    request
}

/// Vocab record as the service returns it
pub(crate) fn vocab_json(id: &str, style: &str, writing: &str, reading: &str, en: &str) -> Value {
    json!({
        "id": id,
        "style": style,
        "writing": writing,
        "reading": reading,
        "definitions": {"en": en},
    })
}
