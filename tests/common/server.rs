//! Mock Skritter API built on wiremock

use serde_json::Value;
use skritter_export::Config;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::fixtures::{envelope, pending_request};

/// Token every mock expects
pub const TOKEN: &str = "integration-token";

/// Config pointing at the mock server with a fast polling schedule
pub fn test_config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.api.base_url = server.uri();
    config.api.bearer_token = Some(TOKEN.to_string());
    config.batch.poll_interval = Duration::from_millis(10);
    config.batch.timeout = Duration::from_secs(2);
    config
}

/// Mount a complete batch job
///
/// The POST whose body contains `submit_marker` starts job `job_id` with one
/// sub-request `"{job_id}-r1"`. Status reads report the job running for
/// `running_polls` reads, then complete. The job's results are `results`.
pub async fn mount_job(
    server: &MockServer,
    job_id: &str,
    submit_marker: &str,
    running_polls: u64,
    results: Vec<Value>,
) {
    let request_id = format!("{job_id}-r1");

    Mock::given(method("POST"))
        .and(path("/batch"))
        .and(body_string_contains(submit_marker))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope(job_id, 1, vec![pending_request(&request_id)])),
        )
        .mount(server)
        .await;

    mount_status(server, job_id, &request_id, running_polls).await;

    Mock::given(method("GET"))
        .and(path(format!("/batch/{job_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(job_id, 0, results)))
        .mount(server)
        .await;
}

/// Status endpoint reporting `running_polls` running snapshots, then completion
pub async fn mount_status(server: &MockServer, job_id: &str, request_id: &str, running_polls: u64) {
    let status_path = format!("/batch/{job_id}/status");

    if running_polls > 0 {
        Mock::given(method("GET"))
            .and(path(status_path.as_str()))
            .and(query_param("request_ids", request_id))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(envelope(job_id, 1, vec![pending_request(request_id)])),
            )
            .up_to_n_times(running_polls)
            .with_priority(1)
            .mount(server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path(status_path.as_str()))
        .and(query_param("request_ids", request_id))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope(job_id, 0, vec![pending_request(request_id)])),
        )
        .with_priority(2)
        .mount(server)
        .await;
}
