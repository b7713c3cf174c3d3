//! Batch job lifecycle: submit, poll until complete, fetch results

use super::{ApiClient, BATCH_ENDPOINT};
use crate::error::{Error, Result};
use crate::types::{BatchJob, BatchRequest, SpawnedRequest};
use serde::Serialize;
use tracing::{debug, info};

/// Verb used for every spawner request
const SPAWNER_METHOD: &str = "GET";

impl ApiClient {
    /// Submit one spawner request and return the initial job snapshot
    ///
    /// The request is posted as a one-element array. Any HTTP status other
    /// than 200 fails immediately with a protocol error; nothing is retried.
    pub async fn submit<P: Serialize>(&self, path: &str, params: P) -> Result<BatchJob> {
        info!(path, "posting batch request");

        let descriptor = [BatchRequest {
            path: path.to_string(),
            method: SPAWNER_METHOD.to_string(),
            params,
            spawner: true,
        }];
        let body = serde_json::to_string(&descriptor)?;
        let endpoint = self.endpoint(BATCH_ENDPOINT);
        debug!(endpoint = %endpoint, body = %body, "batch request body");

        let response = self.send(self.post_request(endpoint.as_str(), body)).await?;
        let job = self.decode_envelope("POST", &endpoint, &response)?;

        info!(
            job_id = %job.id,
            running = job.running_requests,
            total = job.total_requests,
            "batch submitted"
        );
        Ok(job)
    }

    /// Poll a job's status until it completes
    ///
    /// The sub-request ids are taken once from `job` and sent with every
    /// status read. Each read yields a fresh snapshot; the first snapshot
    /// with no running requests is returned. Reads are separated by the
    /// configured poll interval and limited to
    /// [`BatchConfig::max_polls`](crate::config::BatchConfig::max_polls);
    /// when the budget runs out the last snapshot is returned inside a
    /// timeout error. Cancelling the client's token during the wait between
    /// reads fails with [`Error::Cancelled`].
    pub async fn await_completion(&self, job: &BatchJob) -> Result<BatchJob> {
        let request_ids = job.request_ids_csv();
        let max_polls = self.batch.max_polls();
        let endpoint = self.endpoint(&format!("{BATCH_ENDPOINT}/{}/status", job.id));

        info!(job_id = %job.id, max_polls, "waiting for batch completion");

        let mut last = job.clone();
        for poll in 1..=max_polls {
            let request = self
                .get_request(endpoint.as_str())
                .with_query("request_ids", request_ids.as_str());
            let body = self.send(request).await?;
            let snapshot = self.decode_envelope("GET", &endpoint, &body)?;

            debug!(
                job_id = %job.id,
                poll,
                running = snapshot.running_requests,
                total = snapshot.total_requests,
                "batch status"
            );

            if snapshot.is_complete() {
                info!(job_id = %job.id, polls = poll, "batch complete");
                return Ok(snapshot);
            }
            last = snapshot;

            if poll == max_polls {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.batch.poll_interval) => {}
                _ = self.cancel_token.cancelled() => {
                    info!(job_id = %job.id, polls = poll, "batch polling cancelled");
                    return Err(Error::Cancelled { job_id: job.id.clone() });
                }
            }
        }

        Err(Error::Timeout {
            job_id: job.id.clone(),
            polls: max_polls,
            last: Box::new(last),
        })
    }

    /// Retrieve the spawned sub-requests of a completed job
    ///
    /// Responses are decoded where present. A response that is a non-empty
    /// string is rejected as a format error.
    pub async fn fetch_results(&self, job_id: &str) -> Result<Vec<SpawnedRequest>> {
        let endpoint = self.endpoint(&format!("{BATCH_ENDPOINT}/{job_id}"));
        info!(job_id, "fetching batch results");

        let body = self.send(self.get_request(endpoint.as_str())).await?;
        let job = self.decode_envelope("GET", &endpoint, &body)?;

        debug!(job_id, requests = job.spawned_requests.len(), "batch results received");
        Ok(job.spawned_requests)
    }

    /// Run one full submit, poll and fetch cycle
    pub async fn run_batch<P: Serialize>(&self, path: &str, params: P) -> Result<Vec<SpawnedRequest>> {
        let job = self.submit(path, params).await?;
        let completed = self.await_completion(&job).await?;
        self.fetch_results(&completed.id).await
    }
}
