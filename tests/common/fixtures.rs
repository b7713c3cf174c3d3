//! Batch API payload fixtures

use serde_json::{Value, json};

/// Envelope around a job snapshot
pub fn envelope(job_id: &str, running: u64, requests: Vec<Value>) -> Value {
    json!({
        "statusCode": 200,
        "Batch": {
            "id": job_id,
            "totalRequests": requests.len(),
            "runningRequests": running,
            "created": 1687000000,
            "Requests": requests,
        }
    })
}

/// Sub-request as reported while the job is running
pub fn pending_request(id: &str) -> Value {
    json!({
        "id": id,
        "created": 1687000000,
        "spawnedBy": 5883192233295872i64,
        "done": false,
        "params": {},
        "path": "api/v0/vocabs",
        "method": "GET",
    })
}

/// Sub-request carrying a response
pub fn done_request(id: &str, response: Value) -> Value {
    let mut request = pending_request(id);
    request["done"] = json!(1687000123);
    request["response"] = response;
    request
}

/// Vocab record as returned by the service
pub fn vocab(id: &str, style: &str, writing: &str, reading: &str, english: &str) -> Value {
    json!({
        "id": id,
        "style": style,
        "writing": writing,
        "reading": reading,
        "definitions": {"en": english},
        "customDefinition": null,
    })
}

/// Item listing page
pub fn items_page(ids: &[&str]) -> Value {
    let items: Vec<Value> = ids.iter().map(|id| json!({ "id": id })).collect();
    json!({ "Items": items })
}

/// Vocab listing page
pub fn vocabs_page(vocabs: Vec<Value>) -> Value {
    json!({ "Vocabs": vocabs })
}

/// Small simplified/traditional table
pub fn simptrad_table() -> Value {
    json!({"SimpTradMap": {"关": "關", "系": ["係", "繫"], "没": "沒"}})
}
