//! Wire types for the Skritter batch API
//!
//! The batch endpoints answer with an envelope wrapping a job snapshot. The
//! snapshot's sub-requests use loosely typed fields (`done` is either a
//! boolean or a timestamp, `response` is either an empty string or an
//! object); these are normalized here into explicit Rust types.

use crate::error::{Error, Result};
use crate::vocab::Vocab;
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Envelope returned by every batch endpoint
#[derive(Clone, Debug, Deserialize)]
pub struct BatchEnvelope {
    /// Status code reported inside the body (distinct from the HTTP status)
    #[serde(rename = "statusCode")]
    pub status_code: u16,

    /// Job snapshot, absent when the service reports a failure
    #[serde(rename = "Batch", default)]
    pub batch: Option<BatchJob>,
}

/// Snapshot of one outstanding unit of remote work
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchJob {
    /// Opaque job identifier assigned by the service on submit
    pub id: String,

    /// Number of sub-requests in the job
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_requests: u64,

    /// Number of sub-requests still incomplete; the job is complete at 0
    pub running_requests: u64,

    /// Creation timestamp (not interpreted)
    #[serde(default, deserialize_with = "null_as_default")]
    pub created: i64,

    /// Sub-requests in server-reported order
    #[serde(rename = "Requests", default, deserialize_with = "null_as_default")]
    pub spawned_requests: Vec<SpawnedRequest>,
}

impl BatchJob {
    /// Whether every sub-request has finished
    pub fn is_complete(&self) -> bool {
        self.running_requests == 0
    }

    /// Comma-separated ids of the spawned sub-requests, in order
    pub fn request_ids_csv(&self) -> String {
        self.spawned_requests
            .iter()
            .map(|r| r.id.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for BatchJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "batch {}: {}/{} requests running",
            self.id, self.running_requests, self.total_requests
        )
    }
}

/// One unit of work executed under a batch job
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnedRequest {
    /// Opaque sub-request identifier
    pub id: String,

    /// Creation timestamp
    #[serde(default, deserialize_with = "null_as_default")]
    pub created: i64,

    /// Job that spawned this sub-request
    #[serde(rename = "spawnedBy", default)]
    pub spawned_by: Option<i64>,

    /// Completion state
    #[serde(default)]
    pub done: DoneAt,

    /// Parameters of the original request, echoed back untouched
    #[serde(default, deserialize_with = "null_as_default")]
    pub params: Map<String, Value>,

    /// Target path of the original request
    #[serde(default, deserialize_with = "null_as_default")]
    pub path: String,

    /// Verb of the original request
    #[serde(default, deserialize_with = "null_as_default")]
    pub method: String,

    /// Response, absent while the sub-request is incomplete
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<SpawnedResponse>,
}

impl SpawnedRequest {
    /// Decode the response payload into an endpoint-specific shape
    ///
    /// Returns `Ok(None)` when the response is absent or still a placeholder.
    pub fn into_payload<T: DeserializeOwned>(self) -> Result<Option<T>> {
        match self.response {
            Some(SpawnedResponse::Payload(map)) => serde_json::from_value(Value::Object(map))
                .map(Some)
                .map_err(|e| Error::format(format!("response of sub-request {}", self.id), e.to_string())),
            Some(SpawnedResponse::Placeholder) | None => Ok(None),
        }
    }
}

/// Completion state of a sub-request
///
/// The service sends `false` while a request is running and the completion
/// epoch once it is done.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DoneAt {
    /// Not done yet
    #[default]
    Pending,
    /// Done at the given timestamp
    At(i64),
}

impl DoneAt {
    /// Timestamp view of the state, with 0 meaning "not done"
    pub fn timestamp(&self) -> i64 {
        match self {
            DoneAt::Pending => 0,
            DoneAt::At(ts) => *ts,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDone {
    Flag(bool),
    At(i64),
}

impl<'de> Deserialize<'de> for DoneAt {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<RawDone>::deserialize(deserializer)? {
            None | Some(RawDone::Flag(_)) => Ok(DoneAt::Pending),
            Some(RawDone::At(ts)) => Ok(DoneAt::At(ts)),
        }
    }
}

impl Serialize for DoneAt {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            DoneAt::Pending => serializer.serialize_bool(false),
            DoneAt::At(ts) => serializer.serialize_i64(*ts),
        }
    }
}

/// Response attached to a sub-request
#[derive(Clone, Debug, PartialEq)]
pub enum SpawnedResponse {
    /// Present but not populated yet (`""` on the wire)
    Placeholder,
    /// Decoded response object, keyed by the target resource's array name
    Payload(Map<String, Value>),
}

impl<'de> Deserialize<'de> for SpawnedResponse {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(s) if s.is_empty() => Ok(SpawnedResponse::Placeholder),
            Value::Object(map) => Ok(SpawnedResponse::Payload(map)),
            Value::String(s) => Err(de::Error::custom(format!(
                "response must be empty or an object, got string {s:?}"
            ))),
            other => Err(de::Error::custom(format!(
                "response must be empty or an object, got {other}"
            ))),
        }
    }
}

impl Serialize for SpawnedResponse {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            SpawnedResponse::Placeholder => serializer.serialize_str(""),
            SpawnedResponse::Payload(map) => map.serialize(serializer),
        }
    }
}

/// Descriptor of one request submitted to the batch endpoint
#[derive(Clone, Debug, Serialize)]
pub struct BatchRequest<P> {
    /// Target path, relative to the service root (e.g. "api/v0/vocabs")
    pub path: String,
    /// Verb to run the request with
    pub method: String,
    /// Request parameters
    pub params: P,
    /// Whether the server may fan this request out into further sub-requests
    pub spawner: bool,
}

/// Parameters selecting vocabs by id
#[derive(Clone, Debug, Serialize)]
pub struct VocabsParams {
    /// Pipe-separated vocab ids
    pub ids: String,
    /// Comma-separated field list
    pub fields: String,
}

/// Parameters listing the user's banned vocabs
#[derive(Clone, Debug, Serialize)]
pub struct BannedVocabsParams {
    /// Sort key selecting banned vocabs
    pub sort: String,
}

/// Parameters listing the user's items
#[derive(Clone, Debug, Serialize)]
pub struct ItemsParams {
    /// Only return item ids
    pub ids_only: String,
    /// Embed vocab records in the response
    pub include_vocabs: String,
    /// Maximum number of items
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    /// Comma-separated field list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<String>,
}

/// Response payload of a vocab lookup sub-request
#[derive(Clone, Debug, Deserialize)]
pub struct VocabsPayload {
    /// Vocab records
    #[serde(rename = "Vocabs")]
    pub vocabs: Vec<Vocab>,
}

/// Response payload of an item listing sub-request
#[derive(Clone, Debug, Deserialize)]
pub struct ItemsPayload {
    /// Item references
    #[serde(rename = "Items")]
    pub items: Vec<ItemRef>,
}

/// Item record as returned with `ids_only`
#[derive(Clone, Debug, Deserialize)]
pub struct ItemRef {
    /// Composite item id, e.g. "234179586-zh-没关系-2-rune"
    pub id: String,
}

/// Treat an explicit JSON `null` like a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
