//! Error types for skritter-export
//!
//! Every failure in this crate is fatal to the operation that raised it.
//! Nothing is recovered locally: a failed submit, poll or fetch aborts the
//! whole export and surfaces here with enough context (status code,
//! endpoint, offending id) to diagnose it without re-running.

use crate::types::BatchJob;
use thiserror::Error;

/// Result type alias for skritter-export operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for skritter-export
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "Bearer-Token")
        key: Option<String>,
    },

    /// The remote service answered with a status other than 200
    #[error("{method} {endpoint} failed with HTTP {status}: {message}")]
    Protocol {
        /// HTTP method of the failed request
        method: String,
        /// Endpoint that was called
        endpoint: String,
        /// Status code reported by the service
        status: u16,
        /// Response body, or the reason phrase when the body is empty
        message: String,
    },

    /// A batch job did not finish within the polling budget
    #[error("timed out waiting for batch {job_id} after {polls} status polls (last seen: {last})")]
    Timeout {
        /// The batch job that never completed
        job_id: String,
        /// Number of status reads performed before giving up
        polls: u64,
        /// The last status snapshot observed
        last: Box<BatchJob>,
    },

    /// A payload had an unexpected shape
    #[error("unexpected format in {context}: {message}")]
    Format {
        /// Where the bad payload came from (endpoint, sub-request, item id)
        context: String,
        /// What was wrong with it
        message: String,
    },

    /// A uniqueness or consistency contract of the remote data was broken
    #[error("invariant violated: {0}")]
    Invariant(String),

    /// Polling was cancelled before the batch job completed
    #[error("cancelled while waiting for batch {job_id}")]
    Cancelled {
        /// The batch job that was being polled
        job_id: String,
    },

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a configuration error tied to a configuration key
    pub fn config(message: impl Into<String>, key: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Build a format error for the given payload source
    pub fn format(context: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Format {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Get the machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Protocol { .. } => "protocol_error",
            Error::Timeout { .. } => "timeout",
            Error::Format { .. } => "format_error",
            Error::Invariant(_) => "invariant_violation",
            Error::Cancelled { .. } => "cancelled",
            Error::Network(_) => "network_error",
            Error::Serialization(_) => "serialization_error",
            Error::Io(_) => "io_error",
        }
    }
}
