//! Source fetch failures.
//!
//! Every variant means "source unavailable": the run logs it and carries on
//! without that source's jobs.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    /// Connection failed, DNS, TLS, body read
    #[error("network error: {0}")]
    Network(String),

    /// Non-2xx response
    #[error("unexpected HTTP status {0}")]
    Status(u16),

    /// Body was not the expected JSON shape
    #[error("malformed payload: {0}")]
    Payload(String),

    /// Fetch exceeded its deadline
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SourceError::Payload(err.to_string())
        } else if let Some(status) = err.status() {
            SourceError::Status(status.as_u16())
        } else {
            SourceError::Network(err.to_string())
        }
    }
}
