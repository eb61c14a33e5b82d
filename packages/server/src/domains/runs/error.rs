use thiserror::Error;

/// Errors surfaced synchronously to callers of the run API.
///
/// Failures inside a running pipeline are never returned here; they end
/// up in the run's event log instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RunError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("run not found: {0}")]
    NotFound(String),
}
