//! Crawl runs: lifecycle, progress, event log, observers and the registry.

pub mod activities;
pub mod error;
pub mod handle;
pub mod models;
pub mod progress;
pub mod registry;

pub use activities::{start_run, StartRunRequest};
pub use error::RunError;
pub use handle::{RunHandle, RunSubscription, DEFAULT_EVENT_LIMIT};
pub use models::*;
pub use registry::RunRegistry;
