// ML Job Radar - Core library
//
// Crawl-run orchestration: concurrent source fetches, a per-run state
// machine with live progress streaming, and optional model-assisted ranking.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
