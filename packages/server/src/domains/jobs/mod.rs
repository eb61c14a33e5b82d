//! Canonical job postings: normalization, relevance filtering, deduplication.

pub mod activities;
pub mod models;

pub use activities::*;
pub use models::*;
