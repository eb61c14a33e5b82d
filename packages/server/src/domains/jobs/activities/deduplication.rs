//! Order-stable deduplication of canonical jobs.
//!
//! Identity key: `normalize(title) | normalize(company)`, where normalize
//! lowercases, trims and collapses whitespace. The URL is not part of the
//! key, so one posting syndicated to two boards collapses to one job.

use std::collections::HashSet;

use crate::common::normalize_text;
use crate::domains::jobs::models::Job;

pub fn dedup_key(job: &Job) -> String {
    format!("{}|{}", normalize_text(&job.title), normalize_text(&job.company))
}

/// Remove duplicates, keeping the first occurrence of each key.
pub fn deduplicate(jobs: Vec<Job>) -> Vec<Job> {
    let mut seen = HashSet::with_capacity(jobs.len());
    jobs.into_iter()
        .filter(|job| seen.insert(dedup_key(job)))
        .collect()
}
