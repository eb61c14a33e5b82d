//! Canned records and ranking replies.

use radar_core::common::generate_job_id;
use radar_core::domains::jobs::RawJob;
use radar_core::kernel::test_dependencies::ml_record;

/// `count` distinct ML postings from one board.
pub fn ml_records(prefix: &str, count: usize) -> Vec<RawJob> {
    (0..count)
        .map(|i| {
            ml_record(
                &format!("{}-{}", prefix, i),
                &format!("Machine Learning Engineer {}", i),
                &format!("{} Labs {}", prefix, i),
            )
        })
        .collect()
}

/// A posting the keyword filter rejects.
pub fn non_ml_record(id: &str) -> RawJob {
    RawJob::new()
        .with("id", id)
        .with("title", "Office Manager")
        .with("company", "Paper Co")
        .with("location", "Scranton")
        .with("description", "Keep the office running smoothly.")
}

/// Canonical job id for a record produced by [`ml_record`].
pub fn job_id(source: &str, native_id: &str) -> String {
    generate_job_id(source, native_id)
}
