use sha2::{Digest, Sha256};

/// Length of the hex job identifier.
const JOB_ID_LEN: usize = 16;

/// Normalize text for identity comparisons.
///
/// - Convert to lowercase
/// - Collapse runs of whitespace into single spaces
/// - Trim leading/trailing whitespace
pub fn normalize_text(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Generate a stable job identifier.
///
/// SHA256 of `source:native_key` after normalization, truncated to 16 hex
/// characters. The same posting fetched twice from the same source always
/// gets the same id.
pub fn generate_job_id(source: &str, native_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize_text(source).as_bytes());
    hasher.update(b":");
    hasher.update(normalize_text(native_key).as_bytes());
    let mut digest = format!("{:x}", hasher.finalize());
    digest.truncate(JOB_ID_LEN);
    digest
}
