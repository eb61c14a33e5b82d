pub mod deduplication;
pub mod keyword_filter;
pub mod normalize;

pub use deduplication::{dedup_key, deduplicate};
pub use keyword_filter::{KeywordFilter, MatchMode, DEFAULT_KEYWORDS};
pub use normalize::{normalize_all, normalize_job, FieldAliases};
