//! Optional model-assisted re-ranking of aggregated jobs.

pub mod error;
pub mod prompt;
pub mod ranker;
pub mod response;

pub use error::RankingError;
pub use ranker::{RankingMethod, RankingOutcome, RankingSettings, RelevanceRanker};
pub use response::{merge_ranking, parse_ranking, ModelRanking, RankedEntry};
