// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// What to fetch and how to rank lives in the domains that call these.
//
// Naming convention: Base* for trait names (e.g., BaseJobSource)

use async_trait::async_trait;
use secrecy::SecretString;

use crate::domains::jobs::{FieldAliases, RawJob};
use crate::domains::ranking::RankingError;
use crate::domains::sources::SourceError;

// =============================================================================
// Job Source Trait (Infrastructure - one upstream job board)
// =============================================================================

#[async_trait]
pub trait BaseJobSource: Send + Sync {
    /// Stable, human-readable source name (used in logs and job ids)
    fn name(&self) -> &str;

    /// Field names to try, in order, when normalizing this source's records
    fn field_aliases(&self) -> FieldAliases {
        FieldAliases::DEFAULT
    }

    /// Fetch raw records. Must not touch run state.
    async fn fetch(&self) -> Result<Vec<RawJob>, SourceError>;
}

// =============================================================================
// Ranking Service Trait (Infrastructure - LLM completion)
// =============================================================================

#[async_trait]
pub trait BaseRankingService: Send + Sync {
    /// Single request/response exchange, no retry.
    /// Returns the model's raw text reply; parsing is the caller's job.
    async fn complete(
        &self,
        credential: &SecretString,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, RankingError>;
}
