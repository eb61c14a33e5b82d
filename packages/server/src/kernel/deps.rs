//! Server dependencies for runs (using traits for testability)
//!
//! This module provides the central dependency container used by the run
//! pipeline and the HTTP layer. External services sit behind traits so tests
//! can swap in doubles.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::domains::jobs::KeywordFilter;
use crate::domains::ranking::{RankingSettings, RelevanceRanker};
use crate::domains::runs::RunRegistry;
use crate::domains::sources::catalog_sources;
use crate::kernel::llm_request::OpenAIRankingService;
use crate::kernel::{BaseJobSource, BaseRankingService};

/// Knobs for the crawl stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    pub source_timeout: Duration,
    pub max_concurrent_fetches: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            source_timeout: Duration::from_secs(20),
            max_concurrent_fetches: 4,
        }
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Server dependencies shared by every run
#[derive(Clone)]
pub struct ServerDeps {
    pub runs: RunRegistry,
    /// Fetched in this order; results fold in this order
    pub sources: Vec<Arc<dyn BaseJobSource>>,
    pub ranker: Arc<RelevanceRanker>,
    pub keyword_filter: Arc<KeywordFilter>,
    pub pipeline: PipelineSettings,
}

impl ServerDeps {
    pub fn new(
        runs: RunRegistry,
        sources: Vec<Arc<dyn BaseJobSource>>,
        ranking_service: Arc<dyn BaseRankingService>,
        keyword_filter: KeywordFilter,
        config: &Config,
    ) -> Self {
        let ranker = RelevanceRanker::new(
            ranking_service,
            RankingSettings {
                max_results: config.max_ranked_jobs,
                max_prompt_jobs: config.max_prompt_jobs,
            },
        );

        Self {
            runs,
            sources,
            ranker: Arc::new(ranker),
            keyword_filter: Arc::new(keyword_filter),
            pipeline: PipelineSettings {
                source_timeout: config.source_timeout,
                max_concurrent_fetches: config.max_concurrent_fetches,
            },
        }
    }

    /// Production wiring: catalog sources over HTTP and OpenAI ranking.
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.http_user_agent.clone())
            .build()
            .context("Failed to build HTTP client")?;

        let sources = catalog_sources(&http, config.enabled_sources.as_deref());
        info!(
            sources = ?sources.iter().map(|s| s.name().to_string()).collect::<Vec<_>>(),
            "Job sources configured"
        );

        let ranking = OpenAIRankingService::new(
            http,
            config.openai_base_url.clone(),
            config.ranking_model.clone(),
            config.ranking_timeout,
        );

        Ok(Self::new(
            RunRegistry::new(config.run_event_limit, config.run_channel_capacity),
            sources,
            Arc::new(ranking),
            KeywordFilter::new(config.keywords.iter(), config.keyword_match),
            config,
        ))
    }
}
