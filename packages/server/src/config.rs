use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use dotenvy::dotenv;

use crate::domains::jobs::{MatchMode, DEFAULT_KEYWORDS};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub openai_base_url: String,
    pub ranking_model: String,
    pub ranking_timeout: Duration,
    pub max_ranked_jobs: usize,
    pub max_prompt_jobs: usize,
    pub run_event_limit: usize,
    pub run_channel_capacity: usize,
    pub source_timeout: Duration,
    pub max_concurrent_fetches: usize,
    pub http_user_agent: String,
    pub keywords: Vec<String>,
    pub keyword_match: MatchMode,
    /// `None` enables every catalog source
    pub enabled_sources: Option<Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            openai_base_url: "https://api.openai.com/v1".to_string(),
            ranking_model: "gpt-4o-mini".to_string(),
            ranking_timeout: Duration::from_secs(45),
            max_ranked_jobs: 40,
            max_prompt_jobs: 40,
            run_event_limit: 500,
            run_channel_capacity: 256,
            source_timeout: Duration::from_secs(20),
            max_concurrent_fetches: 4,
            http_user_agent: concat!("ml-job-radar/", env!("CARGO_PKG_VERSION")).to_string(),
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            keyword_match: MatchMode::Substring,
            enabled_sources: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let defaults = Self::default();
        Ok(Self {
            port: parse_var("PORT", defaults.port)?,
            openai_base_url: env::var("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url),
            ranking_model: env::var("RANKING_MODEL").unwrap_or(defaults.ranking_model),
            ranking_timeout: Duration::from_secs(parse_var(
                "RANKING_TIMEOUT_SECS",
                defaults.ranking_timeout.as_secs(),
            )?),
            max_ranked_jobs: parse_var("MAX_RANKED_JOBS", defaults.max_ranked_jobs)?,
            max_prompt_jobs: parse_var("MAX_PROMPT_JOBS", defaults.max_prompt_jobs)?,
            run_event_limit: parse_var("RUN_EVENT_LIMIT", defaults.run_event_limit)?,
            run_channel_capacity: parse_var("RUN_CHANNEL_CAPACITY", defaults.run_channel_capacity)?,
            source_timeout: Duration::from_secs(parse_var(
                "SOURCE_TIMEOUT_SECS",
                defaults.source_timeout.as_secs(),
            )?),
            max_concurrent_fetches: parse_var(
                "MAX_CONCURRENT_FETCHES",
                defaults.max_concurrent_fetches,
            )?,
            http_user_agent: env::var("HTTP_USER_AGENT").unwrap_or(defaults.http_user_agent),
            keywords: env::var("ML_KEYWORDS")
                .ok()
                .map(|v| split_list(&v))
                .filter(|list| !list.is_empty())
                .unwrap_or(defaults.keywords),
            keyword_match: match env::var("KEYWORD_MATCH") {
                Ok(value) => value
                    .parse()
                    .map_err(|e: String| anyhow!(e))
                    .context("KEYWORD_MATCH must be 'substring' or 'word'")?,
                Err(_) => defaults.keyword_match,
            },
            enabled_sources: env::var("ENABLED_SOURCES")
                .ok()
                .map(|v| split_list(&v))
                .filter(|list| !list.is_empty()),
        })
    }
}

fn parse_var<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number", key)),
        Err(_) => Ok(default),
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}
