//! The crawl pipeline for one run.
//!
//! fetch (bounded concurrency, folded in source order) -> normalize ->
//! keyword filter -> dedupe -> rank -> complete.
//!
//! Source and ranking failures are logged and absorbed. Anything else,
//! including a panic, fails the run.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt};
use secrecy::SecretString;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::domains::jobs::{deduplicate, normalize_all, Job, RawJob};
use crate::domains::ranking::RankingMethod;
use crate::domains::runs::handle::RunHandle;
use crate::domains::runs::models::{LogLevel, RunMode};
use crate::domains::runs::progress::{
    ProgressPlan, CRAWL_START, DEDUPED, FILTERED, RANKING_END, RANKING_START, STARTED,
};
use crate::domains::sources::SourceError;
use crate::kernel::{BaseJobSource, ServerDeps};

/// Run the pipeline in the background. Errors and panics become a failed run.
pub fn spawn_run(
    deps: Arc<ServerDeps>,
    run: Arc<RunHandle>,
    credential: Option<SecretString>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let pipeline = tokio::spawn(execute_run(deps, run.clone(), credential));

        let message = match pipeline.await {
            Ok(Ok(())) => return,
            Ok(Err(e)) => format!("{:#}", e),
            Err(e) if e.is_panic() => {
                error!(run_id = %run.id(), "Run pipeline panicked");
                "Run aborted by an internal error".to_string()
            }
            Err(e) => format!("Run pipeline stopped: {}", e),
        };
        run.fail(message).await;
    })
}

pub async fn execute_run(
    deps: Arc<ServerDeps>,
    run: Arc<RunHandle>,
    credential: Option<SecretString>,
) -> Result<()> {
    run.progress(STARTED, "Starting run").await;

    let sources = deps.sources.clone();
    if sources.is_empty() {
        bail!("No job sources configured");
    }

    let total = sources.len();
    let plan = ProgressPlan::new(total);
    run.progress(CRAWL_START, format!("Crawling {} sources", total))
        .await;

    let collected = crawl(&deps, &run, sources, plan).await;

    let relevant = deps.keyword_filter.apply(collected);
    run.progress(
        FILTERED,
        format!("Kept {} ML-relevant jobs", relevant.len()),
    )
    .await;

    let unique = deduplicate(relevant);
    run.replace_jobs(
        unique.clone(),
        DEDUPED,
        format!("{} unique jobs after deduplication", unique.len()),
    )
    .await;

    let credential = match run.mode() {
        RunMode::Advanced => credential,
        RunMode::Standard => None,
    };
    let ranking_stage = if credential.is_some() {
        "Ranking with model assistance"
    } else {
        "Selecting top jobs"
    };
    run.progress(RANKING_START, ranking_stage).await;

    let outcome = deps.ranker.rank(unique, credential.as_ref()).await;
    let level = match outcome.method {
        RankingMethod::Fallback => LogLevel::Warn,
        RankingMethod::Model | RankingMethod::Heuristic => LogLevel::Info,
    };
    for note in outcome.notes {
        run.log(level, note).await;
    }
    run.progress(RANKING_END, "Ranking finished").await;

    run.complete(outcome.jobs).await;
    Ok(())
}

type SourceFetch = (Arc<dyn BaseJobSource>, Result<Vec<RawJob>, SourceError>);

async fn fetch_with_deadline(source: Arc<dyn BaseJobSource>, timeout: Duration) -> SourceFetch {
    let result = match tokio::time::timeout(timeout, source.fetch()).await {
        Ok(result) => result,
        Err(_) => Err(SourceError::Timeout(timeout)),
    };
    (source, result)
}

/// Fetch every source with bounded concurrency. Results are folded in
/// source order regardless of which fetch finishes first.
async fn crawl(
    deps: &ServerDeps,
    run: &RunHandle,
    sources: Vec<Arc<dyn BaseJobSource>>,
    plan: ProgressPlan,
) -> Vec<Job> {
    let timeout = deps.pipeline.source_timeout;
    let total = sources.len();

    let fetches: Vec<BoxFuture<'static, SourceFetch>> = sources
        .into_iter()
        .map(|source| fetch_with_deadline(source, timeout).boxed())
        .collect();
    let mut fetches =
        stream::iter(fetches).buffered(deps.pipeline.max_concurrent_fetches.max(1));

    let mut collected = Vec::new();
    let mut completed = 0;
    while let Some((source, result)) = fetches.next().await {
        completed += 1;
        match result {
            Ok(records) => {
                let jobs = normalize_all(source.name(), &records, &source.field_aliases());
                debug!(
                    source = source.name(),
                    raw = records.len(),
                    jobs = jobs.len(),
                    "Source fetched"
                );
                run.log(
                    LogLevel::Info,
                    format!("Fetched {} jobs from {}", jobs.len(), source.name()),
                )
                .await;
                collected.extend(jobs);
            }
            Err(e) => {
                run.log(
                    LogLevel::Warn,
                    format!("Source {} unavailable: {}", source.name(), e),
                )
                .await;
            }
        }
        run.progress(
            plan.after_source(completed),
            format!("Crawled {} ({}/{})", source.name(), completed, total),
        )
        .await;
    }

    collected
}
