//! Model-assisted relevance ranking with heuristic fallback.
//!
//! Ranking never fails a run: every problem degrades to "first N jobs in
//! pipeline order" plus a note explaining why.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

use crate::domains::jobs::Job;
use crate::domains::ranking::prompt::{build_user_prompt, SYSTEM_PROMPT};
use crate::domains::ranking::response::{merge_ranking, parse_ranking};
use crate::domains::ranking::RankingError;
use crate::kernel::BaseRankingService;

/// Upper bounds for the ranking step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingSettings {
    /// Maximum jobs in the final result
    pub max_results: usize,
    /// Maximum jobs sent to the model
    pub max_prompt_jobs: usize,
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            max_results: 40,
            max_prompt_jobs: 40,
        }
    }
}

/// How the final order was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingMethod {
    /// The model's order was applied
    Model,
    /// No credential, so no model was consulted
    Heuristic,
    /// The model was consulted but its answer could not be used
    Fallback,
}

#[derive(Debug, Clone)]
pub struct RankingOutcome {
    pub jobs: Vec<Job>,
    pub notes: Vec<String>,
    pub method: RankingMethod,
}

pub struct RelevanceRanker {
    service: Arc<dyn BaseRankingService>,
    settings: RankingSettings,
}

impl RelevanceRanker {
    pub fn new(service: Arc<dyn BaseRankingService>, settings: RankingSettings) -> Self {
        Self { service, settings }
    }

    pub fn settings(&self) -> RankingSettings {
        self.settings
    }

    pub async fn rank(&self, jobs: Vec<Job>, credential: Option<&SecretString>) -> RankingOutcome {
        let Some(credential) = credential.filter(|c| !c.expose_secret().trim().is_empty()) else {
            debug!(jobs = jobs.len(), "No ranking credential, using heuristic order");
            let jobs = self.heuristic(jobs);
            let note = format!(
                "No model-assisted ranking; kept the first {} jobs in source order",
                jobs.len()
            );
            return RankingOutcome {
                jobs,
                notes: vec![note],
                method: RankingMethod::Heuristic,
            };
        };

        if jobs.is_empty() {
            return RankingOutcome {
                jobs,
                notes: vec!["No jobs to rank".to_string()],
                method: RankingMethod::Heuristic,
            };
        }

        match self.rank_with_model(&jobs, credential).await {
            Ok((ranked, summary)) => {
                info!(jobs = ranked.len(), "Model ranking applied");
                let mut notes = vec![format!("Ranked {} jobs with model assistance", ranked.len())];
                notes.extend(summary.filter(|s| !s.trim().is_empty()));
                RankingOutcome {
                    jobs: ranked,
                    notes,
                    method: RankingMethod::Model,
                }
            }
            Err(e) => {
                warn!(error = %e, "Model ranking failed, falling back to heuristic order");
                RankingOutcome {
                    jobs: self.heuristic(jobs),
                    notes: vec![format!(
                        "Ranking unavailable ({}); fell back to heuristic order",
                        e
                    )],
                    method: RankingMethod::Fallback,
                }
            }
        }
    }

    async fn rank_with_model(
        &self,
        jobs: &[Job],
        credential: &SecretString,
    ) -> Result<(Vec<Job>, Option<String>), RankingError> {
        let prompt = build_user_prompt(jobs, self.settings.max_prompt_jobs);
        let reply = self.service.complete(credential, SYSTEM_PROMPT, &prompt).await?;
        let ranking = parse_ranking(&reply)?;
        let summary = ranking.summary.clone();
        Ok((
            merge_ranking(jobs.to_vec(), &ranking, self.settings.max_results),
            summary,
        ))
    }

    fn heuristic(&self, mut jobs: Vec<Job>) -> Vec<Job> {
        jobs.truncate(self.settings.max_results);
        jobs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::test_dependencies::MockRankingService;

    fn jobs(n: usize) -> Vec<Job> {
        (0..n)
            .map(|i| Job {
                id: format!("job-{}", i),
                source: "test".into(),
                title: format!("ML Engineer {}", i),
                company: "Acme".into(),
                location: "Remote".into(),
                url: String::new(),
                published_at: None,
                description: String::new(),
                fit_score: None,
                rationale: None,
            })
            .collect()
    }

    fn ranker(service: MockRankingService, max_results: usize) -> RelevanceRanker {
        RelevanceRanker::new(
            Arc::new(service),
            RankingSettings {
                max_results,
                max_prompt_jobs: 40,
            },
        )
    }

    fn key() -> SecretString {
        SecretString::from("sk-test".to_string())
    }

    #[tokio::test]
    async fn without_credential_returns_first_n_and_never_calls_model() {
        let service = MockRankingService::replying(r#"{"ranked":["job-3"]}"#);
        let calls = service.calls();
        let outcome = ranker(service, 5).rank(jobs(8), None).await;

        assert_eq!(outcome.method, RankingMethod::Heuristic);
        assert_eq!(outcome.jobs, jobs(5));
        assert_eq!(outcome.notes.len(), 1);
        assert_eq!(calls.lock().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn blank_credential_counts_as_missing() {
        let blank = SecretString::from("  ".to_string());
        let outcome = ranker(MockRankingService::replying("{}"), 5)
            .rank(jobs(2), Some(&blank))
            .await;
        assert_eq!(outcome.method, RankingMethod::Heuristic);
    }

    #[tokio::test]
    async fn model_order_is_applied_with_summary_note() {
        let service = MockRankingService::replying(
            r#"{"ranked":[{"id":"job-2","score":97,"rationale":"LLM infra"},"job-0"],"summary":"Strong demand"}"#,
        );
        let outcome = ranker(service, 3).rank(jobs(4), Some(&key())).await;

        assert_eq!(outcome.method, RankingMethod::Model);
        let ids: Vec<&str> = outcome.jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["job-2", "job-0", "job-1"]);
        assert_eq!(outcome.jobs[0].fit_score, Some(97.0));
        assert!(outcome.notes.iter().any(|n| n == "Strong demand"));
    }

    #[tokio::test]
    async fn service_failure_falls_back_to_first_n() {
        let service = MockRankingService::failing(RankingError::Status {
            status: 500,
            message: "boom".into(),
        });
        let outcome = ranker(service, 2).rank(jobs(5), Some(&key())).await;

        assert_eq!(outcome.method, RankingMethod::Fallback);
        assert_eq!(outcome.jobs, jobs(2));
        assert!(outcome.notes[0].contains("fell back"));
    }

    #[tokio::test]
    async fn unparsable_reply_falls_back() {
        let service = MockRankingService::replying("Sorry, I can't do that.");
        let outcome = ranker(service, 10).rank(jobs(3), Some(&key())).await;

        assert_eq!(outcome.method, RankingMethod::Fallback);
        assert_eq!(outcome.jobs, jobs(3));
    }

    #[tokio::test]
    async fn prompt_is_bounded() {
        let service = MockRankingService::replying(r#"{"ranked":[]}"#);
        let calls = service.calls();
        ranker(service, 50).rank(jobs(60), Some(&key())).await;

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].contains("Rank these 40 job postings"));
        assert!(!calls[0].contains("job-40"));
    }
}
