//! Parsing the model's reply and merging it into the job list.

use std::collections::HashMap;

use serde::Deserialize;

use crate::domains::jobs::Job;
use crate::domains::ranking::RankingError;

/// The structured part of a ranking reply.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ModelRanking {
    #[serde(alias = "ranked_ids", alias = "ranked_jobs", alias = "ranking")]
    pub ranked: Vec<RankedEntry>,
    #[serde(default)]
    pub summary: Option<String>,
}

/// Either a bare id or an id with score/rationale.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RankedEntry {
    Id(String),
    Scored {
        id: String,
        #[serde(default, alias = "fit_score", alias = "fitScore")]
        score: Option<f64>,
        #[serde(default)]
        rationale: Option<String>,
    },
}

impl RankedEntry {
    pub fn id(&self) -> &str {
        match self {
            RankedEntry::Id(id) => id,
            RankedEntry::Scored { id, .. } => id,
        }
    }
}

/// Parse a raw model reply. Markdown code fences and prose around the JSON
/// object are tolerated.
pub fn parse_ranking(raw: &str) -> Result<ModelRanking, RankingError> {
    let start = raw
        .find('{')
        .ok_or_else(|| RankingError::Parse("no JSON object in reply".into()))?;
    let end = raw
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| RankingError::Parse("unterminated JSON object".into()))?;

    serde_json::from_str(&raw[start..=end]).map_err(|e| RankingError::Parse(e.to_string()))
}

/// Referenced jobs first in model order, then the rest in original order,
/// truncated to `limit`. Unknown and repeated ids are ignored.
pub fn merge_ranking(jobs: Vec<Job>, ranking: &ModelRanking, limit: usize) -> Vec<Job> {
    let positions: HashMap<&str, usize> = jobs
        .iter()
        .enumerate()
        .map(|(i, job)| (job.id.as_str(), i))
        .collect();

    let mut order = Vec::with_capacity(jobs.len());
    let mut annotations: HashMap<usize, (Option<f64>, Option<String>)> = HashMap::new();
    for entry in &ranking.ranked {
        let Some(&pos) = positions.get(entry.id()) else {
            continue;
        };
        if annotations.contains_key(&pos) {
            continue;
        }
        let annotation = match entry {
            RankedEntry::Id(_) => (None, None),
            RankedEntry::Scored {
                score, rationale, ..
            } => (
                score.filter(|s| s.is_finite()),
                rationale.clone().filter(|r| !r.trim().is_empty()),
            ),
        };
        annotations.insert(pos, annotation);
        order.push(pos);
    }
    order.extend((0..jobs.len()).filter(|pos| !annotations.contains_key(pos)));

    let mut slots: Vec<Option<Job>> = jobs.into_iter().map(Some).collect();
    order
        .into_iter()
        .take(limit)
        .filter_map(|pos| {
            let mut job = slots[pos].take()?;
            if let Some((score, rationale)) = annotations.remove(&pos) {
                job.fit_score = score;
                job.rationale = rationale;
            }
            Some(job)
        })
        .collect()
}
