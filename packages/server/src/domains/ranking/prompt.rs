//! Prompt construction for model-assisted ranking.

use serde::Serialize;

use crate::domains::jobs::Job;

/// Characters of description sent per job.
const PROMPT_DESCRIPTION_CHARS: usize = 300;

pub const SYSTEM_PROMPT: &str = "You rank machine-learning job postings by how well they fit \
an experienced ML engineer looking for hands-on ML, deep learning, NLP, computer vision or \
MLOps work. Reply with a single JSON object of the form \
{\"ranked\": [{\"id\": \"<job id>\", \"score\": <0-100>, \"rationale\": \"<one sentence>\"}], \
\"summary\": \"<two sentences on the overall market>\"}. \
Only use ids from the input, best fit first. Omit jobs that are not ML roles.";

#[derive(Serialize)]
struct PromptJob<'a> {
    id: &'a str,
    title: &'a str,
    company: &'a str,
    location: &'a str,
    description: String,
}

/// Serialize at most `limit` jobs into the user prompt.
pub fn build_user_prompt(jobs: &[Job], limit: usize) -> String {
    let entries: Vec<PromptJob<'_>> = jobs
        .iter()
        .take(limit)
        .map(|job| PromptJob {
            id: &job.id,
            title: &job.title,
            company: &job.company,
            location: &job.location,
            description: job.description.chars().take(PROMPT_DESCRIPTION_CHARS).collect(),
        })
        .collect();

    // Serializing borrowed strings into a Vec cannot fail.
    let payload = serde_json::to_string(&entries).unwrap_or_else(|_| "[]".to_string());
    format!("Rank these {} job postings:\n{}", entries.len(), payload)
}
