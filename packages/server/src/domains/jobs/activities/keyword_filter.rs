//! ML-relevance keyword filter.
//!
//! A job is relevant when any keyword occurs in `title + description +
//! location`, case-insensitively. The default [`MatchMode::Substring`] keeps
//! recall high at the cost of short-token false positives ("ai" inside
//! "maintain"); [`MatchMode::WordBoundary`] trades that recall for precision.

use std::str::FromStr;

use regex::Regex;
use tracing::debug;

use crate::domains::jobs::models::Job;

/// Relevance keywords shared by every source.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "machine learning",
    "ml",
    "ai",
    "artificial intelligence",
    "deep learning",
    "data scientist",
    "nlp",
    "computer vision",
    "llm",
    "mlops",
    "pytorch",
    "tensorflow",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchMode {
    #[default]
    Substring,
    WordBoundary,
}

impl FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "substring" => Ok(Self::Substring),
            "word" | "word_boundary" => Ok(Self::WordBoundary),
            other => Err(format!("unknown keyword match mode: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct KeywordFilter {
    keywords: Vec<String>,
    mode: MatchMode,
    word_patterns: Vec<Regex>,
}

impl KeywordFilter {
    /// Blank keywords are dropped; the rest are lowercased.
    pub fn new<I, S>(keywords: I, mode: MatchMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords: Vec<String> = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        let word_patterns = match mode {
            MatchMode::Substring => Vec::new(),
            MatchMode::WordBoundary => keywords
                .iter()
                .filter_map(|k| Regex::new(&format!(r"\b{}\b", regex::escape(k))).ok())
                .collect(),
        };

        Self {
            keywords,
            mode,
            word_patterns,
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn is_relevant(&self, job: &Job) -> bool {
        let haystack =
            format!("{} {} {}", job.title, job.description, job.location).to_lowercase();

        match self.mode {
            MatchMode::Substring => self.keywords.iter().any(|k| haystack.contains(k.as_str())),
            MatchMode::WordBoundary => self.word_patterns.iter().any(|re| re.is_match(&haystack)),
        }
    }

    /// Keep relevant jobs, preserving order.
    pub fn apply(&self, jobs: Vec<Job>) -> Vec<Job> {
        let before = jobs.len();
        let kept: Vec<Job> = jobs.into_iter().filter(|j| self.is_relevant(j)).collect();
        debug!(before, after = kept.len(), mode = ?self.mode, "Keyword filter applied");
        kept
    }
}

impl Default for KeywordFilter {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORDS.iter().copied(), MatchMode::Substring)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(title: &str, description: &str, location: &str) -> Job {
        Job {
            id: title.to_string(),
            source: "test".into(),
            title: title.into(),
            company: "Acme".into(),
            location: location.into(),
            url: String::new(),
            published_at: None,
            description: description.into(),
            fit_score: None,
            rationale: None,
        }
    }

    #[test]
    fn matches_title_case_insensitively() {
        let filter = KeywordFilter::default();
        assert!(filter.is_relevant(&job("Senior Machine Learning Engineer", "", "")));
        assert!(filter.is_relevant(&job("PyTorch Developer", "", "")));
    }

    #[test]
    fn matches_description_and_location() {
        let filter = KeywordFilter::new(["nlp", "zurich"], MatchMode::Substring);
        assert!(filter.is_relevant(&job("Engineer", "Work on NLP systems", "")));
        assert!(filter.is_relevant(&job("Engineer", "", "Zurich, CH")));
    }

    #[test]
    fn rejects_unrelated_jobs() {
        let filter = KeywordFilter::default();
        assert!(!filter.is_relevant(&job("Accountant", "Bookkeeping", "Berlin")));
    }

    #[test]
    fn substring_mode_keeps_short_token_false_positive() {
        let filter = KeywordFilter::default();
        // "ai" inside "maintain"
        assert!(filter.is_relevant(&job("Maintenance Technician", "Maintain equipment", "")));
    }

    #[test]
    fn word_boundary_mode_rejects_embedded_tokens() {
        let filter = KeywordFilter::new(DEFAULT_KEYWORDS.iter().copied(), MatchMode::WordBoundary);
        assert!(!filter.is_relevant(&job("Maintenance Technician", "Maintain equipment", "")));
        assert!(filter.is_relevant(&job("AI Engineer", "", "")));
        assert!(filter.is_relevant(&job("Engineer", "applied machine learning", "")));
    }

    #[test]
    fn filter_is_deterministic_and_order_preserving() {
        let filter = KeywordFilter::default();
        let jobs = vec![
            job("ML Engineer", "", ""),
            job("Cook", "", "Paris"),
            job("Data Scientist", "", ""),
        ];

        let first = filter.apply(jobs.clone());
        let second = filter.apply(jobs);
        assert_eq!(first, second);
        let titles: Vec<_> = first.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(titles, vec!["ML Engineer", "Data Scientist"]);
    }

    #[test]
    fn blank_keywords_are_ignored() {
        let filter = KeywordFilter::new(["", "  ", "LLM"], MatchMode::Substring);
        assert_eq!(filter.keywords(), &["llm".to_string()]);
    }

    #[test]
    fn match_mode_parses() {
        assert_eq!("word".parse::<MatchMode>().unwrap(), MatchMode::WordBoundary);
        assert_eq!("Substring".parse::<MatchMode>().unwrap(), MatchMode::Substring);
        assert!("fuzzy".parse::<MatchMode>().is_err());
    }
}
