//! Canonical job posting and the raw, source-shaped record it is built from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A normalized job posting.
///
/// `fit_score` and `rationale` are only ever set by the ranking step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Stable identity derived from source + native id (or url)
    pub id: String,
    pub source: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub url: String,
    pub published_at: Option<DateTime<Utc>>,
    pub description: String,
    #[serde(default)]
    pub fit_score: Option<f64>,
    #[serde(default)]
    pub rationale: Option<String>,
}

/// A job record exactly as a source returned it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawJob(pub Map<String, Value>);

impl RawJob {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field setter (mostly for fixtures).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Accepts JSON objects only; anything else is not a job record.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// First non-empty textual value among `keys`, in order.
    ///
    /// Numbers are rendered, string arrays joined with ", ", and objects
    /// contribute their `name` field.
    pub fn first_text(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|key| self.0.get(*key))
            .filter_map(value_as_text)
            .find(|text| !text.is_empty())
    }
}

fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .filter_map(value_as_text)
                .filter(|s| !s.is_empty())
                .collect();
            Some(parts.join(", "))
        }
        Value::Object(map) => map.get("name").and_then(value_as_text),
        Value::Bool(_) | Value::Null => None,
    }
}
