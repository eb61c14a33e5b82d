//! Map source-shaped records onto the canonical [`Job`].
//!
//! Every attribute is looked up through an ordered list of field names; the
//! first non-empty value wins. Missing data degrades to a default, never an
//! error.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::common::generate_job_id;
use crate::domains::jobs::models::{Job, RawJob};

pub const UNKNOWN_TITLE: &str = "Unknown role";
pub const UNKNOWN_COMPANY: &str = "Unknown company";
pub const UNKNOWN_LOCATION: &str = "Remote / Unknown";

/// Maximum description length kept on a canonical job (in chars).
pub const MAX_DESCRIPTION_CHARS: usize = 500;

lazy_static! {
    static ref HTML_TAG: Regex = Regex::new(r"<[^>]*>").unwrap();
}

/// Ordered fallback field names per canonical attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldAliases {
    pub native_id: &'static [&'static str],
    pub title: &'static [&'static str],
    pub company: &'static [&'static str],
    pub location: &'static [&'static str],
    pub url: &'static [&'static str],
    pub published_at: &'static [&'static str],
    pub description: &'static [&'static str],
}

impl FieldAliases {
    pub const DEFAULT: FieldAliases = FieldAliases {
        native_id: &["id", "slug", "job_id", "uuid"],
        title: &["title", "position", "job_title", "name", "role"],
        company: &["company", "company_name", "companyName", "employer", "organization"],
        location: &["location", "candidate_required_location", "region", "locations"],
        url: &["url", "apply_url", "job_url", "applyUrl", "link"],
        published_at: &[
            "published_at",
            "publication_date",
            "date",
            "created_at",
            "posted_at",
            "epoch",
        ],
        description: &["description", "summary", "snippet", "excerpt", "body"],
    };
}

impl Default for FieldAliases {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Normalize one raw record from `source`.
pub fn normalize_job(source: &str, raw: &RawJob, aliases: &FieldAliases) -> Job {
    let title = raw
        .first_text(aliases.title)
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string());
    let company = raw
        .first_text(aliases.company)
        .unwrap_or_else(|| UNKNOWN_COMPANY.to_string());
    let location = raw
        .first_text(aliases.location)
        .unwrap_or_else(|| UNKNOWN_LOCATION.to_string());
    let url = raw.first_text(aliases.url).unwrap_or_default();
    let description = raw
        .first_text(aliases.description)
        .map(|text| clean_description(&text))
        .unwrap_or_default();
    let published_at = aliases
        .published_at
        .iter()
        .filter_map(|key| raw.get(key))
        .find_map(parse_published_at);

    let native_key = raw
        .first_text(aliases.native_id)
        .or_else(|| (!url.is_empty()).then(|| url.clone()))
        .unwrap_or_else(|| format!("{}|{}", title, company));

    Job {
        id: generate_job_id(source, &native_key),
        source: source.to_string(),
        title,
        company,
        location,
        url,
        published_at,
        description,
        fit_score: None,
        rationale: None,
    }
}

/// Normalize every record from one source, preserving order.
pub fn normalize_all(source: &str, raws: &[RawJob], aliases: &FieldAliases) -> Vec<Job> {
    raws.iter()
        .map(|raw| normalize_job(source, raw, aliases))
        .collect()
}

/// Strip markup, decode the common entities, collapse whitespace and truncate.
pub fn clean_description(text: &str) -> String {
    let stripped = HTML_TAG.replace_all(text, " ");
    let decoded = stripped
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    let collapsed = decoded.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(MAX_DESCRIPTION_CHARS).collect()
}

/// RFC 3339, naive `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD`, or unix epoch (s or ms).
pub fn parse_published_at(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n.as_i64().and_then(from_epoch),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
                return Some(naive.and_utc());
            }
            if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
            }
            s.parse::<i64>().ok().and_then(from_epoch)
        }
        _ => None,
    }
}

fn from_epoch(raw: i64) -> Option<DateTime<Utc>> {
    // Anything past year ~33658 in seconds is really milliseconds.
    if raw.unsigned_abs() >= 1_000_000_000_000 {
        Utc.timestamp_millis_opt(raw).single()
    } else {
        Utc.timestamp_opt(raw, 0).single()
    }
}
