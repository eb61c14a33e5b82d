//! Generic JSON-over-HTTP job board fetcher.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use typed_builder::TypedBuilder;

use crate::domains::jobs::{FieldAliases, RawJob};
use crate::domains::sources::SourceError;
use crate::kernel::BaseJobSource;

/// A job board exposing its listings as a JSON array.
///
/// `records_pointer` is a JSON pointer (RFC 6901) to the array inside the
/// response body; `None` means the body itself is the array.
#[derive(Debug, Clone, TypedBuilder)]
pub struct HttpJsonSource {
    #[builder(setter(into))]
    name: String,
    #[builder(setter(into))]
    url: String,
    #[builder(default, setter(strip_option, into))]
    records_pointer: Option<String>,
    #[builder(default = FieldAliases::DEFAULT)]
    aliases: FieldAliases,
    #[builder(default)]
    client: reqwest::Client,
}

impl HttpJsonSource {
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl BaseJobSource for HttpJsonSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn field_aliases(&self) -> FieldAliases {
        self.aliases
    }

    async fn fetch(&self) -> Result<Vec<RawJob>, SourceError> {
        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let payload: Value = response.json().await?;
        let records = extract_records(payload, self.records_pointer.as_deref(), &self.aliases)?;

        debug!(source = %self.name, records = records.len(), "Fetched job records");
        Ok(records)
    }
}

/// Pull job records out of a response body.
///
/// Non-object entries and objects with no title-like field (e.g. a leading
/// legal notice) are skipped.
pub fn extract_records(
    payload: Value,
    pointer: Option<&str>,
    aliases: &FieldAliases,
) -> Result<Vec<RawJob>, SourceError> {
    let array = match pointer {
        Some(pointer) => payload
            .pointer(pointer)
            .cloned()
            .ok_or_else(|| SourceError::Payload(format!("missing {}", pointer)))?,
        None => payload,
    };

    let Value::Array(items) = array else {
        return Err(SourceError::Payload("expected a JSON array of jobs".into()));
    };

    Ok(items
        .into_iter()
        .filter_map(RawJob::from_value)
        .filter(|raw| raw.first_text(aliases.title).is_some())
        .collect())
}
