//! Built-in public job boards.

use std::sync::Arc;

use tracing::warn;

use crate::domains::sources::HttpJsonSource;
use crate::kernel::BaseJobSource;

/// A known job board endpoint.
#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub url: &'static str,
    pub records_pointer: Option<&'static str>,
}

pub const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        name: "remoteok",
        url: "https://remoteok.com/api",
        records_pointer: None,
    },
    CatalogEntry {
        name: "remotive",
        url: "https://remotive.com/api/remote-jobs?category=software-dev",
        records_pointer: Some("/jobs"),
    },
    CatalogEntry {
        name: "arbeitnow",
        url: "https://www.arbeitnow.com/api/job-board-api",
        records_pointer: Some("/data"),
    },
];

/// Build fetchers for the catalog, in catalog order.
///
/// `enabled` restricts the set by name; unknown names are logged and ignored.
pub fn catalog_sources(
    client: &reqwest::Client,
    enabled: Option<&[String]>,
) -> Vec<Arc<dyn BaseJobSource>> {
    if let Some(enabled) = enabled {
        for name in enabled {
            if !CATALOG.iter().any(|entry| entry.name == name.as_str()) {
                warn!(source = %name, "Unknown source in ENABLED_SOURCES, ignoring");
            }
        }
    }

    CATALOG
        .iter()
        .filter(|entry| enabled.map_or(true, |names| names.iter().any(|n| n == entry.name)))
        .map(|entry| -> Arc<dyn BaseJobSource> {
            let source = match entry.records_pointer {
                Some(pointer) => HttpJsonSource::builder()
                    .name(entry.name)
                    .url(entry.url)
                    .records_pointer(pointer)
                    .client(client.clone())
                    .build(),
                None => HttpJsonSource::builder()
                    .name(entry.name)
                    .url(entry.url)
                    .client(client.clone())
                    .build(),
            };
            Arc::new(source)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_sources_by_default_in_catalog_order() {
        let sources = catalog_sources(&reqwest::Client::new(), None);
        let names: Vec<_> = sources.iter().map(|s| s.name().to_string()).collect();
        assert_eq!(names, vec!["remoteok", "remotive", "arbeitnow"]);
    }

    #[test]
    fn enabled_list_filters_but_keeps_catalog_order() {
        let enabled = vec!["arbeitnow".to_string(), "remoteok".to_string(), "nope".to_string()];
        let sources = catalog_sources(&reqwest::Client::new(), Some(&enabled));
        let names: Vec<_> = sources.iter().map(|s| s.name().to_string()).collect();
        assert_eq!(names, vec!["remoteok", "arbeitnow"]);
    }
}
