//! Source fetchers: failure-isolated retrieval from upstream job boards.

pub mod catalog;
pub mod error;
pub mod http;

pub use catalog::{catalog_sources, CatalogEntry, CATALOG};
pub use error::SourceError;
pub use http::{extract_records, HttpJsonSource};
