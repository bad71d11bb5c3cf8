//! Catalog source extractor for the Comix manga site
//!
//! Turns the site's paginated JSON API and loosely structured HTML pages into
//! typed records:
//! - search results and title metadata
//! - deduplicated, sorted chapter listings
//! - per-chapter page images, located by a fallback chain of extractors
//!
//! [`CatalogClient`] is the entry point. Logging goes through `tracing`; no
//! subscriber is installed here.

pub mod api;
pub mod chapters;
pub mod client;
pub mod config;
pub mod details;
pub mod dom;
pub mod error;
pub mod extractors;
pub mod models;
pub mod normalize;
pub mod transport;

pub use client::CatalogClient;
pub use config::SourceConfig;
pub use error::{Result, SourceError};
pub use models::*;
pub use transport::{HttpResponse, Transport, UreqTransport};
