//! Extraction strategies.
//!
//! Each strategy answers two questions: can it handle a given config (pure, no I/O),
//! and what raw postings does the source hold. The orchestrator tries them in the
//! order supplied and never needs to know which concrete strategies exist.

pub mod html_scrape;
pub mod json_api;

pub use html_scrape::HtmlScrapeStrategy;
pub use json_api::JsonApiStrategy;

use crate::app::ports::HttpClientPort;
use crate::constants::{HTML_SCRAPE_STRATEGY, JSON_API_STRATEGY};
use crate::error::Result;
use crate::infra::HtmlJobExtractor;
use crate::types::{FetchConfig, RawRecord};

/// Contract every way of obtaining postings must implement
#[async_trait::async_trait]
pub trait FetchStrategy: Send + Sync {
    /// Stable identifier, reported as `FetchResult::method` on success
    fn name(&self) -> &'static str;

    /// Whether this strategy applies to the config. Must not perform I/O.
    fn can_handle(&self, config: &FetchConfig) -> bool;

    /// Fetch raw postings. An empty list means the source has no postings;
    /// `Err` is reserved for real failures.
    async fn extract(
        &self,
        config: &FetchConfig,
        http: &dyn HttpClientPort,
    ) -> Result<Vec<RawRecord>>;
}

pub(crate) fn is_http_url(url: &str) -> bool {
    let url = url.trim().to_ascii_lowercase();
    url.starts_with("http://") || url.starts_with("https://")
}

/// Built-in strategies in default priority order: structured API first, markup second
pub fn default_strategies() -> Vec<Box<dyn FetchStrategy>> {
    vec![
        Box::new(JsonApiStrategy::new()),
        Box::new(HtmlScrapeStrategy::new(Box::new(HtmlJobExtractor::new()))),
    ]
}

/// Factory function to resolve a built-in strategy by name
pub fn create_strategy(name: &str) -> Option<Box<dyn FetchStrategy>> {
    match name.trim() {
        JSON_API_STRATEGY => Some(Box::new(JsonApiStrategy::new())),
        HTML_SCRAPE_STRATEGY => Some(Box::new(HtmlScrapeStrategy::new(Box::new(
            HtmlJobExtractor::new(),
        )))),
        _ => None,
    }
}
